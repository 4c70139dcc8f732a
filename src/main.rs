//! Tender Ledger inspection tool
//!
//! Opens the global registry store, reports chain state, and lists the
//! recorded events.

use tender_ledger::ledger::{Ledger, LedgerConfig};
use tender_ledger::storage::AppendLogStore;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "global_registry.jsonl".to_string());

    let registry = Ledger::open(AppendLogStore::new(&path), LedgerConfig::registry())?;
    let stats = registry.stats();

    println!("Global Tender Registry");
    println!("  Store:       {}", path);
    println!("  Height:      {}", stats.height);
    println!("  Blocks:      {}", stats.blocks);
    println!("  Head Hash:   {}", stats.head_hash);
    println!("  Difficulty:  {}", stats.difficulty);
    println!(
        "  Integrity:   {}",
        if registry.is_valid() { "OK" } else { "BROKEN" }
    );
    println!();

    for view in registry.block_views() {
        println!(
            "#{:<4} {} nonce={} {}",
            view.index, view.timestamp, view.nonce, view.hash
        );
        println!("      data: {}", view.data);
    }

    if let Err(err) = registry.verify() {
        eprintln!("Audit failed: {}", err);
        std::process::exit(1);
    }

    Ok(())
}
