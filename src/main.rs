//! Canteen Balance Engine CLI
//!
//! Command-line interface for replaying canteen balance operations from
//! CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --topup-ceiling 5000 operations.csv > balances.csv
//! cargo run -- --store-timeout-ms 250 --ledger-retries 5 operations.csv > balances.csv
//! ```
//!
//! The program reads register, purchase, and top-up rows from the input
//! CSV file, applies them through the balance engine, and writes the
//! final account balances to stdout. Logs go to stderr; control verbosity
//! with `RUST_LOG`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, store failure, etc.)

use canteen_balance_engine::cli;
use canteen_balance_engine::replay::replay_file;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();
    let config = args.to_engine_config();

    // Balances go to stdout; everything else to stderr
    let mut output = std::io::stdout();
    if let Err(e) = replay_file(&args.input_file, &mut output, config).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
