use crate::core::EngineConfig;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

/// Replay canteen balance operations from a CSV file
#[derive(Parser, Debug)]
#[command(name = "canteen-balance-engine")]
#[command(about = "Replay canteen balance operations from a CSV file", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation rows
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Maximum amount a single top-up may credit
    #[arg(
        long = "topup-ceiling",
        value_name = "AMOUNT",
        help = "Maximum amount accepted for a single top-up (default: 9999)"
    )]
    pub topup_ceiling: Option<Decimal>,

    /// Timeout for individual store calls, in milliseconds
    #[arg(
        long = "store-timeout-ms",
        value_name = "MS",
        help = "Timeout for individual store calls in milliseconds (default: 5000)"
    )]
    pub store_timeout_ms: Option<u64>,

    /// Attempts for ledger writes before reporting a partial write
    #[arg(
        long = "ledger-retries",
        value_name = "COUNT",
        help = "Ledger write attempts before giving up (default: 3)"
    )]
    pub ledger_write_attempts: Option<u32>,
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments
    ///
    /// This method constructs an EngineConfig using the CLI arguments if
    /// provided, or falls back to default values. Invalid values are
    /// replaced with defaults by EngineConfig::new, which logs a warning.
    ///
    /// # Returns
    ///
    /// An `EngineConfig` with values from CLI arguments or defaults.
    pub fn to_engine_config(&self) -> EngineConfig {
        if self.topup_ceiling.is_some()
            || self.store_timeout_ms.is_some()
            || self.ledger_write_attempts.is_some()
        {
            let default = EngineConfig::default();
            EngineConfig::new(
                self.topup_ceiling.unwrap_or(default.topup_ceiling),
                self.store_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(default.store_timeout),
                self.ledger_write_attempts
                    .unwrap_or(default.ledger_write_attempts),
            )
        } else {
            EngineConfig::default()
        }
    }
}
