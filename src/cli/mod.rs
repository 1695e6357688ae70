//! Command-line interface module
//!
//! Handles argument parsing and engine configuration for the replay binary.

pub mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments
///
/// Exits the process with a usage message when arguments are invalid.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
