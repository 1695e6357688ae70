//! Business logic components
//!
//! # Components
//!
//! - `engine` - Balance operation orchestration (debit, credit, queries)
//! - `config` - Engine policy and infrastructure configuration

pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::{BalanceEngine, Receipt};
