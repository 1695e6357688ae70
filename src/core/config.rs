//! Engine configuration
//!
//! Business policy (the top-up ceiling) and infrastructure knobs (store
//! deadline, ledger retry budget) live here rather than as constants in
//! the engine, so a deployment can tune them without a code change.

use rust_decimal::Decimal;
use std::time::Duration;

/// Configuration for the balance engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Maximum amount a single top-up may credit
    ///
    /// A business rule, not a technical constraint; the canteen's policy
    /// caps single top-ups at 9999 by default.
    pub topup_ceiling: Decimal,

    /// Deadline applied to every individual store call
    pub store_timeout: Duration,

    /// Total attempts for the ledger write after a successful balance write
    ///
    /// When exhausted the engine surfaces a partial-write error instead of
    /// swallowing the lost entry.
    pub ledger_write_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            topup_ceiling: Decimal::new(9999, 0),
            store_timeout: Duration::from_secs(5),
            ledger_write_attempts: 3,
        }
    }
}

impl EngineConfig {
    /// Create a config with custom values, falling back to defaults for
    /// values that cannot work
    ///
    /// A zero retry budget or a zero timeout would make every operation
    /// fail; both fall back with a warning instead.
    pub fn new(topup_ceiling: Decimal, store_timeout: Duration, ledger_write_attempts: u32) -> Self {
        let default = Self::default();

        let topup_ceiling = if topup_ceiling <= Decimal::ZERO {
            tracing::warn!(
                rejected = %topup_ceiling,
                fallback = %default.topup_ceiling,
                "invalid top-up ceiling, using default"
            );
            default.topup_ceiling
        } else {
            topup_ceiling
        };

        let store_timeout = if store_timeout.is_zero() {
            tracing::warn!(
                fallback_ms = default.store_timeout.as_millis() as u64,
                "invalid store timeout, using default"
            );
            default.store_timeout
        } else {
            store_timeout
        };

        let ledger_write_attempts = if ledger_write_attempts == 0 {
            tracing::warn!(
                fallback = default.ledger_write_attempts,
                "invalid ledger write attempts, using default"
            );
            default.ledger_write_attempts
        } else {
            ledger_write_attempts
        };

        Self {
            topup_ceiling,
            store_timeout,
            ledger_write_attempts,
        }
    }
}
