//! Error types for the canteen balance engine
//!
//! This module defines all error types that can occur while processing
//! balance operations. Business-rule failures are returned as values so
//! callers can render a specific message per failure kind; infrastructure
//! faults are raised at the store-adapter boundary as [`StoreError`] and
//! translated into [`PosError`] at the engine boundary.
//!
//! # Error Categories
//!
//! - **Caller input errors**: empty cart, invalid top-up amount
//! - **Lookup errors**: account not found
//! - **Business-rule rejections**: insufficient balance
//! - **Infrastructure faults**: store timeout, store unavailable
//! - **Consistency faults**: partial write (balance updated, ledger entry lost)

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the balance engine
///
/// Each variant carries the context a caller needs to display a specific
/// message. Business failures are never retried automatically; store faults
/// may be retried by the caller because the balance mutation is a
/// store-side conditional update (retrying cannot double-charge).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PosError {
    /// Checkout was attempted with an empty cart
    ///
    /// Caller input error; recoverable by adding items to the cart.
    #[error("Cart is empty; nothing to charge to account {uid}")]
    EmptyCart {
        /// Account the checkout was attempted against
        uid: String,
    },

    /// Top-up amount is non-positive or exceeds the configured ceiling
    ///
    /// Caller input error; recoverable by correcting the amount.
    #[error("Invalid top-up amount {amount}: must be positive and at most {ceiling}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Maximum single top-up permitted by policy
        ceiling: Decimal,
    },

    /// No account exists for the given uid
    ///
    /// The caller must re-prompt for an identifier; not retried.
    #[error("Account {uid} not found")]
    AccountNotFound {
        /// The uid that did not resolve
        uid: String,
    },

    /// Account balance cannot cover the cart total
    ///
    /// Carries both amounts for caller display. The account state is left
    /// unchanged.
    #[error("Insufficient balance for account {uid}: available {available}, required {required}")]
    InsufficientBalance {
        /// Account uid
        uid: String,
        /// Cart total that was requested
        required: Decimal,
        /// Balance at the time of the check
        available: Decimal,
    },

    /// A malformed record was rejected at a construction boundary
    ///
    /// Raised by the validating constructors (negative price, zero
    /// quantity, empty uid, negative opening balance).
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of the rejected field
        message: String,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to keep the account state intact.
    #[error("Arithmetic overflow in {operation} for account {uid}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account uid
        uid: String,
    },

    /// A store call did not complete within the configured deadline
    ///
    /// Infrastructure fault; the caller may retry the whole operation.
    #[error("Store call timed out during {operation}")]
    StoreTimeout {
        /// Store operation that expired
        operation: String,
    },

    /// The backing store reported a fault
    ///
    /// Infrastructure fault; the caller may retry the whole operation.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description from the store adapter
        message: String,
    },

    /// The balance write succeeded but the paired ledger write failed
    ///
    /// Surfaced after the ledger insert has been retried `attempts` times.
    /// The deduction is already applied; `entry_id` identifies the entry
    /// that must be reconciled out-of-band. Never swallowed.
    #[error(
        "Partial write for account {uid}: balance updated but ledger entry {entry_id} \
         failed after {attempts} attempts ({message})"
    )]
    PartialWrite {
        /// Account whose balance was already mutated
        uid: String,
        /// Id of the ledger entry that was never persisted
        entry_id: String,
        /// Number of insert attempts made
        attempts: u32,
        /// Last store failure
        message: String,
    },
}

/// Faults raised by store adapters
///
/// Store implementations report infrastructure problems with this type;
/// the engine translates it into [`PosError`] before returning to callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the call
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the fault
        message: String,
    },

    /// A write conflicted with existing data (duplicate ledger entry id)
    #[error("store conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },
}

impl StoreError {
    /// Create an Unavailable error
    pub fn unavailable(message: &str) -> Self {
        StoreError::Unavailable {
            message: message.to_string(),
        }
    }

    /// Create a Conflict error
    pub fn conflict(message: &str) -> Self {
        StoreError::Conflict {
            message: message.to_string(),
        }
    }
}

impl From<StoreError> for PosError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable { message } => PosError::StoreUnavailable { message },
            StoreError::Conflict { message } => PosError::StoreUnavailable { message },
        }
    }
}

// Helper functions for creating common errors

impl PosError {
    /// Create an EmptyCart error
    pub fn empty_cart(uid: &str) -> Self {
        PosError::EmptyCart {
            uid: uid.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, ceiling: Decimal) -> Self {
        PosError::InvalidAmount { amount, ceiling }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(uid: &str) -> Self {
        PosError::AccountNotFound {
            uid: uid.to_string(),
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(uid: &str, required: Decimal, available: Decimal) -> Self {
        PosError::InsufficientBalance {
            uid: uid.to_string(),
            required,
            available,
        }
    }

    /// Create an InvalidRecord error
    pub fn invalid_record(message: &str) -> Self {
        PosError::InvalidRecord {
            message: message.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, uid: &str) -> Self {
        PosError::ArithmeticOverflow {
            operation: operation.to_string(),
            uid: uid.to_string(),
        }
    }

    /// Create a StoreTimeout error
    pub fn store_timeout(operation: &str) -> Self {
        PosError::StoreTimeout {
            operation: operation.to_string(),
        }
    }

    /// Create a PartialWrite error
    pub fn partial_write(uid: &str, entry_id: &str, attempts: u32, message: &str) -> Self {
        PosError::PartialWrite {
            uid: uid.to_string(),
            entry_id: entry_id.to_string(),
            attempts,
            message: message.to_string(),
        }
    }

    /// Whether this failure is a business-rule rejection
    ///
    /// Business rejections leave the stores untouched and are safe to log
    /// and skip when replaying a batch of operations. Infrastructure and
    /// consistency faults are not: they abort the run.
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            PosError::EmptyCart { .. }
                | PosError::InvalidAmount { .. }
                | PosError::AccountNotFound { .. }
                | PosError::InsufficientBalance { .. }
                | PosError::InvalidRecord { .. }
                | PosError::ArithmeticOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::empty_cart(
        PosError::empty_cart("04A1B2"),
        "Cart is empty; nothing to charge to account 04A1B2"
    )]
    #[case::invalid_amount(
        PosError::invalid_amount(Decimal::new(1000000, 2), Decimal::new(999900, 2)),
        "Invalid top-up amount 10000.00: must be positive and at most 9999.00"
    )]
    #[case::account_not_found(
        PosError::account_not_found("ZZZ"),
        "Account ZZZ not found"
    )]
    #[case::insufficient_balance(
        PosError::insufficient_balance("04A1B2", Decimal::new(5000, 2), Decimal::new(1000, 2)),
        "Insufficient balance for account 04A1B2: available 10.00, required 50.00"
    )]
    #[case::invalid_record(
        PosError::invalid_record("quantity must be positive"),
        "Invalid record: quantity must be positive"
    )]
    #[case::arithmetic_overflow(
        PosError::arithmetic_overflow("cart total", "04A1B2"),
        "Arithmetic overflow in cart total for account 04A1B2"
    )]
    #[case::store_timeout(
        PosError::store_timeout("account get"),
        "Store call timed out during account get"
    )]
    #[case::store_unavailable(
        PosError::StoreUnavailable { message: "connection refused".to_string() },
        "Store unavailable: connection refused"
    )]
    fn test_error_display(#[case] error: PosError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_partial_write_display() {
        let error = PosError::partial_write("04A1B2", "e-1", 3, "connection reset");
        let message = error.to_string();
        assert!(message.contains("04A1B2"));
        assert!(message.contains("e-1"));
        assert!(message.contains("3 attempts"));
        assert!(message.contains("connection reset"));
    }

    #[rstest]
    #[case::empty_cart(PosError::empty_cart("A"), true)]
    #[case::invalid_amount(PosError::invalid_amount(Decimal::ZERO, Decimal::ONE), true)]
    #[case::not_found(PosError::account_not_found("A"), true)]
    #[case::insufficient(
        PosError::insufficient_balance("A", Decimal::ONE, Decimal::ZERO),
        true
    )]
    #[case::timeout(PosError::store_timeout("account get"), false)]
    #[case::unavailable(
        PosError::StoreUnavailable { message: "down".to_string() },
        false
    )]
    #[case::partial_write(PosError::partial_write("A", "e", 3, "down"), false)]
    fn test_is_business_rejection(#[case] error: PosError, #[case] expected: bool) {
        assert_eq!(error.is_business_rejection(), expected);
    }

    #[rstest]
    #[case::unavailable(
        StoreError::unavailable("connection refused"),
        "Store unavailable: connection refused"
    )]
    #[case::conflict(
        StoreError::conflict("duplicate entry id"),
        "Store unavailable: duplicate entry id"
    )]
    fn test_store_error_conversion(#[case] store_error: StoreError, #[case] expected: &str) {
        let error: PosError = store_error.into();
        assert!(matches!(error, PosError::StoreUnavailable { .. }));
        assert_eq!(error.to_string(), expected);
    }
}
