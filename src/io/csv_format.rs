//! CSV format handling for replay operations and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV rows to replay operations
//! - Final balance output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! Columns: `op,uid,name,actor,product,unit_price,quantity,amount`
//!
//! - `register` rows seed an account: `uid`, `name`, optional `amount` as
//!   an opening balance (default 0)
//! - `purchase` rows charge one line item: `uid`, `actor` (vendor name),
//!   `product`, `unit_price`, `quantity`
//! - `topup` rows credit an account: `uid`, `actor` (admin name), `amount`
//!
//! Unused columns may be left empty on any row.

use crate::types::{Account, CartLine};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Every column except `op` and `uid` is optional; which ones are
/// required depends on the operation and is validated during conversion.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub unit_price: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

/// One operation parsed from a replay row
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOp {
    /// Seed an account with an optional opening balance
    Register {
        /// Account to upsert before any purchase/top-up touches it
        account: Account,
    },

    /// Charge a single-line cart to an account
    Purchase {
        /// Account uid
        uid: String,
        /// Vendor name for attribution
        vendor: String,
        /// The cart; replay rows carry exactly one line
        cart: Vec<CartLine>,
    },

    /// Credit an account
    Topup {
        /// Account uid
        uid: String,
        /// Admin name for attribution
        admin: String,
        /// Amount to credit
        amount: Decimal,
    },
}

fn required<'a>(field: &'a Option<String>, name: &str, uid: &str) -> Result<&'a str, String> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing {} for uid {}", name, uid)),
    }
}

fn parse_decimal(value: &str, field: &str, uid: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim())
        .map_err(|_| format!("invalid {} '{}' for uid {}", field, value, uid))
}

/// Convert a CsvRecord to a ReplayOp
///
/// Validates that the columns the operation needs are present and
/// well-formed, and routes through the domain constructors so the same
/// boundary checks apply as everywhere else.
///
/// # Returns
///
/// Result containing either:
/// - Ok(ReplayOp) - successfully converted row
/// - Err(String) - message describing the conversion failure
pub fn convert_csv_record(record: CsvRecord) -> Result<ReplayOp, String> {
    match record.op.to_lowercase().as_str() {
        "register" => {
            let name = required(&record.name, "name", &record.uid)?;
            let balance = match record.amount.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => {
                    parse_decimal(value, "opening balance", &record.uid)?
                }
                _ => Decimal::ZERO,
            };
            let account =
                Account::new(&record.uid, name, balance).map_err(|e| e.to_string())?;
            Ok(ReplayOp::Register { account })
        }
        "purchase" => {
            let vendor = required(&record.actor, "actor", &record.uid)?.to_string();
            let product = required(&record.product, "product", &record.uid)?;
            let unit_price = parse_decimal(
                required(&record.unit_price, "unit_price", &record.uid)?,
                "unit_price",
                &record.uid,
            )?;
            let quantity: u32 = required(&record.quantity, "quantity", &record.uid)?
                .parse()
                .map_err(|_| {
                    format!(
                        "invalid quantity '{}' for uid {}",
                        record.quantity.as_deref().unwrap_or(""),
                        record.uid
                    )
                })?;

            let line = CartLine::new(product, unit_price, quantity).map_err(|e| e.to_string())?;
            Ok(ReplayOp::Purchase {
                uid: record.uid,
                vendor,
                cart: vec![line],
            })
        }
        "topup" => {
            let admin = required(&record.actor, "actor", &record.uid)?.to_string();
            let amount = parse_decimal(
                required(&record.amount, "amount", &record.uid)?,
                "amount",
                &record.uid,
            )?;
            Ok(ReplayOp::Topup {
                uid: record.uid,
                admin,
                amount,
            })
        }
        other => Err(format!("invalid operation '{}' for uid {}", other, record.uid)),
    }
}

/// Write final account balances to CSV format
///
/// Writes accounts with columns: uid, name, balance. Accounts are sorted
/// by uid for deterministic output; balances are printed with two decimal
/// places.
///
/// # Arguments
///
/// * `accounts` - Slice of account states to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["uid", "name", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.uid.cmp(&b.uid));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.uid.clone(),
                account.name.clone(),
                format!("{:.2}", account.balance),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
