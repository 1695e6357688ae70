//! Caller identity for engine operations
//!
//! Who is acting is an explicit value passed into every engine call, not
//! ambient session state. The engine uses it only for the attribution
//! field on ledger entries; permission decisions stay with the caller.

use serde::{Deserialize, Serialize};

/// Role of the party invoking an engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A canteen vendor operating a point-of-sale terminal
    Vendor,

    /// An administrator managing balances from the dashboard
    Admin,
}

/// The identity recorded on ledger entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Vendor or admin
    pub role: Role,

    /// Display name written into `attribution`
    pub name: String,
}

impl CallerIdentity {
    /// Identity for a vendor terminal
    pub fn vendor(name: &str) -> Self {
        CallerIdentity {
            role: Role::Vendor,
            name: name.to_string(),
        }
    }

    /// Identity for a dashboard admin
    pub fn admin(name: &str) -> Self {
        CallerIdentity {
            role: Role::Admin,
            name: name.to_string(),
        }
    }
}
