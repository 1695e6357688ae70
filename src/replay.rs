//! Replay pipeline for CSV operation files
//!
//! Drives the engine from a CSV file of register/purchase/top-up rows and
//! writes the final account balances as CSV. This is the offline
//! counterpart to the live engine API: the same preconditions and ledger
//! writes apply to every row.
//!
//! # Architecture
//!
//! ```text
//! CSV file → AsyncReader → ReplayOps → BalanceEngine
//!                                          ↓
//!                               MemoryAccountStore / MemoryLedgerStore
//!                                          ↓
//!                               write_accounts_csv → output
//! ```
//!
//! # Error Handling
//!
//! Business rejections (empty cart, unknown account, insufficient balance,
//! invalid amount) are logged and counted; processing continues. Store
//! failures, timeouts, and partial writes are fatal and abort the replay.

use crate::core::{BalanceEngine, EngineConfig};
use crate::io::csv_format::{write_accounts_csv, ReplayOp};
use crate::io::AsyncReader;
use crate::store::{AccountStore, MemoryAccountStore, MemoryLedgerStore};
use crate::types::{CallerIdentity, PosError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{info, warn};

/// Rows read per batch from the input file
const BATCH_SIZE: usize = 1000;

/// Counters collected over a replay run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Operations that were applied successfully
    pub applied: u64,
    /// Operations rejected by a business rule
    pub rejected: u64,
}

/// Replay a CSV operation file and write final balances to output
///
/// Creates in-memory stores and an engine with the given configuration,
/// applies every row in file order, and writes the resulting account
/// balances as CSV.
///
/// # Arguments
///
/// * `input_path` - Path to the input CSV file
/// * `output` - Mutable reference to a writer for the final balances
/// * `config` - Engine configuration (top-up ceiling, timeouts, retries)
///
/// # Returns
///
/// * `Ok(ReplayStats)` with applied/rejected counts if the replay completed
/// * `Err(PosError)` on a fatal error (I/O, store failure, partial write)
pub async fn replay_file(
    input_path: &Path,
    output: &mut dyn Write,
    config: EngineConfig,
) -> Result<ReplayStats, PosError> {
    let accounts = Arc::new(MemoryAccountStore::new());
    let ledger = Arc::new(MemoryLedgerStore::new());
    let engine = BalanceEngine::new(Arc::clone(&accounts), Arc::clone(&ledger), config);

    let file = tokio::fs::File::open(input_path).await.map_err(|e| {
        PosError::invalid_record(&format!(
            "Failed to open file '{}': {}",
            input_path.display(),
            e
        ))
    })?;

    // csv-async wants futures-io; adapt the tokio file
    let mut reader = AsyncReader::new(file.compat());

    let mut stats = ReplayStats::default();

    loop {
        let batch = reader.read_batch(BATCH_SIZE).await;
        if batch.is_empty() {
            break;
        }

        for op in batch {
            match apply_op(&engine, &accounts, op).await {
                Ok(()) => stats.applied += 1,
                Err(e) if e.is_business_rejection() => {
                    warn!("Operation rejected: {}", e);
                    stats.rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    info!(
        applied = stats.applied,
        rejected = stats.rejected,
        "Replay complete"
    );

    let final_accounts = accounts.all();
    write_accounts_csv(&final_accounts, output)
        .map_err(|e| PosError::invalid_record(&e))?;

    Ok(stats)
}

async fn apply_op(
    engine: &BalanceEngine<MemoryAccountStore, MemoryLedgerStore>,
    accounts: &MemoryAccountStore,
    op: ReplayOp,
) -> Result<(), PosError> {
    match op {
        ReplayOp::Register { account } => {
            accounts.upsert(account).await?;
            Ok(())
        }
        ReplayOp::Purchase { uid, vendor, cart } => {
            let caller = CallerIdentity::vendor(&vendor);
            engine.debit(&caller, &uid, &cart).await.map(|_| ())
        }
        ReplayOp::Topup { uid, admin, amount } => {
            let caller = CallerIdentity::admin(&admin);
            engine.credit(&caller, &uid, amount).await.map(|_| ())
        }
    }
}
