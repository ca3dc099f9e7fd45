//! External collaborators: count read, signing/broadcast, receipt wait.
//!
//! Each trait is object-safe and stored as `Arc<dyn _>` so the sync layer can
//! run against a live node or a scripted test double.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::error::SyncError;
use crate::types::TxHash;

/// A transaction ready to hand to the signing/broadcast service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Bytes,
    /// Attached value in wei.
    pub value: U256,
}

/// Resolution of a receipt wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Confirmed { block_number: Option<u64> },
    Reverted { reason: Option<String> },
    TimedOut { ms: u64 },
}

/// Reads the number of records held by the contract.
#[async_trait]
pub trait RecordCountReader: Send + Sync {
    async fn record_count(&self) -> Result<u64, SyncError>;
}

/// Signs and broadcasts a transaction, returning its handle on acceptance.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, SyncError>;
}

/// Waits for a broadcast transaction to resolve.
#[async_trait]
pub trait ReceiptWaiter: Send + Sync {
    async fn wait_for_receipt(&self, handle: TxHash) -> Result<ReceiptOutcome, SyncError>;
}
