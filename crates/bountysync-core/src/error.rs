//! Error types shared across the sync pipeline.

use thiserror::Error;

use crate::types::TxHash;

/// Input rejected before any network activity.
///
/// Validation failures are surfaced as a no-op submission, never as an
/// error returned from an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description must not be empty")]
    EmptyDescription,

    #[error("reward amount must not be empty")]
    EmptyReward,

    #[error("reward amount '{input}' is not a valid ether amount")]
    InvalidReward { input: String },

    #[error("record id '{input}' is not a non-negative integer")]
    InvalidRecordId { input: String },
}

/// Errors produced by the write path and by external reads.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// Signing/broadcast collaborator refused or failed to broadcast.
    #[error("transaction submission failed: {reason}")]
    Submission { reason: String },

    /// Receipt wait failed for a transport reason.
    #[error("receipt wait failed for {handle}: {reason}")]
    Receipt { handle: TxHash, reason: String },

    /// Receipt arrived with a failed status.
    #[error("transaction {handle} reverted{}", reason_suffix(.reason))]
    Reverted { handle: TxHash, reason: Option<String> },

    /// No receipt within the configured window.
    #[error("no receipt for {handle} after {ms}ms")]
    ReceiptTimeout { handle: TxHash, ms: u64 },

    /// Record-count read failed.
    #[error("record count read failed: {reason}")]
    CountRead { reason: String },

    /// Calldata could not be encoded or a payload could not be decoded.
    #[error("ABI error: {0}")]
    Abi(String),

    /// Underlying RPC transport error.
    #[error("transport error: {0}")]
    Transport(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default()
}

impl SyncError {
    /// Returns `true` if the error belongs to the write path
    /// (submission or receipt), which ends the tracked transaction.
    pub fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::Submission { .. }
                | Self::Receipt { .. }
                | Self::Reverted { .. }
                | Self::ReceiptTimeout { .. }
        )
    }
}
