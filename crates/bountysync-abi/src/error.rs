use bountysync_core::SyncError;
use thiserror::Error;

/// Errors raised while encoding calls or decoding fixed-shape returns.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid ABI JSON: {0}")]
    InvalidAbi(#[from] serde_json::Error),

    #[error("function '{name}' not found in ABI")]
    FunctionNotFound { name: String },

    #[error("ABI encode failed: {reason}")]
    EncodeFailed { reason: String },

    #[error("ABI decode failed: {reason}")]
    DecodeFailed { reason: String },

    #[error("invalid selector '{input}': expected 4 hex bytes")]
    InvalidSelector { input: String },
}

impl From<AbiError> for SyncError {
    fn from(e: AbiError) -> Self {
        SyncError::Abi(e.to_string())
    }
}
