//! bountysync-core: foundation types and traits for BountySync.
//!
//! # Overview
//!
//! BountySync keeps a user interface in step with a single bounty-board
//! contract. This crate defines the pieces every other crate shares:
//!
//! - [`Record`] / [`DecodedRecord`] / [`RecordSet`]: the cached on-chain data
//! - [`TransactionStatus`] / [`SyncStatus`] / [`SyncSnapshot`]: what the UI reads
//! - [`WriteOperation`]: validated state-changing calls
//! - [`SyncError`] / [`ValidationError`]: error taxonomy
//! - [`collaborator`]: traits for the external read, write and receipt paths
//! - [`config`]: contract constants consumed as configuration

pub mod collaborator;
pub mod config;
pub mod error;
pub mod operation;
pub mod types;

pub use collaborator::{ReceiptOutcome, ReceiptWaiter, RecordCountReader, TransactionRequest, TransactionSender};
pub use config::{ContractConfig, FunctionNames, ReceiptConfig};
pub use error::{SyncError, ValidationError};
pub use operation::{parse_record_id, WriteOperation};
pub use types::{
    DecodedRecord, RawRecord, Record, RecordSet, SyncSnapshot, SyncStatus, TransactionStatus, TxHash,
    DEFAULT_RECORD_CAP, PLACEHOLDER_DESCRIPTION,
};
