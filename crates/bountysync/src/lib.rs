//! bountysync: contract state synchronization and transaction lifecycle
//! management for the bounty board.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bountysync::{ContractSyncManager, SyncConfigBuilder};
//!
//! # async fn example() -> Result<(), bountysync::SyncError> {
//! let config = SyncConfigBuilder::new()
//!     .rpc_url("http://127.0.0.1:8545")
//!     .build();
//! let manager = ContractSyncManager::connect(&config)?;
//!
//! let snapshot = manager.refresh().await;
//! println!("{} bounties, {} ETH known", snapshot.total_record_count, snapshot.aggregate_known_reward_ether());
//!
//! manager.create_record("fix bug", "2.5").await?;
//! let mut status = manager.subscribe_status();
//! while status.changed().await.is_ok() {
//!     println!("{}", status.borrow().transaction_status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`BatchReader`]: capped, concurrent, fail-together raw record reads
//! - [`TransactionLifecycle`]: the single tracked write, last-writer-wins
//! - [`ContractSyncManager`]: read model, actions and status
//! - [`observability::init_tracing`]: subscriber setup

pub mod batch;
pub mod config;
pub mod lifecycle;
pub mod manager;
pub mod observability;

pub use batch::BatchReader;
pub use config::{SyncConfig, SyncConfigBuilder};
pub use lifecycle::{Resolution, Ticket, TransactionLifecycle};
pub use manager::{ActionOutcome, Collaborators, ContractSyncManager};
pub use observability::{init_tracing, LogConfig};

pub use bountysync_abi::{DecodeStrategy, RecordDecoder};
pub use bountysync_core::{
    DecodedRecord, Record, RecordSet, SyncError, SyncSnapshot, SyncStatus, TransactionStatus, TxHash,
    ValidationError, WriteOperation,
};
