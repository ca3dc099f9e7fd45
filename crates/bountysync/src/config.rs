//! Top-level configuration and its fluent builder.
//!
//! # Example
//!
//! ```rust
//! use bountysync::SyncConfigBuilder;
//!
//! let config = SyncConfigBuilder::new()
//!     .rpc_url("http://127.0.0.1:8545")
//!     .record_cap(25)
//!     .receipt_timeout_ms(60_000)
//!     .build();
//! assert_eq!(config.contract.record_cap, 25);
//! ```

use alloy_primitives::Address;
use bountysync_core::{ContractConfig, ReceiptConfig};
use bountysync_rpc::HttpClientConfig;
use serde::{Deserialize, Serialize};

use crate::observability::LogConfig;

/// Everything needed to connect a `ContractSyncManager` to a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// JSON-RPC endpoint. Without one the manager cannot connect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Account the node signs with; left to the node when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub receipt: ReceiptConfig,
    #[serde(default)]
    pub http: HttpClientConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl SyncConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Fluent builder for `SyncConfig`.
#[derive(Default)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON-RPC endpoint.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.rpc_url = Some(url.into());
        self
    }

    /// Set the signing account passed as `from`.
    pub fn sender(mut self, sender: Address) -> Self {
        self.config.sender = Some(sender);
        self
    }

    /// Point at a different contract deployment.
    pub fn contract_address(mut self, address: Address) -> Self {
        self.config.contract.address = address;
        self
    }

    /// Set the maximum records read per sync pass.
    pub fn record_cap(mut self, cap: u64) -> Self {
        self.config.contract.record_cap = cap;
        self
    }

    /// Set the raw-read selector (hex, `0x` optional).
    pub fn record_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.contract.record_selector = selector.into();
        self
    }

    pub fn receipt_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.receipt.poll_interval_ms = ms;
        self
    }

    pub fn receipt_timeout_ms(mut self, ms: u64) -> Self {
        self.config.receipt.timeout_ms = ms;
        self
    }

    pub fn log(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    pub fn build(self) -> SyncConfig {
        self.config
    }
}
