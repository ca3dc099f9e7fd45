//! Bulk enumeration of contract-held records.
//!
//! One `eth_call` per index, all issued at once and joined as a unit. Any
//! failed call fails the whole batch, so a caller never sees a record list
//! mixing fresh and stale entries.

use std::sync::Arc;

use alloy_primitives::Bytes;
use bountysync_abi::{parse_selector, record_calldata, AbiError};
use bountysync_core::{ContractConfig, RawRecord};
use bountysync_rpc::{EthClient, TransportError};
use futures::future;
use tracing::{debug, warn};

/// Issues the indexed raw reads.
pub struct BatchReader {
    client: Option<Arc<EthClient>>,
    selector: [u8; 4],
}

impl BatchReader {
    /// Reader using the selector from `contract.record_selector`.
    ///
    /// `client` is `None` when no provider is reachable; every fetch then
    /// yields an empty batch.
    pub fn new(client: Option<Arc<EthClient>>, contract: &ContractConfig) -> Result<Self, AbiError> {
        Ok(Self {
            client,
            selector: parse_selector(&contract.record_selector)?,
        })
    }

    /// Override the 4-byte selector prepended to each index.
    pub fn with_selector(mut self, selector: [u8; 4]) -> Self {
        self.selector = selector;
        self
    }

    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Read records `0..min(count, cap)`.
    ///
    /// Returns an empty batch without touching the network when `count` is
    /// zero or no client is configured; returns an empty batch when any
    /// single read fails.
    pub async fn fetch_all(&self, count: u64, cap: u64) -> Vec<RawRecord> {
        if count == 0 {
            return Vec::new();
        }
        let Some(client) = self.client.as_deref() else {
            debug!(count, "no provider available, skipping record reads");
            return Vec::new();
        };

        let limit = count.min(cap);
        let reads = (0..limit).map(|index| self.read_one(client, index));
        match future::try_join_all(reads).await {
            Ok(records) => {
                debug!(count, limit, "fetched record batch");
                records
            }
            Err(e) => {
                warn!(count, limit, error = %e, "record batch failed, discarding partial results");
                Vec::new()
            }
        }
    }

    async fn read_one(&self, client: &EthClient, index: u64) -> Result<RawRecord, TransportError> {
        let data: Bytes = client.eth_call(&record_calldata(self.selector, index)).await?;
        Ok(RawRecord { index, data })
    }
}

impl std::fmt::Debug for BatchReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchReader")
            .field("selector", &format_args!("0x{}", hex::encode(self.selector)))
            .field("available", &self.is_available())
            .finish()
    }
}
