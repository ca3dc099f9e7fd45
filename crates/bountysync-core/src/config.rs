//! Contract constants and receipt-wait settings.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_RECORD_CAP;

/// Deployed bounty-board contract.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("B61aCB4e6bA06CE5ef0c0846FE7b806670E9a747");

/// Selector used by the raw indexed record read.
pub const DEFAULT_RECORD_SELECTOR: &str = "0x3b3b57de";

/// The single contract instance the adapter talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    #[serde(default = "default_address")]
    pub address: Address,
    /// Maximum records materialized per sync pass.
    #[serde(default = "default_record_cap")]
    pub record_cap: u64,
    /// Hex selector prepended to the index in raw record reads.
    #[serde(default = "default_record_selector")]
    pub record_selector: String,
    /// Block tag for all reads.
    #[serde(default = "default_block_tag")]
    pub block_tag: String,
    #[serde(default)]
    pub functions: FunctionNames,
}

fn default_address() -> Address {
    DEFAULT_CONTRACT_ADDRESS
}
fn default_record_cap() -> u64 {
    DEFAULT_RECORD_CAP
}
fn default_record_selector() -> String {
    DEFAULT_RECORD_SELECTOR.into()
}
fn default_block_tag() -> String {
    "latest".into()
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS,
            record_cap: DEFAULT_RECORD_CAP,
            record_selector: DEFAULT_RECORD_SELECTOR.into(),
            block_tag: "latest".into(),
            functions: FunctionNames::default(),
        }
    }
}

/// Operation → ABI function name mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunctionNames {
    pub create_record: String,
    pub apply_as_participant: String,
    pub claim_reward: String,
    pub mark_completed: String,
    pub record_count: String,
    pub record_at: String,
}

impl Default for FunctionNames {
    fn default() -> Self {
        Self {
            create_record: "createBounty".into(),
            apply_as_participant: "applyAsHunter".into(),
            claim_reward: "claimReward".into(),
            mark_completed: "markCompleted".into(),
            record_count: "getBountyCount".into(),
            record_at: "bounties".into(),
        }
    }
}

/// How long and how often to wait for a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_poll_interval_ms() -> u64 { 1_000 }
fn default_timeout_ms() -> u64 { 120_000 }

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg: ContractConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ContractConfig::default());
        assert_eq!(cfg.record_cap, 50);
        assert_eq!(cfg.functions.apply_as_participant, "applyAsHunter");
    }

    #[test]
    fn partial_function_override() {
        let cfg: ContractConfig =
            serde_json::from_str(r#"{"record_cap": 10, "functions": {"recordCount": "count"}}"#).unwrap();
        assert_eq!(cfg.record_cap, 10);
        assert_eq!(cfg.functions.record_count, "count");
        assert_eq!(cfg.functions.record_at, "bounties");
    }
}
