//! Read model: records, transaction status and derived snapshots.

use alloy_primitives::utils::format_ether;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Network transaction identifier returned on broadcast acceptance.
pub type TxHash = B256;

/// Description substituted when the on-chain string cannot be decoded.
pub const PLACEHOLDER_DESCRIPTION: &str = "<on-chain description (not decoded)>";

/// Hard limit on records enumerated per synchronization pass.
pub const DEFAULT_RECORD_CAP: u64 = 50;

/// One bounty held by the contract.
///
/// Identity is the record's position in the contract's list; the struct
/// itself does not carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub creator: Address,
    pub description: String,
    /// Reward in wei, rendered as a decimal string.
    #[serde(with = "decimal_u256")]
    pub reward_amount: U256,
    /// `None` while no participant has applied (zero address on-chain).
    pub assignee: Option<Address>,
    pub is_completed: bool,
    pub is_claimed: bool,
}

impl Record {
    /// Build a record from raw contract fields, mapping the zero
    /// assignee address to `None`.
    pub fn from_fields(
        creator: Address,
        description: String,
        reward_amount: U256,
        assignee: Address,
        is_completed: bool,
        is_claimed: bool,
    ) -> Self {
        Self {
            creator,
            description,
            reward_amount,
            assignee: (assignee != Address::ZERO).then_some(assignee),
            is_completed,
            is_claimed,
        }
    }

    /// The record used when a payload cannot be fully decoded.
    pub fn placeholder() -> Self {
        Self {
            creator: Address::ZERO,
            description: PLACEHOLDER_DESCRIPTION.to_string(),
            reward_amount: U256::ZERO,
            assignee: None,
            is_completed: false,
            is_claimed: false,
        }
    }
}

/// Outcome of decoding one raw record payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum DecodedRecord {
    /// Every field decoded from the payload.
    Decoded(Record),
    /// The payload could not be fully decoded; description, creator and
    /// reward hold placeholder values.
    Placeholder(Record),
}

impl DecodedRecord {
    pub fn record(&self) -> &Record {
        match self {
            Self::Decoded(r) | Self::Placeholder(r) => r,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Reward counted towards the aggregate; placeholders contribute zero.
    pub fn known_reward(&self) -> U256 {
        match self {
            Self::Decoded(r) => r.reward_amount,
            Self::Placeholder(_) => U256::ZERO,
        }
    }
}

/// Raw return payload of one indexed record read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub index: u64,
    pub data: Bytes,
}

/// Ordered records indexed `0..len`, rebuilt wholesale on each pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet(Vec<DecodedRecord>);

impl RecordSet {
    pub fn new(entries: Vec<DecodedRecord>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a record by its on-chain index.
    pub fn get(&self, index: usize) -> Option<&DecodedRecord> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodedRecord> {
        self.0.iter()
    }

    /// Sum of decoded rewards, saturating at `U256::MAX`.
    pub fn known_reward_total(&self) -> U256 {
        self.0
            .iter()
            .fold(U256::ZERO, |acc, r| acc.saturating_add(r.known_reward()))
    }

    pub fn placeholder_count(&self) -> usize {
        self.0.iter().filter(|r| r.is_placeholder()).count()
    }
}

/// Status of the single tracked write operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    #[default]
    Idle,
    Submitting,
    PendingConfirmation,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    /// `true` while a write is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Submitting | Self::PendingConfirmation)
    }

    /// `true` once the tracked handle has resolved.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Submitting => write!(f, "submitting"),
            Self::PendingConfirmation => write!(f, "pending-confirmation"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Derived read model handed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub total_record_count: u64,
    /// Sum of decoded rewards in wei; `"0"` when nothing decoded.
    #[serde(with = "decimal_u256")]
    pub aggregate_known_reward: U256,
    pub record_set: RecordSet,
}

impl SyncSnapshot {
    /// Recompute the aggregate from a fresh record set.
    pub fn derive(total_record_count: u64, record_set: RecordSet) -> Self {
        Self {
            total_record_count,
            aggregate_known_reward: record_set.known_reward_total(),
            record_set,
        }
    }

    /// The aggregate reward formatted in ether.
    pub fn aggregate_known_reward_ether(&self) -> String {
        format_ether(self.aggregate_known_reward)
    }
}

/// Write-path status handed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_busy: bool,
    pub transaction_status: TransactionStatus,
    pub last_handle: Option<TxHash>,
    pub last_error: Option<String>,
    pub is_pending: bool,
    pub is_confirming: bool,
    pub is_confirmed: bool,
}

impl SyncStatus {
    pub fn new(
        transaction_status: TransactionStatus,
        last_handle: Option<TxHash>,
        last_error: Option<String>,
    ) -> Self {
        Self {
            is_busy: transaction_status.is_busy(),
            transaction_status,
            last_handle,
            last_error,
            is_pending: transaction_status == TransactionStatus::Submitting,
            is_confirming: transaction_status == TransactionStatus::PendingConfirmation,
            is_confirmed: transaction_status == TransactionStatus::Confirmed,
        }
    }
}

/// Serialize `U256` as a base-10 string.
mod decimal_u256 {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse::<U256>().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(reward: u64) -> DecodedRecord {
        DecodedRecord::Decoded(Record::from_fields(
            Address::repeat_byte(0x11),
            "fix bug".into(),
            U256::from(reward),
            Address::ZERO,
            false,
            false,
        ))
    }

    #[test]
    fn zero_assignee_maps_to_none() {
        let r = Record::from_fields(
            Address::ZERO,
            String::new(),
            U256::ZERO,
            Address::ZERO,
            false,
            false,
        );
        assert!(r.assignee.is_none());

        let hunter = Address::repeat_byte(0x22);
        let r = Record::from_fields(Address::ZERO, String::new(), U256::ZERO, hunter, false, false);
        assert_eq!(r.assignee, Some(hunter));
    }

    #[test]
    fn placeholders_do_not_count_towards_reward() {
        let set = RecordSet::new(vec![
            decoded(5),
            DecodedRecord::Placeholder(Record::placeholder()),
            decoded(7),
        ]);
        assert_eq!(set.known_reward_total(), U256::from(12));
        assert_eq!(set.placeholder_count(), 1);
    }

    #[test]
    fn empty_snapshot_has_zero_aggregate() {
        let snap = SyncSnapshot::derive(0, RecordSet::default());
        assert_eq!(snap.aggregate_known_reward.to_string(), "0");
        assert!(snap.aggregate_known_reward_ether().starts_with("0."));
    }

    #[test]
    fn snapshot_serializes_reward_as_decimal() {
        let snap = SyncSnapshot::derive(1, RecordSet::new(vec![decoded(2_500)]));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["aggregateKnownReward"], "2500");
        assert_eq!(json["recordSet"][0]["kind"], "decoded");
        assert_eq!(json["recordSet"][0]["record"]["rewardAmount"], "2500");
    }

    #[test]
    fn status_flags_follow_transaction_status() {
        let s = SyncStatus::new(TransactionStatus::PendingConfirmation, None, None);
        assert!(s.is_busy && s.is_confirming && !s.is_pending && !s.is_confirmed);

        let s = SyncStatus::new(TransactionStatus::Failed, None, Some("boom".into()));
        assert!(!s.is_busy);
        assert_eq!(s.transaction_status.to_string(), "failed");
    }
}
