//! State-changing contract operations and their input validation.

use alloy_primitives::utils::{ParseUnits, Unit};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated write operation against the bounty contract.
///
/// Construct through the checked constructors; a value of this type has
/// already passed validation and is safe to encode and broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum WriteOperation {
    /// Post a bounty, attaching `reward_wei` as transaction value.
    #[serde(rename_all = "camelCase")]
    CreateRecord { description: String, reward_wei: U256 },
    ApplyAsParticipant { id: u64 },
    ClaimReward { id: u64 },
    MarkCompleted { id: u64 },
}

impl WriteOperation {
    /// Validate a new bounty. `reward` is a decimal ether amount such as `"2.5"`.
    ///
    /// The description is sent as typed; surrounding whitespace only matters
    /// for the emptiness check.
    pub fn create_record(description: &str, reward: &str) -> Result<Self, ValidationError> {
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let reward = reward.trim();
        if reward.is_empty() {
            return Err(ValidationError::EmptyReward);
        }
        let invalid = || ValidationError::InvalidReward {
            input: reward.to_string(),
        };
        // Signed amounts parse as I256 and must not wrap into a huge value.
        let reward_wei = match ParseUnits::parse_units(reward, Unit::ETHER).map_err(|_| invalid())? {
            ParseUnits::U256(wei) => wei,
            ParseUnits::I256(_) => return Err(invalid()),
        };
        Ok(Self::CreateRecord {
            description: description.to_string(),
            reward_wei,
        })
    }

    pub fn apply_as_participant(id: i64) -> Result<Self, ValidationError> {
        Ok(Self::ApplyAsParticipant { id: checked_id(id)? })
    }

    pub fn claim_reward(id: i64) -> Result<Self, ValidationError> {
        Ok(Self::ClaimReward { id: checked_id(id)? })
    }

    pub fn mark_completed(id: i64) -> Result<Self, ValidationError> {
        Ok(Self::MarkCompleted { id: checked_id(id)? })
    }

    /// Operation name as exposed to the UI.
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::CreateRecord { .. } => "createRecord",
            Self::ApplyAsParticipant { .. } => "applyAsParticipant",
            Self::ClaimReward { .. } => "claimReward",
            Self::MarkCompleted { .. } => "markCompleted",
        }
    }

    /// Value attached to the transaction, in wei.
    pub fn value(&self) -> U256 {
        match self {
            Self::CreateRecord { reward_wei, .. } => *reward_wei,
            _ => U256::ZERO,
        }
    }

    /// Target record id, if the operation addresses an existing record.
    pub fn record_id(&self) -> Option<u64> {
        match self {
            Self::CreateRecord { .. } => None,
            Self::ApplyAsParticipant { id } | Self::ClaimReward { id } | Self::MarkCompleted { id } => {
                Some(*id)
            }
        }
    }
}

fn checked_id(id: i64) -> Result<u64, ValidationError> {
    u64::try_from(id).map_err(|_| ValidationError::InvalidRecordId {
        input: id.to_string(),
    })
}

/// Parse a record id typed by the user.
pub fn parse_record_id(input: &str) -> Result<u64, ValidationError> {
    let trimmed = input.trim();
    trimmed
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidRecordId {
            input: trimmed.to_string(),
        })
}
