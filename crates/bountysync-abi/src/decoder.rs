//! Record decoding with pluggable strategies.
//!
//! The getter returns `(address creator, string description, uint256 reward,
//! address hunter, bool completed, bool claimed)` encoded as return params:
//!
//! ```text
//! word 0  creator
//! word 1  offset of description
//! word 2  reward
//! word 3  hunter
//! word 4  completed
//! word 5  claimed
//! tail    description length ++ bytes
//! ```
//!
//! A strategy never fails: anything it cannot decode comes back as
//! [`DecodedRecord::Placeholder`], so one bad payload never blocks the rest.

use std::sync::Arc;

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use bountysync_core::{DecodedRecord, RawRecord, Record, RecordSet};
use tracing::{debug, warn};

use crate::descriptor::BountyBoardAbi;
use crate::error::AbiError;

const WORD: usize = 32;
const HEAD_WORDS: usize = 6;

/// Turns one raw return payload into a record.
pub trait DecodeStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn decode(&self, raw: &[u8]) -> DecodedRecord;
}

/// Full structural decode of the record tuple.
pub struct AbiTupleStrategy {
    ty: DynSolType,
}

impl AbiTupleStrategy {
    /// The bounty tuple layout, independent of any ABI file.
    pub fn bounty_tuple() -> Self {
        Self {
            ty: DynSolType::Tuple(vec![
                DynSolType::Address,
                DynSolType::String,
                DynSolType::Uint(256),
                DynSolType::Address,
                DynSolType::Bool,
                DynSolType::Bool,
            ]),
        }
    }

    /// Use the output types declared for the record getter.
    pub fn from_descriptor(abi: &BountyBoardAbi) -> Result<Self, AbiError> {
        Ok(Self {
            ty: DynSolType::Tuple(abi.record_output_types()?),
        })
    }

    fn try_decode(&self, raw: &[u8]) -> Result<Record, AbiError> {
        let decoded = self
            .ty
            .abi_decode_params(raw)
            .map_err(|e| AbiError::DecodeFailed { reason: e.to_string() })?;

        let fields = match decoded {
            DynSolValue::Tuple(fields) => fields,
            other => vec![other],
        };

        match fields.as_slice() {
            [DynSolValue::Address(creator), DynSolValue::String(description), DynSolValue::Uint(reward, _), DynSolValue::Address(hunter), DynSolValue::Bool(completed), DynSolValue::Bool(claimed)] => {
                Ok(Record::from_fields(
                    *creator,
                    description.clone(),
                    *reward,
                    *hunter,
                    *completed,
                    *claimed,
                ))
            }
            _ => Err(AbiError::DecodeFailed {
                reason: format!("unexpected record shape ({} fields)", fields.len()),
            }),
        }
    }
}

impl DecodeStrategy for AbiTupleStrategy {
    fn name(&self) -> &'static str {
        "abi-tuple"
    }

    fn decode(&self, raw: &[u8]) -> DecodedRecord {
        match self.try_decode(raw) {
            Ok(record) => DecodedRecord::Decoded(record),
            Err(e) => {
                debug!(error = %e, len = raw.len(), "record decode failed, using placeholder");
                DecodedRecord::Placeholder(placeholder_from_words(raw))
            }
        }
    }
}

/// Raw fallback: reads only the fixed head words and never the description.
///
/// Always yields a placeholder; the completion flags are kept when the head
/// is complete and both words hold canonical booleans.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawWordStrategy;

impl DecodeStrategy for RawWordStrategy {
    fn name(&self) -> &'static str {
        "raw-word"
    }

    fn decode(&self, raw: &[u8]) -> DecodedRecord {
        DecodedRecord::Placeholder(placeholder_from_words(raw))
    }
}

fn placeholder_from_words(raw: &[u8]) -> Record {
    let mut record = Record::placeholder();
    if raw.len() < HEAD_WORDS * WORD {
        return record;
    }
    if let (Some(completed), Some(claimed)) = (bool_word(raw, 4), bool_word(raw, 5)) {
        record.is_completed = completed;
        record.is_claimed = claimed;
    }
    record
}

fn bool_word(raw: &[u8], index: usize) -> Option<bool> {
    let word = &raw[index * WORD..(index + 1) * WORD];
    if word[..WORD - 1].iter().any(|b| *b != 0) {
        return None;
    }
    match word[WORD - 1] {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Decodes raw record payloads with a configurable strategy.
#[derive(Clone)]
pub struct RecordDecoder {
    strategy: Arc<dyn DecodeStrategy>,
}

impl RecordDecoder {
    pub fn new(strategy: Arc<dyn DecodeStrategy>) -> Self {
        Self { strategy }
    }

    /// Structured decode against the built-in bounty tuple.
    pub fn structured() -> Self {
        Self::new(Arc::new(AbiTupleStrategy::bounty_tuple()))
    }

    /// Prefer the typed layout from the descriptor; fall back to raw words
    /// when the descriptor has no usable record getter.
    pub fn from_descriptor(abi: &BountyBoardAbi) -> Self {
        match AbiTupleStrategy::from_descriptor(abi) {
            Ok(strategy) => Self::new(Arc::new(strategy)),
            Err(e) => {
                warn!(error = %e, "no typed record layout, decoding raw words only");
                Self::new(Arc::new(RawWordStrategy))
            }
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn decode(&self, raw: &RawRecord) -> DecodedRecord {
        self.strategy.decode(&raw.data)
    }

    /// Decode a whole batch; output length always equals input length.
    pub fn decode_all(&self, raws: &[RawRecord]) -> RecordSet {
        let entries: Vec<DecodedRecord> = raws.iter().map(|raw| self.decode(raw)).collect();
        let placeholders = entries.iter().filter(|e| e.is_placeholder()).count();
        if placeholders > 0 {
            debug!(
                strategy = self.strategy.name(),
                total = entries.len(),
                placeholders,
                "decoded batch with placeholders"
            );
        }
        RecordSet::new(entries)
    }
}

impl std::fmt::Debug for RecordDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDecoder")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
