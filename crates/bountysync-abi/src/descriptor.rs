//! The contract's interface-descriptor table and calldata encoding.
//!
//! # Usage
//! ```ignore
//! let abi = BountyBoardAbi::bundled()?;
//! let op = WriteOperation::create_record("fix bug", "2.5")?;
//! let calldata = abi.encode_operation(&op)?;
//! ```

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_dyn_abi::Specifier;
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Bytes, U256};
use bountysync_core::{FunctionNames, WriteOperation};

use crate::error::AbiError;

/// ABI JSON of the deployed bounty-board contract.
pub const BOUNTY_BOARD_ABI: &str = include_str!("../abi/BountyBoard.json");

/// Parsed ABI plus the operation → function-name mapping.
#[derive(Debug, Clone)]
pub struct BountyBoardAbi {
    abi: JsonAbi,
    names: FunctionNames,
}

impl BountyBoardAbi {
    /// Parse the bundled ABI with the default function names.
    pub fn bundled() -> Result<Self, AbiError> {
        Self::from_abi_json(BOUNTY_BOARD_ABI, FunctionNames::default())
    }

    /// Create a descriptor from a standard Ethereum ABI JSON string.
    pub fn from_abi_json(abi_json: &str, names: FunctionNames) -> Result<Self, AbiError> {
        let abi: JsonAbi = serde_json::from_str(abi_json)?;
        Ok(Self { abi, names })
    }

    pub fn names(&self) -> &FunctionNames {
        &self.names
    }

    /// Returns all function names in this ABI.
    pub fn function_names(&self) -> Vec<&str> {
        self.abi.functions().map(|f| f.name.as_str()).collect()
    }

    fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.abi
            .functions()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::FunctionNotFound { name: name.to_string() })
    }

    /// Returns the 4-byte selector for a named function.
    pub fn selector_for(&self, name: &str) -> Result<[u8; 4], AbiError> {
        Ok(self.function(name)?.selector().0)
    }

    /// Encode `selector ++ abi_encode_params(args)` for a named function.
    pub fn encode_call(&self, name: &str, args: Vec<DynSolValue>) -> Result<Bytes, AbiError> {
        let func = self.function(name)?;
        if args.len() != func.inputs.len() {
            return Err(AbiError::EncodeFailed {
                reason: format!(
                    "argument count mismatch for '{name}': ABI has {}, got {}",
                    func.inputs.len(),
                    args.len()
                ),
            });
        }

        for (param, arg) in func.inputs.iter().zip(args.iter()) {
            let ty = param.resolve().map_err(|e| AbiError::EncodeFailed {
                reason: format!("param '{}': {e}", param.name),
            })?;
            if !ty.matches(arg) {
                return Err(AbiError::EncodeFailed {
                    reason: format!("param '{}' expects {}", param.name, ty.sol_type_name()),
                });
            }
        }

        let mut calldata = func.selector().to_vec();
        calldata.extend_from_slice(&DynSolValue::Tuple(args).abi_encode_params());
        Ok(calldata.into())
    }

    /// Calldata for a validated write operation.
    pub fn encode_operation(&self, op: &WriteOperation) -> Result<Bytes, AbiError> {
        match op {
            WriteOperation::CreateRecord { description, .. } => self.encode_call(
                &self.names.create_record,
                vec![DynSolValue::String(description.clone())],
            ),
            WriteOperation::ApplyAsParticipant { id } => {
                self.encode_call(&self.names.apply_as_participant, vec![uint(*id)])
            }
            WriteOperation::ClaimReward { id } => {
                self.encode_call(&self.names.claim_reward, vec![uint(*id)])
            }
            WriteOperation::MarkCompleted { id } => {
                self.encode_call(&self.names.mark_completed, vec![uint(*id)])
            }
        }
    }

    /// Calldata for the zero-argument record-count read.
    pub fn record_count_calldata(&self) -> Result<Bytes, AbiError> {
        self.encode_call(&self.names.record_count, vec![])
    }

    /// Decode the `uint256` record count.
    pub fn decode_record_count(&self, data: &[u8]) -> Result<u64, AbiError> {
        match DynSolType::Uint(256).abi_decode(data) {
            Ok(DynSolValue::Uint(count, _)) => u64::try_from(count).map_err(|_| AbiError::DecodeFailed {
                reason: format!("record count {count} does not fit in u64"),
            }),
            Ok(other) => Err(AbiError::DecodeFailed {
                reason: format!("expected uint256, got {other:?}"),
            }),
            Err(e) => Err(AbiError::DecodeFailed {
                reason: format!("record count: {e}"),
            }),
        }
    }

    /// Output types of the indexed record getter, resolved from the ABI.
    pub fn record_output_types(&self) -> Result<Vec<DynSolType>, AbiError> {
        let func = self.function(&self.names.record_at)?;
        func.outputs
            .iter()
            .map(|p| {
                p.resolve().map_err(|e| AbiError::DecodeFailed {
                    reason: format!("output '{}': {e}", p.name),
                })
            })
            .collect()
    }

    /// Selector of the indexed record getter as declared in the ABI.
    pub fn record_at_selector(&self) -> Result<[u8; 4], AbiError> {
        self.selector_for(&self.names.record_at)
    }
}

fn uint(id: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(id), 256)
}
