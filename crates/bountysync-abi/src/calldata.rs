//! Raw calldata for the indexed record read.
//!
//! Layout: `selector (4 bytes) ++ index as 32-byte big-endian uint256`.

use alloy_primitives::{Bytes, U256};

use crate::error::AbiError;

/// Parse a selector written as hex, with or without the `0x` prefix.
pub fn parse_selector(input: &str) -> Result<[u8; 4], AbiError> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(stripped).map_err(|_| AbiError::InvalidSelector {
        input: input.to_string(),
    })?;
    bytes.try_into().map_err(|_| AbiError::InvalidSelector {
        input: input.to_string(),
    })
}

/// Build the 36-byte payload reading record `index`.
pub fn record_calldata(selector: [u8; 4], index: u64) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&U256::from(index).to_be_bytes::<32>());
    data.into()
}
