//! Human-readable reasons for reverted calls.
//!
//! `require(cond, "message")` reverts with `0x08c379a0 ++ abi_encode(string)`;
//! compiler-inserted checks revert with `0x4e487b71 ++ abi_encode(uint256)`.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};

const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Decode revert data into a message, or `None` if it matches neither
/// `Error(string)` nor `Panic(uint256)`.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (selector, payload) = data.split_at(4);
    if selector == ERROR_STRING_SELECTOR {
        match DynSolType::String.abi_decode(payload) {
            Ok(DynSolValue::String(s)) => Some(s),
            _ => None,
        }
    } else if selector == PANIC_SELECTOR {
        match DynSolType::Uint(256).abi_decode(payload) {
            Ok(DynSolValue::Uint(code, _)) => Some(format!("panic code {code:#x}")),
            _ => None,
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_require_message() {
        let data = hex::decode(
            "08c379a0\
             0000000000000000000000000000000000000000000000000000000000000020\
             0000000000000000000000000000000000000000000000000000000000000016\
             426f756e747920616c726561647920636c61696d656400000000000000000000",
        )
        .unwrap();
        assert_eq!(decode_revert_reason(&data).as_deref(), Some("Bounty already claimed"));
    }

    #[test]
    fn decodes_panic_code() {
        let data = hex::decode(
            "4e487b710000000000000000000000000000000000000000000000000000000000000011",
        )
        .unwrap();
        assert_eq!(decode_revert_reason(&data).as_deref(), Some("panic code 0x11"));
    }

    #[test]
    fn unknown_or_short_data_is_none() {
        assert!(decode_revert_reason(&[0x08, 0xc3]).is_none());
        assert!(decode_revert_reason(&hex::decode("deadbeef").unwrap()).is_none());
    }
}
