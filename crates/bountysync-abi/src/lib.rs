//! # bountysync-abi
//!
//! ABI handling for the bounty-board contract, built on alloy-rs.
//!
//! ## Implementation notes
//! - The interface-descriptor table is the contract's ABI JSON, bundled as
//!   [`BOUNTY_BOARD_ABI`] and parsed with `alloy-json-abi`
//! - Write calls are encoded as `selector ++ abi_encode(args)`
//! - Raw record reads are `record_selector ++ uint256(index)`
//! - Record payloads decode through a pluggable [`DecodeStrategy`]; failures
//!   become tagged placeholders, never errors

pub mod calldata;
pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod revert;

pub use calldata::{parse_selector, record_calldata};
pub use decoder::{AbiTupleStrategy, DecodeStrategy, RawWordStrategy, RecordDecoder};
pub use descriptor::{BountyBoardAbi, BOUNTY_BOARD_ABI};
pub use error::AbiError;
pub use revert::decode_revert_reason;
