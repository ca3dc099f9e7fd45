//! bountysync-rpc: JSON-RPC plumbing for BountySync.
//!
//! - [`RpcTransport`]: async trait every transport implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`HttpRpcClient`]: reqwest transport with exponential-backoff retry
//! - [`EthClient`]: typed `eth_*` calls implementing the sync collaborators

pub mod error;
pub mod eth;
pub mod http;
pub mod policy;
pub mod request;
pub mod transport;

pub use error::TransportError;
pub use eth::EthClient;
pub use http::{HttpClientConfig, HttpRpcClient};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::RpcTransport;
