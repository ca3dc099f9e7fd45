//! Reliability policies applied by transports.

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy};
