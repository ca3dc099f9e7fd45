//! Typed `eth_*` calls against the bounty contract.
//!
//! `EthClient` implements the three external collaborators the sync layer
//! needs: the record-count read, the signing/broadcast path
//! (`eth_sendTransaction`, signed by the wallet behind the endpoint) and the
//! receipt wait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U64};
use async_trait::async_trait;
use bountysync_abi::{decode_revert_reason, BountyBoardAbi};
use bountysync_core::{
    ContractConfig, ReceiptConfig, ReceiptOutcome, ReceiptWaiter, RecordCountReader, SyncError,
    TransactionRequest, TransactionSender, TxHash,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::request::{JsonRpcError, JsonRpcRequest};
use crate::transport::RpcTransport;

/// Fields of a transaction receipt the lifecycle cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub transaction_hash: Option<TxHash>,
    pub block_number: Option<U64>,
    /// `0x1` success, `0x0` failure (post-Byzantium).
    pub status: Option<U64>,
}

impl ReceiptSummary {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)).unwrap_or(true)
    }
}

/// Ethereum JSON-RPC client bound to one contract.
pub struct EthClient {
    transport: Arc<dyn RpcTransport>,
    abi: Arc<BountyBoardAbi>,
    contract: Address,
    block_tag: String,
    receipt: ReceiptConfig,
    from: Option<Address>,
    next_id: AtomicU64,
}

impl EthClient {
    pub fn new(
        transport: Arc<dyn RpcTransport>,
        abi: Arc<BountyBoardAbi>,
        contract: &ContractConfig,
        receipt: ReceiptConfig,
    ) -> Self {
        Self {
            transport,
            abi,
            contract: contract.address,
            block_tag: contract.block_tag.clone(),
            receipt,
            from: None,
            next_id: AtomicU64::new(1),
        }
    }

    /// Account the node should sign with; omitted when unset.
    pub fn with_sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    /// Call a method and deserialize the result.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let resp = self.transport.send(JsonRpcRequest::new(id, method, params)).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }

    /// `eth_call` against the contract at the configured block tag.
    pub async fn eth_call(&self, data: &Bytes) -> Result<Bytes, TransportError> {
        self.request(
            "eth_call",
            vec![json!({ "to": self.contract, "data": data }), json!(self.block_tag)],
        )
        .await
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        handle: TxHash,
    ) -> Result<Option<ReceiptSummary>, TransportError> {
        self.request("eth_getTransactionReceipt", vec![json!(handle)])
            .await
    }

    async fn poll_receipt(&self, handle: TxHash) -> Result<ReceiptSummary, SyncError> {
        let interval = Duration::from_millis(self.receipt.poll_interval_ms);
        loop {
            match self.transaction_receipt(handle).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) if e.is_retryable() => {
                    tracing::debug!(%handle, error = %e, "receipt poll failed, will retry");
                }
                Err(e) => {
                    return Err(SyncError::Receipt {
                        handle,
                        reason: e.to_string(),
                    })
                }
            }
            tokio::time::sleep(interval).await;
        }
    }
}

/// Prefer a decoded revert reason over the node's generic message.
fn describe_rpc_error(err: &JsonRpcError) -> String {
    err.revert_data()
        .and_then(|data| hex::decode(data.trim_start_matches("0x")).ok())
        .and_then(|bytes| decode_revert_reason(&bytes))
        .unwrap_or_else(|| err.message.clone())
}

#[async_trait]
impl RecordCountReader for EthClient {
    async fn record_count(&self) -> Result<u64, SyncError> {
        let calldata = self.abi.record_count_calldata()?;
        let raw = self
            .eth_call(&calldata)
            .await
            .map_err(|e| SyncError::CountRead { reason: e.to_string() })?;
        self.abi
            .decode_record_count(&raw)
            .map_err(|e| SyncError::CountRead { reason: e.to_string() })
    }
}

#[async_trait]
impl TransactionSender for EthClient {
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, SyncError> {
        let mut params = json!({
            "to": tx.to,
            "data": tx.data,
            "value": tx.value,
        });
        if let Some(from) = self.from {
            params["from"] = json!(from);
        }

        self.request::<TxHash>("eth_sendTransaction", vec![params])
            .await
            .map_err(|e| match e {
                TransportError::Rpc(err) => SyncError::Submission {
                    reason: describe_rpc_error(&err),
                },
                other => SyncError::Submission {
                    reason: other.to_string(),
                },
            })
    }
}

#[async_trait]
impl ReceiptWaiter for EthClient {
    async fn wait_for_receipt(&self, handle: TxHash) -> Result<ReceiptOutcome, SyncError> {
        let timeout_ms = self.receipt.timeout_ms;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), self.poll_receipt(handle)).await {
            Err(_) => Ok(ReceiptOutcome::TimedOut { ms: timeout_ms }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(receipt)) if receipt.succeeded() => Ok(ReceiptOutcome::Confirmed {
                block_number: receipt.block_number.map(|n| n.to::<u64>()),
            }),
            Ok(Ok(_)) => Ok(ReceiptOutcome::Reverted { reason: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::request::{JsonRpcResponse, RpcId};

    /// Replies per method from a script; records every request.
    struct ScriptedTransport {
        replies: Mutex<Vec<(String, Result<Value, JsonRpcError>)>>,
        seen: Mutex<Vec<JsonRpcRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<(&str, Result<Value, JsonRpcError>)>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().map(|(m, r)| (m.to_string(), r)).collect()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            self.seen.lock().unwrap().push(req.clone());
            let mut replies = self.replies.lock().unwrap();
            let pos = replies
                .iter()
                .position(|(m, _)| *m == req.method)
                .ok_or_else(|| TransportError::Other(format!("unscripted {}", req.method)))?;
            let (_, reply) = replies.remove(pos);
            Ok(match reply {
                Ok(v) => JsonRpcResponse::success(req.id, v),
                Err(e) => JsonRpcResponse::failure(RpcId::Null, e),
            })
        }

        fn url(&self) -> &str {
            "scripted"
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> EthClient {
        EthClient::new(
            transport,
            Arc::new(BountyBoardAbi::bundled().unwrap()),
            &ContractConfig::default(),
            ReceiptConfig {
                poll_interval_ms: 5,
                timeout_ms: 200,
            },
        )
    }

    fn word(n: u8) -> String {
        format!("0x{}{:02x}", "00".repeat(31), n)
    }

    #[tokio::test]
    async fn record_count_uses_contract_selector() {
        let t = ScriptedTransport::new(vec![("eth_call", Ok(json!(word(60))))]);
        let c = client(t.clone());

        assert_eq!(c.record_count().await.unwrap(), 60);

        let seen = t.seen.lock().unwrap();
        let abi = BountyBoardAbi::bundled().unwrap();
        let expected = format!("0x{}", hex::encode(abi.selector_for("getBountyCount").unwrap()));
        assert_eq!(seen[0].params[0]["data"], expected);
        assert_eq!(seen[0].params[1], "latest");
    }

    #[tokio::test]
    async fn count_read_failure_is_count_error() {
        let t = ScriptedTransport::new(vec![(
            "eth_call",
            Err(JsonRpcError { code: -32000, message: "header not found".into(), data: None }),
        )]);
        let err = client(t).record_count().await.unwrap_err();
        assert!(matches!(err, SyncError::CountRead { .. }));
    }

    #[tokio::test]
    async fn send_transaction_attaches_value() {
        let hash = TxHash::repeat_byte(0x42);
        let t = ScriptedTransport::new(vec![("eth_sendTransaction", Ok(json!(hash)))]);
        let c = client(t.clone()).with_sender(Address::repeat_byte(0x01));

        let got = c
            .send_transaction(TransactionRequest {
                to: ContractConfig::default().address,
                data: Bytes::from_static(&[1, 2, 3, 4]),
                value: alloy_primitives::U256::from(1_000u64),
            })
            .await
            .unwrap();
        assert_eq!(got, hash);

        let seen = t.seen.lock().unwrap();
        assert_eq!(seen[0].params[0]["value"], "0x3e8");
        assert_eq!(seen[0].params[0]["data"], "0x01020304");
        assert!(seen[0].params[0].get("from").is_some());
    }

    #[tokio::test]
    async fn rejected_send_surfaces_revert_reason() {
        let t = ScriptedTransport::new(vec![(
            "eth_sendTransaction",
            Err(JsonRpcError {
                code: 3,
                message: "execution reverted".into(),
                data: Some(json!(
                    "0x08c379a0\
                     0000000000000000000000000000000000000000000000000000000000000020\
                     0000000000000000000000000000000000000000000000000000000000000016\
                     426f756e747920616c726561647920636c61696d656400000000000000000000"
                )),
            }),
        )]);
        let err = client(t)
            .send_transaction(TransactionRequest {
                to: Address::ZERO,
                data: Bytes::new(),
                value: alloy_primitives::U256::ZERO,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "transaction submission failed: Bounty already claimed");
    }

    #[tokio::test]
    async fn receipt_wait_polls_until_mined() {
        let handle = TxHash::repeat_byte(0x07);
        let t = ScriptedTransport::new(vec![
            ("eth_getTransactionReceipt", Ok(Value::Null)),
            ("eth_getTransactionReceipt", Ok(Value::Null)),
            (
                "eth_getTransactionReceipt",
                Ok(json!({"transactionHash": handle, "blockNumber": "0x10", "status": "0x1"})),
            ),
        ]);
        let outcome = client(t.clone()).wait_for_receipt(handle).await.unwrap();
        assert_eq!(outcome, ReceiptOutcome::Confirmed { block_number: Some(16) });
        assert_eq!(t.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_receipt_status_is_reverted() {
        let t = ScriptedTransport::new(vec![(
            "eth_getTransactionReceipt",
            Ok(json!({"blockNumber": "0x10", "status": "0x0"})),
        )]);
        let outcome = client(t).wait_for_receipt(TxHash::ZERO).await.unwrap();
        assert_eq!(outcome, ReceiptOutcome::Reverted { reason: None });
    }

    #[tokio::test]
    async fn receipt_wait_times_out() {
        let replies = (0..200)
            .map(|_| ("eth_getTransactionReceipt", Ok(Value::Null)))
            .collect();
        let t = ScriptedTransport::new(replies);
        let outcome = client(t).wait_for_receipt(TxHash::ZERO).await.unwrap();
        assert_eq!(outcome, ReceiptOutcome::TimedOut { ms: 200 });
    }
}
