//! `ContractSyncManager`: the read model, the action set and the write status.
//!
//! The manager owns one [`TransactionLifecycle`], one [`BatchReader`] and one
//! [`RecordDecoder`]. Resync happens on two triggers only: an explicit
//! [`ContractSyncManager::refresh`] and confirmation of the active write.
//! Each resync re-reads the record count; when it differs from the last
//! count applied, the records are re-enumerated and the snapshot replaced in
//! one step.

use std::sync::Arc;

use bountysync_abi::{BountyBoardAbi, RecordDecoder, BOUNTY_BOARD_ABI};
use bountysync_core::{
    ContractConfig, ReceiptWaiter, RecordCountReader, SyncError, SyncSnapshot, SyncStatus,
    TransactionSender, TxHash, ValidationError, WriteOperation,
};
use bountysync_rpc::{EthClient, HttpRpcClient, RpcTransport};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::batch::BatchReader;
use crate::config::SyncConfig;
use crate::lifecycle::{Resolution, Ticket, TransactionLifecycle};

/// The external services the manager talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub counter: Arc<dyn RecordCountReader>,
    pub sender: Arc<dyn TransactionSender>,
    pub receipts: Arc<dyn ReceiptWaiter>,
}

impl Collaborators {
    /// Use one Ethereum client for all three roles.
    pub fn from_client(client: Arc<EthClient>) -> Self {
        Self {
            counter: client.clone(),
            sender: client.clone(),
            receipts: client,
        }
    }
}

/// What an action did with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Input failed validation; nothing was sent.
    Rejected(ValidationError),
    /// Broadcast accepted; confirmation is tracked in the background.
    Submitted(TxHash),
}

impl ActionOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn handle(&self) -> Option<TxHash> {
        match self {
            Self::Submitted(handle) => Some(*handle),
            Self::Rejected(_) => None,
        }
    }
}

/// Keeps a UI in step with the bounty contract.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ContractSyncManager {
    inner: Arc<Inner>,
}

struct Inner {
    counter: Arc<dyn RecordCountReader>,
    receipts: Arc<dyn ReceiptWaiter>,
    lifecycle: TransactionLifecycle,
    reader: BatchReader,
    decoder: RecordDecoder,
    record_cap: u64,
    snapshot_tx: watch::Sender<SyncSnapshot>,
    /// Last count whose records were applied. Held across a whole resync so
    /// passes apply in order.
    applied_count: Mutex<Option<u64>>,
}

impl ContractSyncManager {
    pub fn new(
        collaborators: Collaborators,
        reader: BatchReader,
        decoder: RecordDecoder,
        abi: Arc<BountyBoardAbi>,
        contract: &ContractConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SyncSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                counter: collaborators.counter,
                receipts: collaborators.receipts,
                lifecycle: TransactionLifecycle::new(collaborators.sender, abi, contract.address),
                reader,
                decoder,
                record_cap: contract.record_cap,
                snapshot_tx,
                applied_count: Mutex::new(None),
            }),
        }
    }

    /// Connect over HTTP to `config.rpc_url`.
    pub fn connect(config: &SyncConfig) -> Result<Self, SyncError> {
        let url = config
            .rpc_url
            .as_deref()
            .ok_or_else(|| SyncError::Transport("no rpc_url configured".into()))?;
        let transport = HttpRpcClient::new(url, config.http.clone())?;
        info!(url, contract = %config.contract.address, "connecting");
        Self::with_transport(Arc::new(transport), config)
    }

    /// Build the full stack over an existing transport.
    pub fn with_transport(transport: Arc<dyn RpcTransport>, config: &SyncConfig) -> Result<Self, SyncError> {
        let abi = Arc::new(BountyBoardAbi::from_abi_json(
            BOUNTY_BOARD_ABI,
            config.contract.functions.clone(),
        )?);

        let mut client = EthClient::new(transport, abi.clone(), &config.contract, config.receipt.clone());
        if let Some(sender) = config.sender {
            client = client.with_sender(sender);
        }
        let client = Arc::new(client);

        let reader = BatchReader::new(Some(client.clone()), &config.contract)?;
        let decoder = RecordDecoder::from_descriptor(&abi);
        debug!(strategy = decoder.strategy_name(), ?reader, "sync stack assembled");

        Ok(Self::new(Collaborators::from_client(client), reader, decoder, abi, &config.contract))
    }

    // ─── Read model ───────────────────────────────────────────────────────────

    /// Current totals and record set.
    pub fn read_model(&self) -> SyncSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Status of the most recent write.
    pub fn status(&self) -> SyncStatus {
        self.inner.lifecycle.status()
    }

    /// Notified on every snapshot replacement.
    pub fn subscribe_snapshot(&self) -> watch::Receiver<SyncSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Notified on every status transition.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.lifecycle.subscribe()
    }

    /// Re-read the record count and resync if it changed.
    ///
    /// Never fails: a failed count read keeps the previous snapshot.
    pub async fn refresh(&self) -> SyncSnapshot {
        self.inner.refresh().await
    }

    // ─── Actions ──────────────────────────────────────────────────────────────

    pub async fn create_record(&self, description: &str, reward: &str) -> Result<ActionOutcome, SyncError> {
        self.dispatch(WriteOperation::create_record(description, reward)).await
    }

    pub async fn apply_as_participant(&self, id: i64) -> Result<ActionOutcome, SyncError> {
        self.dispatch(WriteOperation::apply_as_participant(id)).await
    }

    pub async fn claim_reward(&self, id: i64) -> Result<ActionOutcome, SyncError> {
        self.dispatch(WriteOperation::claim_reward(id)).await
    }

    pub async fn mark_completed(&self, id: i64) -> Result<ActionOutcome, SyncError> {
        self.dispatch(WriteOperation::mark_completed(id)).await
    }

    /// Submit and hand the receipt wait to a background task.
    ///
    /// Returns once the broadcast is accepted. Submission errors are
    /// returned to the caller and also recorded in [`Self::status`].
    async fn dispatch(&self, op: Result<WriteOperation, ValidationError>) -> Result<ActionOutcome, SyncError> {
        let op = match op {
            Ok(op) => op,
            Err(e) => {
                debug!(error = %e, "action rejected before submission");
                return Ok(ActionOutcome::Rejected(e));
            }
        };

        let ticket = self.inner.lifecycle.submit(op).await?;
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.track(ticket).await });
        Ok(ActionOutcome::Submitted(ticket.handle))
    }
}

impl Inner {
    async fn track(self: Arc<Self>, ticket: Ticket) {
        let outcome = self.receipts.wait_for_receipt(ticket.handle).await;
        if self.lifecycle.resolve(ticket, outcome) == Resolution::Confirmed {
            self.refresh().await;
        }
    }

    async fn refresh(&self) -> SyncSnapshot {
        let mut applied = self.applied_count.lock().await;

        let count = match self.counter.record_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "record count read failed, keeping previous snapshot");
                return self.snapshot_tx.borrow().clone();
            }
        };
        if *applied == Some(count) {
            debug!(count, "record count unchanged");
            return self.snapshot_tx.borrow().clone();
        }

        let raws = self.reader.fetch_all(count, self.record_cap).await;
        let record_set = self.decoder.decode_all(&raws);
        let snapshot = SyncSnapshot::derive(count, record_set);

        // An incomplete batch is retried on the next trigger.
        if raws.len() as u64 == count.min(self.record_cap) {
            *applied = Some(count);
        }
        info!(
            count,
            records = snapshot.record_set.len(),
            placeholders = snapshot.record_set.placeholder_count(),
            "snapshot replaced"
        );
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}
