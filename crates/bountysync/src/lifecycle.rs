//! Tracks the single active write operation.
//!
//! ```text
//! idle ─submit─▶ submitting ─broadcast ok─▶ pending-confirmation ─receipt ok─▶ confirmed
//!                    │                              │
//!                    └──────────── error ───────────┴──────────────────────▶ failed
//! ```
//!
//! A new `submit` from any state starts a new generation and returns to
//! `submitting`. Results for an older generation are still observed but
//! never touch the reported status.

use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::Address;
use bountysync_abi::BountyBoardAbi;
use bountysync_core::{
    ReceiptOutcome, SyncError, SyncStatus, TransactionRequest, TransactionSender,
    TransactionStatus, TxHash, WriteOperation,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A broadcast transaction together with the submission that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub handle: TxHash,
}

/// How a receipt resolution was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirmed,
    Failed,
    /// A newer submission owns the slot; nothing changed.
    Superseded,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    status: TransactionStatus,
    handle: Option<TxHash>,
    last_error: Option<String>,
}

impl Slot {
    fn view(&self) -> SyncStatus {
        SyncStatus::new(self.status, self.handle, self.last_error.clone())
    }
}

/// Drives write operations through submission and confirmation.
pub struct TransactionLifecycle {
    sender: Arc<dyn TransactionSender>,
    abi: Arc<BountyBoardAbi>,
    contract: Address,
    slot: Mutex<Slot>,
    status_tx: watch::Sender<SyncStatus>,
}

impl TransactionLifecycle {
    pub fn new(sender: Arc<dyn TransactionSender>, abi: Arc<BountyBoardAbi>, contract: Address) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::default());
        Self {
            sender,
            abi,
            contract,
            slot: Mutex::new(Slot::default()),
            status_tx,
        }
    }

    /// Current status of the most recent submission.
    pub fn status(&self) -> SyncStatus {
        self.lock().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Submit a validated operation and wait for broadcast acceptance.
    ///
    /// On success the slot is `pending-confirmation` (unless a newer
    /// submission has taken over meanwhile) and the caller owns the receipt
    /// wait for the returned ticket.
    pub async fn submit(&self, op: WriteOperation) -> Result<Ticket, SyncError> {
        let generation = self.begin();
        debug!(generation, operation = op.operation_name(), "submitting");

        let data = match self.abi.encode_operation(&op) {
            Ok(data) => data,
            Err(e) => {
                let err = SyncError::from(e);
                self.fail(generation, &err);
                return Err(err);
            }
        };
        let tx = TransactionRequest {
            to: self.contract,
            data,
            value: op.value(),
        };

        match self.sender.send_transaction(tx).await {
            Ok(handle) => {
                self.accept(generation, handle);
                Ok(Ticket { generation, handle })
            }
            Err(e) => {
                warn!(generation, operation = op.operation_name(), error = %e, "submission failed");
                self.fail(generation, &e);
                Err(e)
            }
        }
    }

    /// Apply the outcome of a receipt wait for `ticket`.
    pub fn resolve(&self, ticket: Ticket, outcome: Result<ReceiptOutcome, SyncError>) -> Resolution {
        let Ticket { generation, handle } = ticket;
        let result = match outcome {
            Ok(ReceiptOutcome::Confirmed { block_number }) => Ok(block_number),
            Ok(ReceiptOutcome::Reverted { reason }) => Err(SyncError::Reverted { handle, reason }),
            Ok(ReceiptOutcome::TimedOut { ms }) => Err(SyncError::ReceiptTimeout { handle, ms }),
            Err(e) => Err(e),
        };

        let mut slot = self.lock();
        if slot.generation != generation {
            match &result {
                Ok(_) => info!(%handle, generation, "superseded transaction confirmed"),
                Err(e) => info!(%handle, generation, error = %e, "superseded transaction failed"),
            }
            return Resolution::Superseded;
        }

        let resolution = match result {
            Ok(block_number) => {
                info!(%handle, generation, ?block_number, "transaction confirmed");
                slot.status = TransactionStatus::Confirmed;
                Resolution::Confirmed
            }
            Err(e) => {
                warn!(%handle, generation, error = %e, "transaction failed");
                slot.status = TransactionStatus::Failed;
                slot.last_error = Some(e.to_string());
                Resolution::Failed
            }
        };
        self.status_tx.send_replace(slot.view());
        resolution
    }

    fn begin(&self) -> u64 {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.status = TransactionStatus::Submitting;
        slot.handle = None;
        slot.last_error = None;
        self.status_tx.send_replace(slot.view());
        slot.generation
    }

    fn accept(&self, generation: u64, handle: TxHash) {
        let mut slot = self.lock();
        if slot.generation != generation {
            debug!(%handle, generation, "broadcast accepted for superseded submission");
            return;
        }
        slot.status = TransactionStatus::PendingConfirmation;
        slot.handle = Some(handle);
        self.status_tx.send_replace(slot.view());
    }

    fn fail(&self, generation: u64, err: &SyncError) {
        let mut slot = self.lock();
        if slot.generation != generation {
            return;
        }
        slot.status = TransactionStatus::Failed;
        slot.last_error = Some(err.to_string());
        self.status_tx.send_replace(slot.view());
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // The slot holds plain values; a poisoned guard is still consistent.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct FixedSender {
        result: Result<TxHash, SyncError>,
    }

    #[async_trait]
    impl TransactionSender for FixedSender {
        async fn send_transaction(&self, _tx: TransactionRequest) -> Result<TxHash, SyncError> {
            self.result.clone()
        }
    }

    fn lifecycle(result: Result<TxHash, SyncError>) -> TransactionLifecycle {
        TransactionLifecycle::new(
            Arc::new(FixedSender { result }),
            Arc::new(BountyBoardAbi::bundled().unwrap()),
            Address::ZERO,
        )
    }

    fn claim(id: i64) -> WriteOperation {
        WriteOperation::claim_reward(id).unwrap()
    }

    #[test]
    fn starts_idle() {
        let lc = lifecycle(Ok(TxHash::ZERO));
        let status = lc.status();
        assert_eq!(status.transaction_status, TransactionStatus::Idle);
        assert!(!status.is_busy);
        assert!(status.last_handle.is_none());
    }

    #[tokio::test]
    async fn broadcast_moves_to_pending_then_confirmed() {
        let handle = TxHash::repeat_byte(0xaa);
        let lc = lifecycle(Ok(handle));

        let ticket = lc.submit(claim(1)).await.unwrap();
        assert_eq!(ticket.handle, handle);
        let status = lc.status();
        assert_eq!(status.transaction_status, TransactionStatus::PendingConfirmation);
        assert!(status.is_busy && status.is_confirming);
        assert_eq!(status.last_handle, Some(handle));

        let res = lc.resolve(ticket, Ok(ReceiptOutcome::Confirmed { block_number: Some(9) }));
        assert_eq!(res, Resolution::Confirmed);
        let status = lc.status();
        assert_eq!(status.transaction_status, TransactionStatus::Confirmed);
        assert!(status.is_confirmed && !status.is_busy);
    }

    #[tokio::test]
    async fn broadcast_error_fails_and_propagates() {
        let lc = lifecycle(Err(SyncError::Submission { reason: "user rejected".into() }));
        let err = lc.submit(claim(1)).await.unwrap_err();
        assert!(err.is_write_failure());

        let status = lc.status();
        assert_eq!(status.transaction_status, TransactionStatus::Failed);
        assert_eq!(status.last_error.as_deref(), Some("transaction submission failed: user rejected"));
    }

    #[tokio::test]
    async fn timeout_and_revert_fail_the_transaction() {
        let lc = lifecycle(Ok(TxHash::repeat_byte(1)));
        let t = lc.submit(claim(1)).await.unwrap();
        assert_eq!(lc.resolve(t, Ok(ReceiptOutcome::TimedOut { ms: 10 })), Resolution::Failed);
        assert!(lc.status().last_error.unwrap().contains("after 10ms"));

        let t = lc.submit(claim(2)).await.unwrap();
        assert_eq!(lc.status().last_error, None);
        let res = lc.resolve(t, Ok(ReceiptOutcome::Reverted { reason: Some("Not assigned".into()) }));
        assert_eq!(res, Resolution::Failed);
        assert!(lc.status().last_error.unwrap().ends_with("reverted: Not assigned"));
    }

    #[tokio::test]
    async fn newer_submission_wins() {
        let lc = lifecycle(Ok(TxHash::repeat_byte(2)));
        let first = lc.submit(claim(1)).await.unwrap();
        let second = lc.submit(claim(2)).await.unwrap();
        assert!(second.generation > first.generation);

        // Late confirmation for the first handle is absorbed.
        let res = lc.resolve(first, Ok(ReceiptOutcome::Confirmed { block_number: None }));
        assert_eq!(res, Resolution::Superseded);
        assert_eq!(lc.status().transaction_status, TransactionStatus::PendingConfirmation);

        let res = lc.resolve(second, Err(SyncError::Receipt { handle: second.handle, reason: "gone".into() }));
        assert_eq!(res, Resolution::Failed);
        assert_eq!(lc.status().transaction_status, TransactionStatus::Failed);
    }

    #[tokio::test]
    async fn fresh_submit_resets_terminal_state() {
        let lc = lifecycle(Ok(TxHash::repeat_byte(3)));
        let t = lc.submit(claim(1)).await.unwrap();
        lc.resolve(t, Ok(ReceiptOutcome::TimedOut { ms: 1 }));
        assert_eq!(lc.status().transaction_status, TransactionStatus::Failed);

        lc.submit(claim(1)).await.unwrap();
        let status = lc.status();
        assert_eq!(status.transaction_status, TransactionStatus::PendingConfirmation);
        assert!(status.last_error.is_none());
    }

    /// Holds the broadcast open until released.
    struct GatedSender {
        gate: Notify,
    }

    #[async_trait]
    impl TransactionSender for GatedSender {
        async fn send_transaction(&self, _tx: TransactionRequest) -> Result<TxHash, SyncError> {
            self.gate.notified().await;
            Ok(TxHash::repeat_byte(4))
        }
    }

    #[tokio::test]
    async fn status_is_submitting_during_broadcast() {
        let sender = Arc::new(GatedSender { gate: Notify::new() });
        let lc = Arc::new(TransactionLifecycle::new(
            sender.clone(),
            Arc::new(BountyBoardAbi::bundled().unwrap()),
            Address::ZERO,
        ));
        let mut rx = lc.subscribe();

        let task = tokio::spawn({
            let lc = lc.clone();
            async move { lc.submit(claim(5)).await }
        });

        rx.changed().await.unwrap();
        let status = rx.borrow_and_update().clone();
        assert_eq!(status.transaction_status, TransactionStatus::Submitting);
        assert!(status.is_pending && status.is_busy);

        sender.gate.notify_one();
        task.await.unwrap().unwrap();
        assert_eq!(lc.status().transaction_status, TransactionStatus::PendingConfirmation);
    }
}
