use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::error::BridgeError;
use crate::wallet_messages::WalletMessage;

struct PendingEntry {
    result_tx: oneshot::Sender<WalletMessage>,
}

/// Owns one record per in-flight request, indexed by `requestId` (spec §9
/// "Arenas for pending state": "cross-origin broker pending responses are
/// owned by per-request records indexed by `requestId`; terminal events
/// free the record"). A request with no entry here has already terminated
/// (delivered its `PM_RESULT` or been cancelled) or never existed; either
/// way, further `PROGRESS` for it must not be forwarded (spec §8).
#[derive(Default)]
pub struct PendingRequestArena {
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingRequestArena {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a new pending request, returning a receiver that resolves
    /// with the eventual terminal `PM_RESULT`.
    pub async fn register(&self, request_id: impl Into<String>) -> oneshot::Receiver<WalletMessage> {
        let (tx, rx) = oneshot::channel();
        let mut entries = self.entries.lock().await;
        entries.insert(request_id.into(), PendingEntry { result_tx: tx });
        rx
    }

    /// Delivers the terminal `PM_RESULT` for `request_id` and frees the
    /// record (spec §8 "every request is matched by exactly one
    /// `PM_RESULT`"). Errors if there is no such pending request — it was
    /// never registered, already resolved, or already cancelled.
    pub async fn resolve(&self, request_id: &str, message: WalletMessage) -> Result<(), BridgeError> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .remove(request_id)
            .ok_or_else(|| BridgeError::UnknownRequestId(request_id.to_string()))?;
        // The receiving end may have been dropped (e.g. the caller gave up
        // on the channel); that's not this arena's problem to report.
        let _ = entry.result_tx.send(message);
        Ok(())
    }

    /// Whether `request_id` is still pending (used to gate `PROGRESS`
    /// forwarding: spec §8 "no additional PROGRESS events are emitted"
    /// once a request is terminal).
    pub async fn is_live(&self, request_id: &str) -> bool {
        self.entries.lock().await.contains_key(request_id)
    }

    /// `PM_CANCEL(requestId)`: resolves exactly that request with
    /// `UserCancelled` and frees its record.
    pub async fn cancel_one(&self, request_id: &str) -> Result<(), BridgeError> {
        self.resolve(request_id, WalletMessage::pm_result_cancelled(request_id)).await
    }

    /// `PM_CANCEL()` without an id: best-effort global cancel — every
    /// still-outstanding request resolves `UserCancelled`.
    pub async fn cancel_all(&self) {
        let mut entries = self.entries.lock().await;
        for (request_id, entry) in entries.drain() {
            let _ = entry.result_tx.send(WalletMessage::pm_result_cancelled(&request_id));
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_delivers_exactly_once() {
        let arena = PendingRequestArena::new();
        let rx = arena.register("req-1").await;
        arena.resolve("req-1", WalletMessage::pm_result_ok("req-1", serde_json::json!({}))).await.unwrap();

        let delivered = rx.await.unwrap();
        assert!(matches!(delivered, WalletMessage::PmResult { ok: true, .. }));

        let second = arena.resolve("req-1", WalletMessage::pm_result_ok("req-1", serde_json::json!({}))).await;
        assert!(matches!(second, Err(BridgeError::UnknownRequestId(_))));
    }

    #[tokio::test]
    async fn cancel_one_resolves_user_cancelled_and_stops_progress() {
        let arena = PendingRequestArena::new();
        let rx = arena.register("req-1").await;
        assert!(arena.is_live("req-1").await);

        arena.cancel_one("req-1").await.unwrap();
        assert!(!arena.is_live("req-1").await);

        let delivered = rx.await.unwrap();
        match delivered {
            WalletMessage::PmResult { ok, error: Some(err), .. } => {
                assert!(!ok);
                assert_eq!(err.code, "UserCancelled");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancel_all_resolves_every_outstanding_request() {
        let arena = PendingRequestArena::new();
        let rx1 = arena.register("req-1").await;
        let rx2 = arena.register("req-2").await;

        arena.cancel_all().await;
        assert_eq!(arena.pending_count().await, 0);

        assert!(matches!(rx1.await.unwrap(), WalletMessage::PmResult { ok: false, .. }));
        assert!(matches!(rx2.await.unwrap(), WalletMessage::PmResult { ok: false, .. }));
    }
}
