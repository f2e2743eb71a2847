use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::remote::{DashboardData, TryoutApi};

use super::loop_worker::refresh_loop;

/// Owns the background dashboard poller. One loop at a time; the pause gate
/// mirrors an open modal so a refresh never repaints under a dialog.
pub struct RefreshController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    pause_tx: Option<watch::Sender<bool>>,
    snapshot_tx: watch::Sender<Option<DashboardData>>,
}

impl RefreshController {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            handle: None,
            cancel_token: None,
            pause_tx: None,
            snapshot_tx,
        }
    }

    /// Latest dashboard snapshot; `None` until the first fetch lands.
    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardData>> {
        self.snapshot_tx.subscribe()
    }

    pub fn start(&mut self, api: TryoutApi) -> Result<()> {
        if self.handle.is_some() {
            bail!("refresh loop already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        // false = keep polling, true = hold ticks while a modal is open
        let (pause_tx, pause_rx) = watch::channel(false);

        let handle = tokio::spawn(refresh_loop(
            api,
            self.snapshot_tx.clone(),
            token_clone,
            pause_rx,
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.pause_tx = Some(pause_tx);
        Ok(())
    }

    /// Gates the poller while a modal is open; refresh resumes on close.
    pub fn set_modal_open(&self, open: bool) {
        if let Some(tx) = &self.pause_tx {
            let _ = tx.send(open);
            info!("refresh loop {}", if open { "paused" } else { "resumed" });
        }
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.pause_tx = None;

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("refresh loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for RefreshController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RemoteClient, RemoteConfig, ResponseSink, Transport, TransportRequest};
    use serde_json::json;
    use std::sync::Arc;

    struct DashboardTransport;

    impl Transport for DashboardTransport {
        fn dispatch(&self, request: TransportRequest, sink: ResponseSink) {
            sink.resolve(
                request.call_id,
                Ok(json!({ "data": {
                    "totals": { "expected": 50, "checkedIn": 20 },
                    "byLocation": {}
                }})),
            );
        }
    }

    fn api() -> TryoutApi {
        TryoutApi::new(RemoteClient::new(
            RemoteConfig::new("http://localhost/exec"),
            Arc::new(DashboardTransport),
        ))
    }

    #[tokio::test]
    async fn start_is_exclusive_and_stop_joins() {
        let mut controller = RefreshController::new();
        controller.start(api()).unwrap();
        assert!(controller.start(api()).is_err());
        controller.stop().await.unwrap();
        // A stopped controller can start again.
        controller.start(api()).unwrap();
        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn publishes_first_snapshot_promptly() {
        let mut controller = RefreshController::new();
        let mut snapshots = controller.subscribe();
        controller.start(api()).unwrap();

        snapshots.changed().await.unwrap();
        let snapshot = snapshots.borrow().clone().unwrap();
        assert_eq!(snapshot.totals.checked_in, 20);

        controller.stop().await.unwrap();
    }
}
