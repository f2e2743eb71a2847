use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::remote::config::DASHBOARD_REFRESH_SECS;
use crate::remote::{DashboardData, TryoutApi};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

// Outer bound on one refresh pass, covering retries inside the call layer.
const REFRESH_TIMEOUT_SECS: u64 = 30;

pub async fn refresh_loop(
    api: TryoutApi,
    snapshot_tx: watch::Sender<Option<DashboardData>>,
    cancel_token: CancellationToken,
    pause_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(DASHBOARD_REFRESH_SECS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if *pause_rx.borrow() {
                    log_info!("refresh tick skipped, modal open");
                    continue;
                }

                match tokio::time::timeout(
                    Duration::from_secs(REFRESH_TIMEOUT_SECS),
                    api.get_dashboard(),
                ).await {
                    Ok(Ok(dashboard)) => {
                        let _ = snapshot_tx.send(Some(dashboard));
                    }
                    // A failed pass keeps the last good snapshot on screen.
                    Ok(Err(err)) => log_error!("dashboard refresh failed: {err}"),
                    Err(_) => log_warn!("dashboard refresh timeout (> {}s)", REFRESH_TIMEOUT_SECS),
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("refresh loop shutting down");
                break;
            }
        }
    }
}
