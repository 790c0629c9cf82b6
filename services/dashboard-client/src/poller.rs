//! Bot status poller - refreshes bot status at the dashboard cadence

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::client::DashboardClient;
use crate::types::BotStatus;

/// Dashboard refresh interval for bot status
pub const BOT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Latest poll outcome
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: Option<BotStatus>,
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Spawn a task polling `GET /bot/status` every `period`.
///
/// The first poll runs immediately. The task ends once every receiver has
/// been dropped.
pub fn spawn_status_poller(
    client: Arc<DashboardClient>,
    period: Duration,
) -> (watch::Receiver<Option<StatusUpdate>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(None);

    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            let update = match client.bot_status().await {
                Ok(status) => StatusUpdate {
                    status: Some(status),
                    error: None,
                    fetched_at: Utc::now(),
                },
                Err(e) => {
                    warn!("Bot status poll failed: {}", e);
                    StatusUpdate {
                        status: None,
                        error: Some(e.to_string()),
                        fetched_at: Utc::now(),
                    }
                }
            };

            if tx.send(Some(update)).is_err() {
                break;
            }
        }

        debug!("Bot status poller stopped");
    });

    (rx, handle)
}
