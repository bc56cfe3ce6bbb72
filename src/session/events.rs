//! Background watcher that keeps a [`RemotePlayback`] in sync with the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::session::playback::RemotePlayback;

/// Interval between local `timeupdate` events while playing.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Poll sessions every `poll_interval` and emit `timeupdate` every `tick_interval`
/// until `shutdown` flips to true.
pub async fn watch_sessions(
    playback: Arc<RemotePlayback>,
    poll_interval: Duration,
    tick_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut tick = tokio::time::interval(tick_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut failing = false;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                match playback.poll().await {
                    Ok(()) => {
                        if failing {
                            tracing::info!("session polling recovered");
                        }
                        failing = false;
                    }
                    Err(e) => {
                        // Log the first failure of a streak only.
                        if !failing {
                            tracing::warn!(error = %e, "session poll failed");
                        }
                        failing = true;
                    }
                }
            }
            _ = tick.tick() => playback.tick(),
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("session watcher stopped");
                    break;
                }
            }
        }
    }
}
