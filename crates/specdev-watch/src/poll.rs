//! Modification-time polling for the watched file.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::event::{ChangeEvent, WatchHandle};
use crate::{ChangeNotifier, WatchError};

/// Polls a single file's modification time on a fixed interval.
///
/// Any observed transition counts as a change, including the file appearing
/// or disappearing, so deleting and re-creating the file keeps emitting
/// events instead of silently stalling the watch.
#[derive(Debug)]
pub struct MtimePoller {
    path: PathBuf,
    interval: Duration,
}

impl MtimePoller {
    /// Create a poller for `path`, checking every `interval`.
    #[must_use]
    pub fn new(path: PathBuf, interval: Duration) -> Self {
        Self { path, interval }
    }
}

impl ChangeNotifier for MtimePoller {
    fn watch(&self) -> Result<(mpsc::Receiver<ChangeEvent>, WatchHandle), WatchError> {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let path = self.path.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately and seeds the baseline
            ticker.tick().await;
            let mut last_seen = modified_at(&path).await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let current = modified_at(&path).await;
                        if current != last_seen {
                            last_seen = current;
                            tracing::debug!(path = %path.display(), "modification time changed");
                            if event_tx.send(ChangeEvent { path: path.clone() }).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Ok((event_rx, WatchHandle::from_shutdown(shutdown_tx)))
    }
}

/// Modification time of `path`, or `None` when it cannot be read.
async fn modified_at(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}
