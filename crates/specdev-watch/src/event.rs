//! Change event type and the RAII watch handle.

use std::path::PathBuf;

use notify::RecommendedWatcher;
use tokio::sync::oneshot;

/// A change to the watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path of the watched file.
    pub path: PathBuf,
}

/// Handle to stop watching for changes.
///
/// Uses RAII pattern - dropping the handle stops watching automatically,
/// either by dropping the polling task's shutdown sender or by dropping the
/// native watcher itself.
pub struct WatchHandle {
    _shutdown: Option<oneshot::Sender<()>>,
    _watcher: Option<RecommendedWatcher>,
}

impl WatchHandle {
    /// Handle backed by a shutdown signal to a polling task.
    pub(crate) fn from_shutdown(shutdown: oneshot::Sender<()>) -> Self {
        Self {
            _shutdown: Some(shutdown),
            _watcher: None,
        }
    }

    /// Handle keeping a native watcher alive.
    pub(crate) fn from_watcher(watcher: RecommendedWatcher) -> Self {
        Self {
            _shutdown: None,
            _watcher: Some(watcher),
        }
    }

    /// Stop watching immediately (consumes the handle).
    pub fn stop(mut self) {
        self._shutdown.take();
        self._watcher.take();
    }
}
