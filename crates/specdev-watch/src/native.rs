//! Change notification through the operating system's watcher facility.

use std::path::PathBuf;

use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::event::{ChangeEvent, WatchHandle};
use crate::{ChangeNotifier, WatchError};

/// Watches a single file through `notify`.
///
/// The parent directory is watched non-recursively and events are filtered
/// by the target's file name. Filtering by name rather than full path keeps
/// the watch working with editors that replace the file on save instead of
/// writing in place.
pub struct NativeWatcher {
    path: PathBuf,
}

impl NativeWatcher {
    /// Create a watcher for `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ChangeNotifier for NativeWatcher {
    fn watch(&self) -> Result<(mpsc::Receiver<ChangeEvent>, WatchHandle), WatchError> {
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| WatchError::InvalidTarget(self.path.clone()))?
            .to_path_buf();

        let (event_tx, event_rx) = mpsc::channel(16);
        let target = self.path.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                if !matches!(
                    event.kind,
                    notify::EventKind::Create(_)
                        | notify::EventKind::Modify(_)
                        | notify::EventKind::Remove(_)
                ) {
                    return;
                }
                for path in &event.paths {
                    if path.file_name() == target.file_name() {
                        tracing::debug!(path = %path.display(), "native watcher event");
                        // Callback runs on the notify thread; block until the
                        // async side has room
                        let _ = event_tx.blocking_send(ChangeEvent {
                            path: target.clone(),
                        });
                    }
                }
            })?;

        watcher.watch(&parent, RecursiveMode::NonRecursive)?;

        Ok((event_rx, WatchHandle::from_watcher(watcher)))
    }
}
