//! File change notification for specdev.
//!
//! Change detection is a capability behind the [`ChangeNotifier`] trait so
//! the serve loop stays independent of the mechanism. [`MtimePoller`] is the
//! default implementation; [`NativeWatcher`] subscribes to the operating
//! system's notification facility through `notify`.
//!
//! Debouncing is the caller's concern via [`RebuildDebouncer`]: notifiers
//! report every observed change, the debouncer decides when a rebuild is due.

mod debounce;
mod event;
mod native;
mod poll;

pub use debounce::RebuildDebouncer;
pub use event::{ChangeEvent, WatchHandle};
pub use native::NativeWatcher;
pub use poll::MtimePoller;

use std::path::PathBuf;

use tokio::sync::mpsc;

/// Source of change events for a watched file.
pub trait ChangeNotifier: Send + Sync {
    /// Start watching.
    ///
    /// Events arrive on the returned receiver until the [`WatchHandle`] is
    /// dropped. The receiver closing works as a stop signal too: notifiers
    /// shut down once nobody listens.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch cannot be established.
    fn watch(&self) -> Result<(mpsc::Receiver<ChangeEvent>, WatchHandle), WatchError>;
}

/// Watch setup error.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Watch target has no parent directory to attach the watcher to.
    #[error("cannot watch {}: no parent directory", .0.display())]
    InvalidTarget(PathBuf),
    /// Error from the native watcher backend.
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),
}
