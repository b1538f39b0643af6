//! Reload notification hub.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;

/// Message sent to browsers when the documentation has been rebuilt.
pub const RELOAD_MESSAGE: &str = "reload";

/// Fan-out hub for reload notifications.
///
/// A broadcast subscription is membership: browsers join by subscribing on
/// upgrade and leave when their receiver drops. Only receivers subscribed
/// at the moment of [`notify_reload`](Self::notify_reload) see the signal.
/// Delivery is fire-and-forget - no acknowledgment, no retry, no ordering
/// guarantee across connections.
#[derive(Debug)]
pub struct ReloadHub {
    sender: broadcast::Sender<&'static str>,
    connected: AtomicUsize,
}

impl ReloadHub {
    /// Create a hub.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _rx) = broadcast::channel(100);
        Self {
            sender,
            connected: AtomicUsize::new(0),
        }
    }

    /// Subscribe to reload notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<&'static str> {
        self.sender.subscribe()
    }

    /// Send [`RELOAD_MESSAGE`] to every currently subscribed browser.
    ///
    /// Returns how many receivers the signal went out to. Zero just means
    /// no browser is connected; that is not an error.
    pub fn notify_reload(&self) -> usize {
        self.sender.send(RELOAD_MESSAGE).unwrap_or(0)
    }

    /// Count a new connection; returns the active total.
    pub(crate) fn client_connected(&self) -> usize {
        self.connected.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count a departed connection; returns the active total.
    pub(crate) fn client_disconnected(&self) -> usize {
        self.connected.fetch_sub(1, Ordering::Relaxed) - 1
    }

    /// Number of currently connected browsers.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}
