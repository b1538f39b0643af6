//! Trailing debounce for rebuild scheduling.
//!
//! Coalesces bursts of change events into a single rebuild, reducing
//! unnecessary builds when editors emit several events per save.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thread-safe single-slot debouncer.
///
/// [`record`](Self::record) replaces any pending deadline with now + window,
/// so a rebuild becomes due only once a full window has passed without
/// further changes. One watched file means one slot; there is nothing to
/// coalesce across paths.
#[derive(Debug)]
pub struct RebuildDebouncer {
    pending: Mutex<Option<Instant>>,
    window: Duration,
}

impl RebuildDebouncer {
    /// Create a debouncer with the given trailing window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            pending: Mutex::new(None),
            window,
        }
    }

    /// Record a change, superseding any pending deadline.
    ///
    /// Thread-safe, can be called from watcher callbacks.
    pub fn record(&self) {
        let mut pending = self.pending.lock().unwrap();
        *pending = Some(Instant::now() + self.window);
    }

    /// Take the pending rebuild if its deadline has passed.
    ///
    /// Returns `true` at most once per recorded burst.
    pub fn take_ready(&self) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match *pending {
            Some(deadline) if deadline <= Instant::now() => {
                *pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_not_ready_before_window_elapses() {
        let debouncer = RebuildDebouncer::new(Duration::from_millis(50));

        debouncer.record();
        assert!(!debouncer.take_ready());
    }

    #[test]
    fn test_ready_after_window_elapses() {
        let debouncer = RebuildDebouncer::new(Duration::from_millis(10));

        debouncer.record();
        thread::sleep(Duration::from_millis(15));

        assert!(debouncer.take_ready());

        // Slot is cleared after the take
        assert!(!debouncer.take_ready());
    }

    #[test]
    fn test_burst_coalesces_to_single_rebuild() {
        let debouncer = RebuildDebouncer::new(Duration::from_millis(10));

        // Simulate editor saving: several events in quick succession
        debouncer.record();
        debouncer.record();
        debouncer.record();

        thread::sleep(Duration::from_millis(15));

        assert!(debouncer.take_ready());
        assert!(!debouncer.take_ready());
    }

    #[test]
    fn test_new_change_supersedes_pending_deadline() {
        let debouncer = RebuildDebouncer::new(Duration::from_millis(60));

        debouncer.record();
        thread::sleep(Duration::from_millis(30));

        // A second change restarts the window
        debouncer.record();
        thread::sleep(Duration::from_millis(35));
        assert!(!debouncer.take_ready());

        thread::sleep(Duration::from_millis(35));
        assert!(debouncer.take_ready());
    }

    #[test]
    fn test_empty_debouncer_is_never_ready() {
        let debouncer = RebuildDebouncer::new(Duration::from_millis(10));

        thread::sleep(Duration::from_millis(15));
        assert!(!debouncer.take_ready());
    }
}
