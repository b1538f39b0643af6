//! Application state.
//!
//! Shared state for all request handlers and the build session.

use std::path::PathBuf;

use crate::live_reload::ReloadHub;

/// Application state shared across handlers and the build session.
#[derive(Debug)]
pub struct AppState {
    /// Directory files are served from; requests may not escape it.
    pub root: PathBuf,
    /// Generated HTML file, served at `/`.
    pub output_file: PathBuf,
    /// Port the injected client script dials for reload notifications.
    pub reload_port: u16,
    /// Fan-out hub for reload notifications.
    pub hub: ReloadHub,
}
