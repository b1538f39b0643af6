//! Live reload over WebSocket.
//!
//! The [`ReloadHub`] fans the reload signal out to connected browsers;
//! the WebSocket handler forwards it verbatim.

mod hub;
mod websocket;

pub use hub::{RELOAD_MESSAGE, ReloadHub};
pub(crate) use websocket::ws_handler;
