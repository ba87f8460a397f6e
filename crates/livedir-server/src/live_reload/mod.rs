//! Live reload: file watching, debouncing and WebSocket push.

mod debouncer;
mod manager;
mod websocket;

pub(crate) use manager::{DEFAULT_DEBOUNCE_MS, LiveReloadManager, ReloadEvent};
pub(crate) use websocket::ws_handler;

/// WebSocket endpoint the injected client script connects to.
pub(crate) const LIVE_RELOAD_PATH: &str = "/livereload";
