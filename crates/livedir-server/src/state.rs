//! Application state.
//!
//! Shared state for all request handlers.

use crate::live_reload::LiveReloadManager;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Live reload manager; owns the file watcher for the server's lifetime.
    pub(crate) live_reload: LiveReloadManager,
}
