//! Server error types.

use std::path::PathBuf;

/// Fatal error while starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Serving root is missing or unreadable.
    #[error("Cannot serve {}: {source}", path.display())]
    Root {
        /// Root as given by the caller.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Listening socket could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// `host:port` as requested.
        address: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// File watcher could not be created.
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
    /// I/O error while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
