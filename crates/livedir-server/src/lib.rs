//! Static file server with live reload for livedir.
//!
//! This crate serves a directory over HTTP using axum and pushes reload
//! notifications to connected browsers when watched files change:
//! - Static files from the serving root (`index.html` for directories)
//! - A client script injected into every HTML page
//! - WebSocket endpoint at `/livereload` broadcasting reload events
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! use livedir_server::{ServeOptions, Server};
//! use livedir_watch::{WatchPattern, WatchRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), livedir_server::ServerError> {
//!     let mut server = Server::new();
//!     server.watch(WatchPattern::glob("*.html"));
//!
//!     server
//!         .serve(ServeOptions {
//!             root: PathBuf::from("."),
//!             host: "127.0.0.1".to_owned(),
//!             port: 8000,
//!             open_delay: Some(Duration::from_secs(1)),
//!         })
//!         .await
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (livedir-server)
//!                        │
//!                        ├─► Static files (tower-http ServeDir + script injection)
//!                        │
//!                        └─► WebSocket (LiveReloadManager)
//!                                │
//!                                └─► notify ──► debouncer ──► broadcast
//! ```

mod app;
mod browser;
mod error;
mod live_reload;
mod middleware;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use livedir_watch::{PatternSet, WatchPattern, WatchRegistry};
use state::AppState;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

pub use error::ServerError;

/// Where and how to serve.
#[derive(Clone, Debug)]
pub struct ServeOptions {
    /// Directory to serve and watch.
    pub root: PathBuf,
    /// Host address or name to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Open a browser this long after the server starts (`None` never opens).
    pub open_delay: Option<Duration>,
}

/// Live reload server.
///
/// Collects watch patterns through [`WatchRegistry`], then serves until
/// interrupted.
#[derive(Debug)]
pub struct Server {
    patterns: Vec<WatchPattern>,
    debounce: Duration,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Create a server with no watch patterns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            debounce: Duration::from_millis(live_reload::DEFAULT_DEBOUNCE_MS),
        }
    }

    /// Set how long filesystem events are coalesced before a reload is pushed.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Patterns registered so far, in registration order.
    #[must_use]
    pub fn patterns(&self) -> &[WatchPattern] {
        &self.patterns
    }

    /// Serve `options.root` until Ctrl-C.
    ///
    /// Starts the file watcher, binds the listener, optionally schedules a
    /// browser launch, and blocks until the shutdown signal has been handled.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved, the watcher cannot be
    /// started, or the address cannot be bound.
    pub async fn serve(self, options: ServeOptions) -> Result<(), ServerError> {
        let root = options
            .root
            .canonicalize()
            .map_err(|source| ServerError::Root {
                path: options.root.clone(),
                source,
            })?;

        let (tx, _rx) = broadcast::channel::<live_reload::ReloadEvent>(100);
        let mut manager =
            live_reload::LiveReloadManager::new(root.clone(), PatternSet::new(&self.patterns), tx)
                .with_debounce(self.debounce);
        manager.start()?;

        let state = Arc::new(AppState {
            live_reload: manager,
        });
        let app = app::create_router(state, &root);

        // Bind through the resolver so hostnames like "localhost" work
        let listener = TcpListener::bind((options.host.as_str(), options.port))
            .await
            .map_err(|source| ServerError::Bind {
                address: format!("{}:{}", options.host, options.port),
                source,
            })?;
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, root = %root.display(), "Starting server");

        if let Some(delay) = options.open_delay {
            browser::open_after(browser::browser_url(&options.host, addr.port()), delay);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

impl WatchRegistry for Server {
    fn watch(&mut self, pattern: WatchPattern) {
        tracing::debug!(pattern = %pattern, "Registered watch pattern");
        self.patterns.push(pattern);
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping server..."),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedir_watch::register_watches;
    use pretty_assertions::assert_eq;

    fn options(root: PathBuf, port: u16) -> ServeOptions {
        ServeOptions {
            root,
            host: "127.0.0.1".to_owned(),
            port,
            open_delay: None,
        }
    }

    #[test]
    fn test_new_server_has_no_patterns() {
        let server = Server::default();
        assert!(server.patterns().is_empty());
    }

    #[test]
    fn test_registrar_fills_server() {
        let mut server = Server::new();
        let files = vec!["css/site.css".to_owned(), "index.html".to_owned()];

        register_watches(&mut server, &files);

        assert_eq!(
            server.patterns(),
            &[
                WatchPattern::glob("*.html"),
                WatchPattern::glob("*.css"),
                WatchPattern::glob("*.js"),
                WatchPattern::path("css/site.css"),
                WatchPattern::path("index.html"),
            ]
        );
    }

    #[test]
    fn test_with_debounce() {
        let server = Server::new().with_debounce(Duration::from_millis(250));
        assert_eq!(server.debounce, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_serve_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let err = Server::new()
            .serve(options(missing.clone(), 0))
            .await
            .unwrap_err();

        match err {
            ServerError::Root { path, .. } => assert_eq!(path, missing),
            other => panic!("expected Root error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_serve_port_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = Server::new()
            .serve(options(dir.path().to_path_buf(), port))
            .await
            .unwrap_err();

        match err {
            ServerError::Bind { address, .. } => assert_eq!(address, format!("127.0.0.1:{port}")),
            other => panic!("expected Bind error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_serve_keeps_running_with_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits don't bind a privileged user
        let enforced = std::fs::read_dir(&locked).is_err();

        let outcome = tokio::time::timeout(
            Duration::from_millis(500),
            Server::new().serve(options(dir.path().to_path_buf(), 0)),
        )
        .await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            assert!(outcome.is_err(), "serve returned early: {outcome:?}");
        }
    }
}
