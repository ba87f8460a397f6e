//! Live reload manager.
//!
//! Coordinates file watching and WebSocket broadcasting for live reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use livedir_watch::{PatternSet, Scanner, relative_key};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use super::debouncer::{EventDebouncer, FsEvent, FsEventKind};

/// Message pushed to connected browsers when a watched file changes.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct ReloadEvent {
    /// Always "reload".
    command: &'static str,
    /// Root-relative path that changed.
    path: String,
    /// Stylesheets can be swapped in place without a full page reload.
    #[serde(rename = "liveCSS")]
    live_css: bool,
}

impl ReloadEvent {
    /// Event for a debounced change.
    ///
    /// Only an in-place edit of a stylesheet can be swapped live; a stylesheet
    /// that appeared or vanished changes which `<link>`s resolve, so the page
    /// reloads.
    pub(crate) fn for_change(change: &FsEvent) -> Self {
        let stylesheet = change.path.to_lowercase().ends_with(".css");
        Self {
            command: "reload",
            path: change.path.clone(),
            live_css: stylesheet && change.kind == FsEventKind::Modified,
        }
    }
}

/// Default debounce duration in milliseconds.
pub(crate) const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// How often the debouncer is drained.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Manages file watching and broadcasting reload events.
pub(crate) struct LiveReloadManager {
    root: PathBuf,
    patterns: Arc<PatternSet>,
    broadcaster: broadcast::Sender<ReloadEvent>,
    watcher: Option<RecommendedWatcher>,
    debounce: Duration,
}

impl LiveReloadManager {
    /// Create a new live reload manager.
    ///
    /// # Arguments
    ///
    /// * `root` - Canonical directory to watch for changes
    /// * `patterns` - Compiled watch patterns, matched against root-relative paths
    /// * `broadcaster` - Broadcast channel sender for reload events
    #[must_use]
    pub(crate) fn new(
        root: PathBuf,
        patterns: PatternSet,
        broadcaster: broadcast::Sender<ReloadEvent>,
    ) -> Self {
        Self {
            root,
            patterns: Arc::new(patterns),
            broadcaster,
            watcher: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }

    /// Set the debounce duration.
    #[must_use]
    pub(crate) fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start the file watcher.
    ///
    /// Spawns background tasks that record matching filesystem events and
    /// broadcast debounced reload events to connected WebSocket clients.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be created or the root
    /// itself cannot be watched. Subdirectories that cannot be watched are
    /// skipped.
    pub(crate) fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = Self::create_watcher(tx.clone())?;
        if let Err(e) = watcher.watch(&self.root, RecursiveMode::Recursive) {
            // inotify gives up on the first directory it cannot watch
            tracing::warn!(
                root = %self.root.display(),
                error = %e,
                "Recursive watch failed, watching directories one by one"
            );
            watcher = Self::create_watcher(tx)?;
            Self::watch_directories(&mut watcher, &self.root)?;
        }
        self.watcher = Some(watcher);

        let debouncer = Arc::new(EventDebouncer::new(self.debounce));
        let debouncer_for_record = Arc::clone(&debouncer);
        let patterns = Arc::clone(&self.patterns);
        let root = self.root.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                Self::record_event(&event, &root, &patterns, &debouncer_for_record);
            }
        });

        let broadcaster = self.broadcaster.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);

            loop {
                interval.tick().await;

                for fs_event in debouncer.drain_ready() {
                    Self::handle_fs_event(&fs_event, &broadcaster);
                }
            }
        });

        tracing::info!(
            root = %self.root.display(),
            patterns = self.patterns.len(),
            "Watching for changes"
        );

        Ok(())
    }

    /// Create a watcher forwarding raw events into `tx`.
    fn create_watcher(tx: mpsc::Sender<Event>) -> Result<RecommendedWatcher, notify::Error> {
        notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // The callback runs on notify's own thread, outside the runtime
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::debug!(error = %e, "File watcher reported an error"),
            }
        })
    }

    /// Watch `root` and every readable directory below it individually.
    ///
    /// Only the root is required; any other directory that cannot be watched
    /// is logged and left out.
    fn watch_directories(watcher: &mut impl Watcher, root: &Path) -> Result<usize, notify::Error> {
        watcher.watch(root, RecursiveMode::NonRecursive)?;
        let mut watched = 1;

        for dir in Scanner::new(root.to_path_buf()).directories() {
            if dir == root {
                continue;
            }
            match watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => watched += 1,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Failed to watch directory, skipping");
                }
            }
        }

        tracing::debug!(root = %root.display(), directories = watched, "Watching directories individually");
        Ok(watched)
    }

    /// Record a raw filesystem event into the debouncer.
    fn record_event(event: &Event, root: &Path, patterns: &PatternSet, debouncer: &EventDebouncer) {
        let kind = match event.kind {
            EventKind::Create(_) => FsEventKind::Created,
            EventKind::Modify(_) => FsEventKind::Modified,
            EventKind::Remove(_) => FsEventKind::Removed,
            _ => return,
        };

        for path in &event.paths {
            let Some(key) = Self::matching_key(path, root, patterns) else {
                continue;
            };
            tracing::debug!(path = %key, ?kind, "Recorded filesystem event");
            debouncer.record(key, kind);
        }
    }

    /// Root-relative key for `path` if any watch pattern matches it.
    fn matching_key(path: &Path, root: &Path, patterns: &PatternSet) -> Option<String> {
        let key = relative_key(path, root)?;
        patterns.is_match(&key).then_some(key)
    }

    /// Broadcast a debounced filesystem event.
    fn handle_fs_event(fs_event: &FsEvent, broadcaster: &broadcast::Sender<ReloadEvent>) {
        let start = Instant::now();

        // No receivers just means no browser is connected yet
        let receivers = broadcaster
            .send(ReloadEvent::for_change(fs_event))
            .unwrap_or(0);

        tracing::info!(
            path = %fs_event.path,
            kind = ?fs_event.kind,
            clients = receivers,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Live reload event processed"
        );
    }

    /// Get a receiver for reload events.
    #[must_use]
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.broadcaster.subscribe()
    }
}
