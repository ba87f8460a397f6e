//! Event debouncing for live reload.
//!
//! Editors rarely write a file in one step. Events for the same root-relative
//! path are merged until the path has been quiet for the debounce window, and
//! the merged kind decides what the browser is told (see
//! `ReloadEvent::for_change`).

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// What happened to a watched file within one debounce window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    /// The file did not exist when the window opened.
    Created,
    /// The file existed before and after.
    Modified,
    /// The file is gone.
    Removed,
}

impl FsEventKind {
    /// Merge a newer event into this one. `None` means nothing observable happened.
    fn then(self, newer: Self) -> Option<Self> {
        use FsEventKind::{Created, Modified, Removed};

        match (self, newer) {
            (Created, Removed) => None,
            (Created, _) => Some(Created),
            // Write to a temp file, then rename over the original
            (Removed, Created) => Some(Modified),
            (Removed, _) => Some(Removed),
            (Modified, newer) => Some(newer),
        }
    }
}

/// A settled change, ready to be pushed to browsers.
#[derive(Clone, Debug)]
pub(crate) struct FsEvent {
    pub path: String,
    pub kind: FsEventKind,
}

struct Pending {
    kind: FsEventKind,
    deadline: Instant,
}

/// Per-path event merger shared between the recorder and drain tasks.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<String, Pending>>,
    window: Duration,
}

impl EventDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Record an event for `path`, restarting its quiet period.
    pub fn record(&self, path: String, kind: FsEventKind) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + self.window;

        let merged = match pending.get(&path) {
            Some(existing) => existing.kind.then(kind),
            None => Some(kind),
        };
        match merged {
            Some(kind) => {
                pending.insert(path, Pending { kind, deadline });
            }
            None => {
                pending.remove(&path);
            }
        }
    }

    /// Take every change whose quiet period has elapsed.
    pub fn drain_ready(&self) -> Vec<FsEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        pending
            .extract_if(|_, p| p.deadline <= now)
            .map(|(path, p)| FsEvent { path, kind: p.kind })
            .collect()
    }
}
