//! Watch patterns and matching.

use std::fmt;
use std::path::Path;

use glob::{MatchOptions, Pattern};

/// Glob options that mimic a shell glob evaluated in the serving root:
/// `*` never crosses `/` and never matches a leading dot.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// What a changed file must match to trigger a reload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WatchPattern {
    /// Glob expression relative to the serving root, e.g. `*.html`.
    Glob(String),
    /// Concrete `/`-separated path relative to the serving root.
    Path(String),
}

impl WatchPattern {
    /// Create a glob pattern.
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Create a concrete path pattern.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// The raw pattern text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Glob(s) | Self::Path(s) => s,
        }
    }
}

impl fmt::Display for WatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Matcher {
    Glob(Pattern),
    Exact(String),
}

impl Matcher {
    fn matches(&self, relative: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches_with(relative, GLOB_OPTIONS),
            Self::Exact(path) => path == relative,
        }
    }
}

/// Compiled set of watch patterns.
///
/// Globs that fail to compile are logged and dropped; an empty set simply
/// never matches.
pub struct PatternSet {
    matchers: Vec<Matcher>,
}

impl PatternSet {
    /// Compile a set of patterns.
    pub fn new(patterns: &[WatchPattern]) -> Self {
        let matchers = patterns
            .iter()
            .filter_map(|p| match p {
                WatchPattern::Glob(glob) => match Pattern::new(glob) {
                    Ok(compiled) => Some(Matcher::Glob(compiled)),
                    Err(e) => {
                        tracing::warn!(pattern = %glob, error = %e, "Invalid watch glob, ignoring");
                        None
                    }
                },
                WatchPattern::Path(path) => Some(Matcher::Exact(path.clone())),
            })
            .collect();
        Self { matchers }
    }

    /// Check whether a root-relative, `/`-separated path matches any pattern.
    pub fn is_match(&self, relative: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(relative))
    }

    /// Number of usable patterns.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether the set has no usable patterns.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Convert an absolute path under `root` into the `/`-separated key used for matching.
///
/// Returns `None` for paths outside `root` and for `root` itself.
pub fn relative_key(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let key = relative.to_string_lossy().replace('\\', "/");
    if key.is_empty() { None } else { Some(key) }
}
