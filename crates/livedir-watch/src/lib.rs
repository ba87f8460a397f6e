//! Static file discovery and watch registration for livedir.
//!
//! This crate covers everything that happens before the server starts:
//!
//! - [`scan_static_files`] walks the serving root and lists every static asset
//! - [`WatchPattern`] describes what a change must match to trigger a reload
//! - [`register_watches`] feeds the fixed globs and discovered files into any
//!   [`WatchRegistry`] (the server implements it)
//!
//! # Example
//!
//! ```
//! use livedir_watch::{WatchPattern, register_watches};
//!
//! let mut registered: Vec<WatchPattern> = Vec::new();
//! register_watches(&mut registered, &["css/site.css".to_owned()]);
//! assert_eq!(registered.len(), 4);
//! ```

mod pattern;
mod registrar;
mod scanner;

pub use pattern::{PatternSet, WatchPattern, relative_key};
pub use registrar::{DEFAULT_GLOBS, WatchRegistry, register_watches};
pub use scanner::{STATIC_EXTENSIONS, Scanner, is_static_file, scan_static_files};
