//! Static file serving.
//!
//! Files are served straight from the root; directories resolve to their
//! `index.html`, and anything missing is a 404.

use std::path::Path;

use tower_http::services::ServeDir;

/// Create the fallback service that serves files under `root`.
pub(crate) fn serve_dir(root: &Path) -> ServeDir {
    ServeDir::new(root).append_index_html_on_directories(true)
}
