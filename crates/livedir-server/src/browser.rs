//! Opening the served page in the user's browser.

use std::time::Duration;

/// Open `url` in the default browser after `delay`.
///
/// Runs in the background; a failure to launch the browser is logged and
/// never affects the server.
pub(crate) fn open_after(url: String, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let target = url.clone();
        match tokio::task::spawn_blocking(move || webbrowser::open(&target)).await {
            Ok(Ok(())) => tracing::debug!(url = %url, "Opened browser"),
            Ok(Err(e)) => tracing::warn!(url = %url, error = %e, "Failed to open browser"),
            Err(e) => tracing::warn!(error = %e, "Browser task panicked"),
        }
    });
}

/// URL a browser should use to reach the server.
///
/// IPv6 literals are bracketed.
pub(crate) fn browser_url(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{host}]:{port}/")
    } else {
        format!("http://{host}:{port}/")
    }
}
