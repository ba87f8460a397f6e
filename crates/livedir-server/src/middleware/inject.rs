//! HTML injection middleware: inserts the live reload client script into pages.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;

/// Client script, connects back to the live reload WebSocket.
const RELOAD_JS: &str = include_str!("livereload.js");

/// Axum middleware: if the response is a full HTML page, inject the reload script.
pub(crate) async fn inject_livereload(req: Request, next: Next) -> Response {
    let resp = next.run(req).await;

    if resp.status() != StatusCode::OK || !is_html(&resp) {
        return resp;
    }

    let (mut parts, body) = resp.into_parts();
    let collected = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer HTML response");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let Ok(html) = std::str::from_utf8(&collected) else {
        tracing::debug!("HTML response is not UTF-8, serving it unchanged");
        return Response::from_parts(parts, Body::from(collected));
    };
    let injected = inject_script(html);

    // Body size changed
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(injected))
}

fn is_html(resp: &Response) -> bool {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

/// Insert the reload script before `</body>`, else before `</html>`, else at the end.
pub(crate) fn inject_script(html: &str) -> String {
    let script = format!("<script>\n{RELOAD_JS}\n</script>\n");

    match html.rfind("</body>").or_else(|| html.rfind("</html>")) {
        Some(pos) => format!("{}{script}{}", &html[..pos], &html[pos..]),
        None => format!("{html}\n{script}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let out = inject_script("<html><body><h1>Hi</h1></body></html>");

        let script_pos = out.find("<script>").unwrap();
        let body_pos = out.find("</body>").unwrap();
        assert!(script_pos < body_pos);
        assert!(out.starts_with("<html><body><h1>Hi</h1>"));
        assert!(out.ends_with("</body></html>"));
    }

    #[test]
    fn test_inject_uses_last_body_close() {
        let out = inject_script("<body><pre>&lt;/body&gt; </body></pre></body>");
        assert!(out.ends_with("</script>\n</body>"));
    }

    #[test]
    fn test_inject_before_html_close_without_body() {
        let out = inject_script("<html><p>x</p></html>");
        assert!(out.find("<script>").unwrap() < out.find("</html>").unwrap());
    }

    #[test]
    fn test_inject_appends_to_fragment() {
        let out = inject_script("<p>fragment</p>");
        assert!(out.starts_with("<p>fragment</p>\n<script>"));
    }

    #[test]
    fn test_script_targets_live_reload_endpoint() {
        assert!(RELOAD_JS.contains(crate::live_reload::LIVE_RELOAD_PATH));
    }

    #[test]
    fn test_script_compares_decoded_stylesheet_paths() {
        // Reload events carry raw paths, link hrefs are percent-encoded
        assert!(RELOAD_JS.contains("decodeURIComponent(pathname) === path"));
    }
}
