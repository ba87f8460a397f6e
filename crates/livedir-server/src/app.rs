//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::get;
use tower::ServiceBuilder;

use crate::live_reload::{self, LIVE_RELOAD_PATH};
use crate::middleware::{headers, inject};
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `root` - Directory served as static files
pub(crate) fn create_router(state: Arc<AppState>, root: &Path) -> Router {
    Router::new()
        .route(LIVE_RELOAD_PATH, get(live_reload::ws_handler))
        .fallback_service(static_files::serve_dir(root))
        .layer(
            ServiceBuilder::new()
                .layer(headers::no_cache_layer())
                .layer(headers::content_type_options_layer())
                .layer(from_fn(inject::inject_livereload)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use livedir_watch::PatternSet;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    use crate::live_reload::LiveReloadManager;

    fn create_site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<html><body><h1>Home</h1></body></html>",
        )
        .unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/site.css"), "body { color: red; }").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("docs/index.html"),
            "<html><body>Docs</body></html>",
        )
        .unwrap();
        dir
    }

    fn router(root: &Path) -> Router {
        let (tx, _rx) = broadcast::channel(4);
        let manager = LiveReloadManager::new(root.to_path_buf(), PatternSet::new(&[]), tx);
        create_router(Arc::new(AppState { live_reload: manager }), root)
    }

    async fn fetch(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_serves_index_with_script() {
        let site = create_site();
        let resp = fetch(router(site.path()), "/").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::CONTENT_LENGTH).is_none());
        let body = body_string(resp).await;
        assert!(body.contains("<h1>Home</h1>"));
        assert!(body.contains("/livereload"));
        assert!(body.find("<script>").unwrap() < body.find("</body>").unwrap());
    }

    #[tokio::test]
    async fn test_nested_directory_index() {
        let site = create_site();
        let resp = fetch(router(site.path()), "/docs/").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("Docs"));
    }

    #[tokio::test]
    async fn test_css_is_not_modified() {
        let site = create_site();
        let resp = fetch(router(site.path()), "/css/site.css").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "body { color: red; }");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let site = create_site();
        let resp = fetch(router(site.path()), "/missing.html").await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_response_headers() {
        let site = create_site();
        let resp = fetch(router(site.path()), "/css/site.css").await;

        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
        assert_eq!(
            resp.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_websocket_route_requires_upgrade() {
        let site = create_site();
        let resp = fetch(router(site.path()), "/livereload").await;

        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn test_non_utf8_html_is_served_unchanged() {
        let site = create_site();
        let latin1: &[u8] = b"<html><body>caf\xe9</body></html>";
        fs::write(site.path().join("latin1.html"), latin1).unwrap();

        let resp = fetch(router(site.path()), "/latin1.html").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], latin1);
    }
}
