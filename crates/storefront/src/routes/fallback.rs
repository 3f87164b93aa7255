//! Static file fallback for paths no route matched.
//!
//! Files in the dist directory are served as-is. A missing path that looks
//! like a file is a 404; anything else gets `index.html` so client-side
//! routes resolve. Only GET and HEAD reach the dist directory.

use std::convert::Infallible;
use std::path::Path;
use std::sync::LazyLock;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
};
use regex::Regex;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::state::AppState;

#[allow(clippy::expect_used)]
static FILE_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.[a-z0-9]+$").expect("valid regex"));

/// Whether a request path names a file rather than a client-side route.
#[must_use]
pub fn looks_like_file(path: &str) -> bool {
    FILE_LIKE.is_match(path)
}

/// Serve from the dist directory, falling back to `index.html`.
pub async fn static_fallback(State(state): State<AppState>, request: Request) -> Response {
    serve_dist(&state.config().dist_dir, request).await
}

/// Fallback logic over an explicit dist directory.
pub async fn serve_dist(dist: &Path, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    let path = request.uri().path().to_owned();

    let served: Result<_, Infallible> = ServeDir::new(dist).oneshot(request).await;
    match served {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => {
            return response.map(Body::new);
        }
        Ok(_) => {}
        Err(never) => match never {},
    }

    if looks_like_file(&path) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match tokio::fs::read_to_string(dist.join("index.html")).await {
        Ok(shell) => Html(shell).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, dist = %dist.display(), "index.html missing from dist");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    fn dist() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<div id=\"root\"></div>").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app.js"), "console.log(1);").unwrap();
        dir
    }

    async fn get(dist: &Path, uri: &str) -> (StatusCode, String) {
        send(dist, Method::GET, uri).await
    }

    async fn send(dist: &Path, method: Method, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = serve_dist(dist, request).await;
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_looks_like_file() {
        assert!(looks_like_file("/assets/app.js"));
        assert!(looks_like_file("/logo.PNG"));
        assert!(!looks_like_file("/orders/123"));
        assert!(!looks_like_file("/"));
        assert!(!looks_like_file("/weird./"));
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let dir = dist();
        let (status, body) = get(dir.path(), "/assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log(1);");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = dist();
        let (status, body) = get(dir.path(), "/assets/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not found");
    }

    #[tokio::test]
    async fn test_client_route_gets_index() {
        let dir = dist();
        let (status, body) = get(dir.path(), "/some/client/route").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("id=\"root\""));
    }

    #[tokio::test]
    async fn test_other_methods_are_not_found() {
        let dir = dist();
        let (status, _) = send(dir.path(), Method::POST, "/some/route").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(dir.path(), Method::DELETE, "/assets/app.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
