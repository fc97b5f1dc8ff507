//! HTTP routing.

use crate::server::DeltaServer;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::error;

/// Builds the router serving the document.
///
/// `GET /` negotiates a response; every other path is served the same way.
pub fn router(server: Arc<DeltaServer>) -> Router {
    Router::new()
        .route("/", get(get_document))
        .fallback(get_document)
        .with_state(server)
}

async fn get_document(State(server): State<Arc<DeltaServer>>, headers: HeaderMap) -> Response {
    match server.handle_headers(&headers) {
        Ok(response) => response.into_response(),
        Err(e) => {
            error!(error = %e, "failed to render response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use deltasync_protocol::{apply, Document, Patch, ProtocolFlavor, Snapshot, VersionStamp};
    use tower::ServiceExt;

    fn server_with_two_versions(flavor: ProtocolFlavor) -> (Arc<DeltaServer>, Document) {
        let server = Arc::new(DeltaServer::new(ServerConfig::default().with_flavor(flavor)));
        let mut doc = Document::new();
        for (nanos, leaf) in [(100, 1), (200, 5)] {
            doc.foo_b.bar_b.baz_b = leaf;
            let snapshot = Snapshot::new(doc, VersionStamp::from_nanos(nanos));
            server.store().set(snapshot);
            server.history().push(snapshot);
        }
        let mut first = Document::new();
        first.foo_b.bar_b.baz_b = 1;
        (server, first)
    }

    async fn send(server: Arc<DeltaServer>, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = router(server).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[tokio::test]
    async fn plain_get_is_full_document() {
        let (server, _) = server_with_two_versions(ProtocolFlavor::Delta);
        let request = Request::get("/").body(Body::empty()).unwrap();
        let (status, headers, body) = send(server, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["etag"], "\"200\"");
        assert_eq!(headers["content-type"], "application/json");
        let doc: Document = serde_json::from_slice(&body).unwrap();
        assert_eq!(doc.foo_b.bar_b.baz_b, 5);
    }

    #[tokio::test]
    async fn delta_request_gets_im_used() {
        let (server, first) = server_with_two_versions(ProtocolFlavor::Delta);
        let request = Request::get("/")
            .header("A-IM", "jsonpatch")
            .header("If-None-Match", "\"100\"")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(server, request).await;

        assert_eq!(status.as_u16(), 226);
        assert_eq!(headers["im"], "jsonpatch");
        assert_eq!(headers["delta-base"], "\"100\"");
        let patch = Patch::from_json(&body).unwrap();
        assert_eq!(apply(&first, &patch).unwrap().foo_b.bar_b.baz_b, 5);
    }

    #[tokio::test]
    async fn current_tag_is_not_modified() {
        let (server, _) = server_with_two_versions(ProtocolFlavor::Delta);
        let request = Request::get("/")
            .header("A-IM", "jsonpatch")
            .header("If-None-Match", "\"200\"")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(server, request).await;

        assert_eq!(status, StatusCode::NOT_MODIFIED);
        assert_eq!(headers["etag"], "\"200\"");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn since_flavor_sends_empty_patch_when_unchanged() {
        let (server, _) = server_with_two_versions(ProtocolFlavor::ModifiedSince);
        let request = Request::get("/")
            .header("Get-Modified-Since", "\"200\"")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = send(server, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/json-patch+json");
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn any_path_is_served() {
        let (server, _) = server_with_two_versions(ProtocolFlavor::Delta);
        let request = Request::get("/document").body(Body::empty()).unwrap();
        let (status, headers, _) = send(server, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["etag"], "\"200\"");
    }
}
