//! HTTP server for the pod.
//!
//! Every request becomes an [`Operation`](pod_types::Operation) that a
//! waterfall of per-method handlers executes against the store stack built
//! by [`PodServer`].

pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{operation_handlers, OperationHandler, ResponseDescription};
pub use request::parse_request;
pub use router::{build_router, error_response, AppState};
pub use server::PodServer;

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderMap, Request, StatusCode};
    use axum::Router;
    use pod_types::Diagnostics;
    use tempfile::TempDir;
    use tower::util::ServiceExt;
    use tracing::Dispatch;

    fn app() -> (TempDir, Router) {
        app_with(Diagnostics::none())
    }

    fn app_with(diagnostics: Diagnostics) -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            base_url: "http://pod.test/".into(),
            root_path: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let router = PodServer::new(config)
            .with_diagnostics(diagnostics)
            .router()
            .unwrap();
        (dir, router)
    }

    /// Log lines written to an injected sink.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capturing() -> (Diagnostics, Captured) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (Diagnostics::from_dispatch(Dispatch::new(subscriber)), captured)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> (StatusCode, HeaderMap, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    const TRIPLE: &str = "<http://s> <http://p> <http://o> .";

    #[tokio::test]
    async fn put_then_get() {
        let (_dir, app) = app();
        let (status, _, _) =
            send(&app, "PUT", "/doc.ttl", &[("content-type", "text/turtle")], TRIPLE).await;
        assert_eq!(status, StatusCode::RESET_CONTENT);

        let (status, headers, body) =
            send(&app, "GET", "/doc.ttl", &[("accept", "text/turtle")], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/turtle");
        assert_eq!(body, TRIPLE);
    }

    #[tokio::test]
    async fn get_converts_to_requested_type() {
        let (_dir, app) = app();
        send(&app, "PUT", "/doc.ttl", &[("content-type", "text/turtle")], TRIPLE).await;
        let (status, headers, body) = send(
            &app,
            "GET",
            "/doc.ttl",
            &[("accept", "application/n-triples")],
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/n-triples");
        assert_eq!(body, format!("{TRIPLE}\n"));
    }

    #[tokio::test]
    async fn head_has_no_body() {
        let (_dir, app) = app();
        send(&app, "PUT", "/doc.ttl", &[("content-type", "text/turtle")], TRIPLE).await;
        let (status, headers, body) = send(&app, "HEAD", "/doc.ttl", &[], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/turtle");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn missing_resource_is_404() {
        let (_dir, app) = app();
        let (status, _, _) = send(&app, "GET", "/nothing", &[], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_creates_member() {
        let (_dir, app) = app();
        let (status, headers, _) = send(
            &app,
            "POST",
            "/",
            &[("content-type", "text/plain"), ("slug", "note.txt")],
            "hello",
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers["location"], "http://pod.test/note.txt");

        let (status, headers, body) = send(&app, "GET", "/", &[("accept", "text/turtle")], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/turtle");
        assert!(body.contains("<http://pod.test/note.txt>"));
        assert!(body.contains("<http://www.w3.org/ns/ldp#contains>"));
    }

    #[tokio::test]
    async fn delete_then_gone() {
        let (_dir, app) = app();
        send(&app, "PUT", "/a.txt", &[("content-type", "text/plain")], "x").await;
        let (status, _, _) = send(&app, "DELETE", "/a.txt", &[], "").await;
        assert_eq!(status, StatusCode::RESET_CONTENT);
        let (status, _, _) = send(&app, "GET", "/a.txt", &[], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = send(&app, "DELETE", "/", &[], "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn patch_inserts_triples() {
        let (_dir, app) = app();
        let (status, _, _) = send(
            &app,
            "PATCH",
            "/graph.ttl",
            &[("content-type", "application/sparql-update")],
            "INSERT DATA { <http://s> <http://p> <http://o> }",
        )
        .await;
        assert_eq!(status, StatusCode::RESET_CONTENT);

        let (_, _, body) = send(
            &app,
            "GET",
            "/graph.ttl",
            &[("accept", "application/n-triples")],
            "",
        )
        .await;
        assert_eq!(body, format!("{TRIPLE}\n"));
    }

    #[tokio::test]
    async fn patch_with_graph_is_501() {
        let (_dir, app) = app();
        let (status, _, _) = send(
            &app,
            "PATCH",
            "/graph.ttl",
            &[("content-type", "application/sparql-update")],
            "INSERT DATA { GRAPH <http://g> { <http://s> <http://p> <http://o> } }",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn unknown_method_is_501() {
        let (_dir, app) = app();
        let (status, _, body) = send(&app, "PROPFIND", "/", &[], "").await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(body.starts_with("No handler supports the given input"));
    }

    #[tokio::test]
    async fn client_errors() {
        let (_dir, app) = app();
        let (status, _, _) = send(&app, "GET", "/", &[("accept", "text/turtle;q=7")], "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = send(&app, "PUT", "/empty", &[], "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = send(
            &app,
            "PATCH",
            "/doc",
            &[("content-type", "text/plain")],
            "not an update",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn rejections_reach_the_injected_sink() {
        let (diagnostics, captured) = capturing();
        let (_dir, app) = app_with(diagnostics);
        let (status, _, _) = send(&app, "GET", "/", &[("accept", "text/turtle;q=7")], "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("request rejected"), "{logs}");
        assert!(logs.contains("Invalid q value"), "{logs}");
    }

    #[tokio::test]
    async fn non_sparql_patch_is_501() {
        let (_dir, app) = app();
        send(&app, "PUT", "/doc.ttl", &[("content-type", "text/turtle")], TRIPLE).await;
        let (status, _, body) = send(
            &app,
            "PATCH",
            "/doc.ttl",
            &[("content-type", "text/turtle")],
            "<http://s> <http://p> <http://other> .",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(body.contains("Only SPARQL update patch operations are supported"));

        let (_, _, body) = send(&app, "GET", "/doc.ttl", &[("accept", "text/turtle")], "").await;
        assert_eq!(body, TRIPLE);
    }

    #[tokio::test]
    async fn composite_patch_applies_operations_in_order() {
        let (_dir, app) = app();
        let (status, _, _) = send(
            &app,
            "PATCH",
            "/graph.ttl",
            &[("content-type", "application/sparql-update")],
            "INSERT DATA { <http://s> <http://p> <http://a>, <http://b> } ;\n\
             DELETE WHERE { <http://s> <http://p> ?o } ;\n\
             INSERT DATA { <http://s> <http://p> <http://o> }",
        )
        .await;
        assert_eq!(status, StatusCode::RESET_CONTENT);

        let (_, _, body) = send(
            &app,
            "GET",
            "/graph.ttl",
            &[("accept", "application/n-triples")],
            "",
        )
        .await;
        assert_eq!(body, format!("{TRIPLE}\n"));
    }
}
