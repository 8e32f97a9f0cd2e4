use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderValue};
use pod_handler::AsyncHandler;
use pod_http::add_header;
use pod_types::vocab::content_type::OCTET_STREAM;
use pod_types::{Diagnostics, HttpError, HttpResult};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::handler::{OperationHandler, ResponseDescription};
use crate::request::parse_request;

/// Shared state of the request handler.
#[derive(Clone)]
pub struct AppState {
    pub base_url: String,
    pub max_body_size: usize,
    pub handler: Arc<OperationHandler>,
    pub diagnostics: Diagnostics,
}

/// Build the axum router. Every path and method goes to the operation
/// handlers; routing happens on the resource identifier, not the URL pattern.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(handle_request)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn handle_request(State(state): State<AppState>, request: Request) -> Response {
    let result: HttpResult<Response> = async {
        let operation = parse_request(request, &state.base_url, state.max_body_size).await?;
        let description = state.handler.handle_safe(operation).await?;
        into_response(description).await
    }
    .await;
    result.unwrap_or_else(|err| {
        state.diagnostics.in_scope(|| {
            if err.is_server_error() {
                error!(status = %err.status_code(), error = %err, "request failed");
            } else {
                debug!(status = %err.status_code(), error = %err, "request rejected");
            }
        });
        error_response(err)
    })
}

fn header_value(value: &str) -> HttpResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| HttpError::internal(format!("cannot send {value:?} as a header value")))
}

async fn into_response(description: ResponseDescription) -> HttpResult<Response> {
    let mut headers = HeaderMap::new();
    if let Some(location) = &description.location {
        add_header(&mut headers, LOCATION, header_value(location.path())?);
    }
    if let Some(metadata) = &description.metadata {
        let content_type = metadata.content_type.as_deref().unwrap_or(OCTET_STREAM);
        add_header(&mut headers, CONTENT_TYPE, header_value(content_type)?);
    }
    let body = match description.body {
        Some(representation) => Body::from(representation.into_bytes().await?),
        None => Body::empty(),
    };
    Ok((description.status, headers, body).into_response())
}

/// Map a classified error onto its status code with the message as body.
pub fn error_response(err: HttpError) -> Response {
    (
        err.status_code(),
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        err.message().to_string(),
    )
        .into_response()
}
