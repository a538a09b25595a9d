//! HTTP surface for the relay.
//!
//! Every method is routed to the adapter so it can answer 405 itself.

use crate::adapter::RequestAdapter;
use crate::models::{IncomingRequest, OutboundResponse};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::Response;
use axum::routing::{any, get};
use axum::Router;
use std::sync::Arc;

pub const RELAY_PATH: &str = "/api/gemini";
pub const LEGACY_FUNCTION_PATH: &str = "/.netlify/functions/gemini";

pub fn router(adapter: Arc<RequestAdapter>) -> Router {
    Router::new()
        .route(RELAY_PATH, any(relay_handler))
        .route(LEGACY_FUNCTION_PATH, any(relay_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(adapter)
}

async fn relay_handler(
    State(adapter): State<Arc<RequestAdapter>>,
    method: Method,
    body: Bytes,
) -> Response {
    let body = if body.is_empty() {
        None
    } else {
        Some(body.to_vec())
    };

    let outbound = adapter
        .handle(IncomingRequest::from_bytes(method.as_str(), body))
        .await;
    into_http_response(outbound)
}

fn into_http_response(outbound: OutboundResponse) -> Response {
    let mut response = Response::new(Body::from(outbound.body));
    *response.status_mut() =
        StatusCode::from_u16(outbound.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
