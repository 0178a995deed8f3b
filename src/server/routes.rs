//! HTTP endpoints: the validation POST and a health probe.
//!
//! The validation endpoint answers 200 with an XML verdict for every request
//! it routes, including bodies it cannot read.

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use super::request_id::{propagate_request_id, request_id_of};
use crate::config::HEALTH_PATH;
use crate::service::PortOutService;
use crate::verification::{ReasonCode, VerificationOutcome};
use crate::wire::{FALLBACK_FAILURE_BODY, encode_outcome};

/// Name reported by the health probe.
pub const SERVICE_NAME: &str = "port-out-validation";

const XML_CONTENT_TYPE: &str = "application/xml";

/// Shared state for the HTTP routes.
#[derive(Clone)]
pub struct AppState {
    pub service: PortOutService,
}

/// Build the router: `POST {path}` and `GET /health`.
pub fn port_out_routes(path: &str, service: PortOutService) -> Router {
    Router::new()
        .route(path, post(validate_port_out))
        .route(HEALTH_PATH, get(health))
        .with_state(AppState { service })
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id_of(request),
                )
            }),
        )
        .layer(middleware::from_fn(propagate_request_id))
}

/// POST {path}
///
/// Accepts `text/xml` or `application/xml`. Anything else, and any body that
/// cannot be read, is refused with 7598.
async fn validate_port_out(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(%peer, error = %e, "Unreadable port-out request body");
            return xml_response(&VerificationOutcome::Fail(ReasonCode::InvalidRequest));
        }
    };
    debug!(%peer, bytes = body.len(), "Port-out request received");

    if !is_xml_content_type(&headers) {
        warn!(
            %peer,
            content_type = ?headers.get(header::CONTENT_TYPE),
            "Port-out request is not XML"
        );
        return xml_response(&VerificationOutcome::Fail(ReasonCode::InvalidRequest));
    }

    let outcome = state.service.verify_body(&body).await;
    xml_response(&outcome)
}

/// GET /health
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "service": SERVICE_NAME})),
        ),
        Err(e) => {
            error!(error = %e, "Record store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unavailable",
                    "service": SERVICE_NAME,
                    "error": e.to_string(),
                })),
            )
        }
    }
}

/// `text/xml` or `application/xml`, parameters such as charset allowed.
fn is_xml_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("text/xml") || essence.eq_ignore_ascii_case("application/xml")
}

fn xml_response(outcome: &VerificationOutcome) -> Response {
    let body = encode_outcome(outcome).unwrap_or_else(|e| {
        error!(error = %e, "Failed to encode verdict, sending fallback");
        FALLBACK_FAILURE_BODY.to_string()
    });
    (StatusCode::OK, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}
