//! HTTP API
//!
//! Provides two endpoints, mounted both at the root and under `/api`:
//! - `POST /audit` - run a full audit for `{"url": "..."}`
//! - `GET /health` - component self-test

use crate::audit::Auditor;
use crate::error::{Error, Result};
use crate::health::{self, HealthReport};
use crate::report::{AuditReport, AuditRequest, ValidationIssue};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use url::Url;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    auditor: Auditor,
    reference: Url,
}

impl AppState {
    /// Serve audits with `auditor`; the health check targets `reference`
    pub fn new(auditor: Auditor, reference: Url) -> Self {
        Self { auditor, reference }
    }
}

/// An [`Error`] rendered as an API response
///
/// Validation failures become 400 with the offending issues; everything
/// else becomes 500 with the error message.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_validation() {
            return invalid_request(self.0.issues());
        }

        let body = Json(json!({ "message": self.0.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

fn invalid_request(errors: Vec<ValidationIssue>) -> Response {
    let body = Json(json!({
        "message": "Invalid request data",
        "errors": errors,
    }));
    (StatusCode::BAD_REQUEST, body).into_response()
}

/// Build the router for `state`
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/audit", post(audit_handler))
        .route("/health", get(health_handler));

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
}

async fn audit_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> std::result::Result<Json<AuditReport>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected audit body");
        Error::InvalidRequest(vec![ValidationIssue {
            code: "invalid_type".to_string(),
            path: Vec::new(),
            message: rejection.body_text(),
        }])
    })?;

    let request = AuditRequest::from_json(&body)?;

    let report = state
        .auditor
        .audit_request(&request)
        .await
        .inspect_err(|e| tracing::error!(url = request.as_str(), error = %e, "audit failed"))?;

    Ok(Json(report))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(health::check(&state.auditor, &state.reference).await)
}

/// Bind `addr` and serve the API until the process exits
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::Server)?;
    let local = listener.local_addr().map_err(Error::Server)?;

    tracing::info!("SEO audit API listening on http://{}/", local);
    tracing::info!("  - Audit: POST http://{}/api/audit", local);
    tracing::info!("  - Health: GET http://{}/api/health", local);

    axum::serve(listener, router(state))
        .await
        .map_err(Error::Server)
}
