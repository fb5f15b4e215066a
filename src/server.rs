//! HTTP surface of the gateway.
//!
//! | Method | Path | Reply |
//! |--------|------|-------|
//! | `POST` | `/lint` | [`LintResponse`] |
//! | `GET` | `/health` | `{"status": "ok"}` |
//!
//! Failures reply with `{"status": "error", "message": ...}`: 400 for a bad
//! dialect or a body that is not a lint request, 504 when the linter times
//! out, 500 for anything else.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post}
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{
    error::{
        AppError, AppErrorKind, AppResult, error_message, request_body_error, server_error
    },
    lint::{LintRequest, LintResponse, LintService}
};

/// Build the gateway router around a shared service
pub fn router(service: Arc<LintService>) -> Router {
    Router::new()
        .route("/lint", post(lint))
        .route("/health", get(health))
        .with_state(service)
}

/// Bind `host:port` and serve until Ctrl-C
pub async fn serve(service: LintService, host: &str, port: u16) -> AppResult<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(server_error)?;
    let addr = listener.local_addr().map_err(server_error)?;
    tracing::info!(%addr, "sql-lint-gateway listening");

    axum::serve(listener, router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(server_error)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn lint(
    State(service): State<Arc<LintService>>,
    payload: Result<Json<LintRequest>, JsonRejection>
) -> Result<Json<LintResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(bytes = request.sql.len(), dialect = ?request.dialect, "lint request");
    let response = service.lint(&request).await?;
    Ok(Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// [`AppError`] rendered as an HTTP reply.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(request_body_error(&rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0.kind);
        let message = error_message(&self.0);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), %message, "lint request failed");
        } else {
            tracing::warn!(status = status.as_u16(), %message, "lint request rejected");
        }
        let body = json!({
            "status": "error",
            "message": message
        });
        (status, Json(body)).into_response()
    }
}

/// HTTP status for an error kind
pub fn status_for(kind: &AppErrorKind) -> StatusCode {
    match kind {
        AppErrorKind::BadRequest | AppErrorKind::Validation => StatusCode::BAD_REQUEST,
        AppErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR
    }
}
