// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP surface: one print-job endpoint at the root path.
//
// Any method is accepted. Success is a 200 with an empty body; a malformed
// or invalid request is a 400 and a failed job stage is a 500, both with
// the error text as a plain-text body.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use printgate_core::PrintgateError;

use crate::form;
use crate::services::orchestrator::JobOrchestrator;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<JobOrchestrator>,
}

/// Build the router with a request body cap of `max_body` bytes.
pub fn router(state: AppState, max_body: usize) -> Router {
    Router::new()
        .route("/", any(print_job))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn print_job(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let pairs = form::collect(&method, content_type, query.as_deref(), &body)?;

    let orchestrator = Arc::clone(&state.orchestrator);
    let report = tokio::task::spawn_blocking(move || orchestrator.process(pairs))
        .await
        .map_err(|e| PrintgateError::Internal(format!("job task failed: {e}")))??;
    debug!(
        job = %report.job_id,
        mode = %report.mode,
        printer = %report.printer_key,
        device = %report.device,
        dispatched = report.dispatched,
        "job response sent"
    );
    Ok(StatusCode::OK)
}

/// Error response: status from the error's class, message as the body.
pub struct ApiError(PrintgateError);

impl From<PrintgateError> for ApiError {
    fn from(err: PrintgateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_request_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error!(status = status.as_u16(), error = %self.0, "print job failed");
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.0.to_string(),
        )
            .into_response()
    }
}
