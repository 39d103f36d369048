//! Report echo handler: answers every request with its report fragment.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use request_report_core::ReportError;
use serde_json::json;
use tracing::{error, warn};

use super::AppState;
use crate::adapter::HttpRequestSource;

/// Response header set when `request_params` had to be dropped.
pub const PARTIAL_REPORT_HEADER: &str = "x-report-partial";

/// Captures the request and returns its report fragment as JSON.
///
/// If the multipart stream cannot be read, the fragment is rebuilt without
/// submitted parameters and flagged with [`PARTIAL_REPORT_HEADER`]. An
/// unsupported request type is an integration error and yields 500.
pub async fn report_handler(State(state): State<AppState>, request: Request) -> Response {
    let source = HttpRequestSource::capture(request).await;

    match state.reporter.route(&source) {
        Ok(fragment) => Json(fragment).into_response(),
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, "reporting request without submitted parameters");
            match state.reporter.route(&source.without_parts()) {
                Ok(fragment) => ([(PARTIAL_REPORT_HEADER, "true")], Json(fragment)).into_response(),
                Err(err) => failure(&err),
            }
        }
        Err(err) => failure(&err),
    }
}

fn failure(err: &ReportError) -> Response {
    error!(error = %err, "unable to build request report");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}
