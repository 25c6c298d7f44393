//! HTTP surface for the summarization pipeline.
//!
//! - `POST /notifications` – Accept an S3 event document, run one pipeline invocation for its
//!   first record, and answer `{ "status": 200|500, "message": "..." }` with the same HTTP status.
//! - `GET /metrics` – Observe counters for indexed documents, summarized chunks, and failures.

use crate::processing::{PipelineApi, PipelineResponse};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

/// Build the HTTP router exposing the pipeline.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PipelineApi + 'static,
{
    Router::new()
        .route("/notifications", post(handle_notification::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Run the pipeline for a raw event body.
///
/// The body is taken as bytes so malformed events become pipeline errors rather than framework
/// rejections.
async fn handle_notification<S>(State(service): State<Arc<S>>, body: Bytes) -> Response
where
    S: PipelineApi,
{
    let response = service.handle_event(&body).await;
    tracing::info!(
        status = response.status,
        message = %response.message,
        "Notification handled"
    );
    into_http_response(response)
}

fn into_http_response(response: PipelineResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response)).into_response()
}

/// Return a concise metrics snapshot.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Response
where
    S: PipelineApi,
{
    Json(service.metrics_snapshot()).into_response()
}
