//! Media fetch handlers: per-job SSE streams.

use super::FetchParams;
use crate::api::AppState;
use crate::types::{Job, StreamEvent};
use crate::{bridge, resolver, utils};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};

/// Capacity of the per-job event channel; backpressures the downloader pump
/// when a client consumes slowly
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// POST /api/fetch - Start a download job, streaming progress as SSE
///
/// An absent or unparseable body behaves like an empty request: validation
/// fails and the stream carries a single error `done` event.
#[utoipa::path(
    post,
    path = "/api/fetch",
    tag = "fetch",
    request_body = FetchParams,
    responses(
        (status = 200, description = "Job accepted; events follow on the stream", content_type = "text/event-stream"),
        (status = 400, description = "Invalid URL; the stream carries a single error done event", content_type = "text/event-stream")
    )
)]
pub async fn fetch_media(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<FetchParams>>,
) -> Response {
    let params = body.map(|Json(params)| params).unwrap_or_default();
    start_job_stream(state, headers, params)
}

/// GET /api/run - Same semantics as POST /api/fetch, via query parameters
///
/// Kept for manual invocation from a browser address bar or curl without a
/// request body.
#[utoipa::path(
    get,
    path = "/api/run",
    tag = "fetch",
    params(FetchParams),
    responses(
        (status = 200, description = "Job accepted; events follow on the stream", content_type = "text/event-stream"),
        (status = 400, description = "Invalid URL; the stream carries a single error done event", content_type = "text/event-stream")
    )
)]
pub async fn run_media(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FetchParams>,
) -> Response {
    start_job_stream(state, headers, params)
}

/// Shared core for both endpoints: validate, open the stream, launch the job
///
/// The channel sender is handed to exactly one owner — the spawned bridge
/// task on success, this function's scope on validation failure — so the
/// stream terminates exactly once on every path.
fn start_job_stream(state: AppState, headers: HeaderMap, params: FetchParams) -> Response {
    let config = state.config;
    let (tx, rx) = mpsc::channel::<StreamEvent>(EVENT_CHANNEL_CAPACITY);

    let status = match utils::clean_input_url(&params.url) {
        Some(url) => {
            let base_url = resolver::public_base_url(&config, &headers);
            let job = Job::new(
                url,
                params.mode,
                params.filename.as_deref(),
                &config.output_dir,
            );
            tokio::spawn(bridge::run_job(config.clone(), job, base_url, tx));
            StatusCode::OK
        }
        None => {
            tracing::debug!(url = %params.url, "rejected fetch request");
            // Error-only stream: no start event, one terminal done
            let _ = tx.try_send(StreamEvent::failed("Invalid url"));
            StatusCode::BAD_REQUEST
        }
    };

    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Ok::<_, Infallible>(SseEvent::default().event(event.kind()).data(data))
    });

    let mut response = Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response();
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("cache-control", HeaderValue::from_static("no-cache"));
    // stops nginx-style proxies from buffering the stream
    response
        .headers_mut()
        .insert("x-accel-buffering", HeaderValue::from_static("no"));
    response
}
