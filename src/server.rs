//! Inbound HTTP surface.
//!
//! A single chat completions endpoint plus a liveness probe. The handler is
//! thin plumbing: transform the request, dispatch to the upstream client, and
//! either reconcile the reply (sync) or relay the byte stream untouched
//! (streaming).

use crate::client::UpstreamClient;
use crate::error::RelayError;
use crate::logging::log_debug;
use crate::reconcile::attach_structured_result;
use crate::transform::inject_structured_output_prompt;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Shared per-process state handed to request handlers.
///
/// Built once at startup; there is no mutable state shared across calls.
#[derive(Clone)]
pub struct AppState {
    upstream: Arc<UpstreamClient>,
}

/// Build the relay router around a configured upstream client.
pub fn build_app(upstream: UpstreamClient) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(AppState {
            upstream: Arc::new(upstream),
        })
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn chat_completions(
    State(state): State<AppState>,
    Json(mut body): Json<Value>,
) -> Response {
    let stream = body
        .get("stream")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // Request-side instruction injection applies to both paths; it happens
    // before the call is dispatched.
    let requested_format = match inject_structured_output_prompt(&mut body) {
        Ok(format) => format,
        Err(e) => return error_response(&e),
    };

    log_debug!(
        stream = stream,
        structured_requested = requested_format.is_some(),
        "Dispatching chat completion to upstream"
    );

    if stream {
        match state.upstream.chat_stream(&body).await {
            Ok(upstream) => relay_event_stream(upstream),
            Err(e) => error_response(&e),
        }
    } else {
        let mut reply = match state.upstream.chat(&body).await {
            Ok(reply) => reply,
            Err(e) => return error_response(&e),
        };
        if let Err(e) = attach_structured_result(requested_format.as_ref(), &mut reply) {
            return error_response(&e);
        }
        Json(reply).into_response()
    }
}

/// Forward the upstream event stream to the caller byte for byte.
///
/// No buffering, parsing, or reframing; chunks go out in arrival order. When
/// the caller disconnects the receiver drops, the forwarding task stops, and
/// dropping the upstream response cancels the outbound call. A mid-stream
/// upstream error terminates the stream; the already-sent status stays as is.
fn relay_event_stream(upstream: reqwest::Response) -> Response {
    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let chunks = upstream.bytes_stream();

    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(16);
    tokio::spawn(async move {
        tokio::pin!(chunks);
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    if tx.send(Ok(bytes)).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut response = Response::new(Body::from_stream(ReceiverStream::new(rx)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    response
}

/// Map a relay error to an OpenAI-style error envelope.
///
/// Upstream non-success statuses pass through with the upstream body as the
/// detail text.
fn error_response(err: &RelayError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let detail = match err {
        RelayError::Upstream { detail, .. } => detail.clone(),
        _ => err.to_string(),
    };
    (status, Json(json!({ "error": { "message": detail } }))).into_response()
}
