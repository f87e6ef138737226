//! Axum webhook surface.
//!
//! `GET /webhook` is a health probe. `POST /webhook` verifies the signature
//! over the raw body, then dispatches the event batch with unordered
//! concurrency; per-event failures are logged and counted, never surfaced as
//! a non-200 (the platform retries aggressively on anything else). Only a
//! bad signature is rejected, and only when `allow_unsigned` is off.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use futures::future::join_all;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::archive::{Archiver, Outcome};
use crate::signature::verify;
use crate::wire::WebhookPayload;

#[derive(Clone)]
pub struct WebhookConfig {
    pub channel_secret: String,
    /// Accept deliveries with a missing or invalid signature. Meant for local
    /// testing only; the default is strict rejection.
    pub allow_unsigned: bool,
}

#[derive(Clone)]
pub struct WebhookState {
    pub archiver: Arc<Archiver>,
    pub config: WebhookConfig,
}

/// Counts for one processed batch.
#[derive(Debug, PartialEq, Eq)]
pub struct BatchSummary {
    pub received: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(health).post(receive))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "chatvault",
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !verify(&body, signature, &state.config.channel_secret) {
        if state.config.allow_unsigned {
            warn!("Accepting unsigned/invalid-signature delivery (allow_unsigned is on)");
        } else {
            warn!("Rejecting delivery with missing or invalid signature");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "invalid signature" })),
            )
                .into_response();
        }
    }

    let summary = process_batch(&state.archiver, &body).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "events processed",
            "receivedEvents": summary.received,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

/// Parse and dispatch a raw batch. A body that fails to parse is skipped
/// whole with no side effects; per-event outcomes are isolated from each
/// other.
pub async fn process_batch(archiver: &Archiver, body: &[u8]) -> BatchSummary {
    let batch_id = Uuid::new_v4();

    let payload: WebhookPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(err) => {
            error!(%batch_id, "Malformed webhook body, skipping batch: {err}");
            return BatchSummary {
                received: 0,
                succeeded: 0,
                failed: 0,
            };
        }
    };

    let received = payload.events.len();
    info!(%batch_id, events = received, "Processing webhook batch");

    let results = join_all(
        payload
            .events
            .iter()
            .map(|event| archiver.process_event(event)),
    )
    .await;

    let mut succeeded = 0;
    let mut failed = 0;
    for result in results {
        match result {
            Ok(outcome) => {
                succeeded += 1;
                match outcome {
                    Outcome::Skipped { reason } => info!(%batch_id, "Event skipped: {reason}"),
                    other => info!(%batch_id, "Event archived: {other:?}"),
                }
            }
            Err(err) => {
                failed += 1;
                error!(%batch_id, "Event failed: {err}");
            }
        }
    }

    BatchSummary {
        received,
        succeeded,
        failed,
    }
}
