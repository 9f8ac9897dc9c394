//! HTTP handlers for the lead relay.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use intake_engine::types::{ChannelOutcome, InboundSubmission};

use crate::error::RelayError;
use crate::pipeline::Processed;
use crate::state::AppState;

pub async fn health() -> &'static str {
  "ok"
}

/// Caller-facing outcome. A spam-suppressed submission serializes to exactly
/// this shape with `status: "received"`: same code, same keys as a genuine
/// success.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  pub status: &'static str,
  pub duplicate: bool,
  pub channels: Vec<ChannelOutcome>,
}

impl SubmitResponse {
  pub fn from_processed(processed: Processed) -> Self {
    Self {
      status: "received",
      duplicate: processed.duplicate,
      channels: processed.outcomes,
    }
  }
}

pub async fn submit(
  State(state): State<Arc<AppState>>,
  ConnectInfo(addr): ConnectInfo<SocketAddr>,
  Json(payload): Json<InboundSubmission>,
) -> Result<Json<SubmitResponse>, RelayError> {
  let now = Utc::now();

  // Rate check comes before everything, keyed by peer address.
  let client_key = addr.ip().to_string();
  if !state.allow(&client_key, now) {
    return Err(RelayError::RateLimited);
  }

  let processed = state.pipeline.process(&payload, now).await?;
  Ok(Json(SubmitResponse::from_processed(processed)))
}
