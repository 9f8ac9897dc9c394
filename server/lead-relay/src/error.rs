//! Relay error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use intake_engine::EngineError;

#[derive(Debug, Error)]
pub enum RelayError {
  /// Client input error (missing/invalid field). Descriptive; only
  /// legitimate traffic ever reaches validation.
  #[error("{0}")]
  Validation(#[from] EngineError),

  /// Uniform rejection; carries no detail about the client's standing.
  #[error("too many requests, please try again later")]
  RateLimited,

  /// Startup wiring failure; never reaches a caller in practice but still
  /// maps to a detail-free 500.
  #[error("configuration: {0}")]
  Config(String),
}

impl RelayError {
  fn status_code(&self) -> StatusCode {
    match self {
      Self::Validation(_) => StatusCode::BAD_REQUEST,
      Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
      Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for RelayError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    // Internal detail never reaches the caller.
    let message = match &self {
      Self::Config(_) => "internal error".to_string(),
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
