//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Client errors carry a message meant for the caller. Store errors carry a
//! fixed, per-endpoint message; the underlying cause is logged and never
//! sent over the wire.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Modality is required")]
  MissingModality,

  #[error("Invalid modality")]
  InvalidModality(String),

  #[error("{0}")]
  Validation(String),

  #[error("payload exceeds {limit} bytes")]
  PayloadTooLarge { limit: usize },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("{message}")]
  Store {
    message: &'static str,
    #[source]
    source:  BoxError,
  },
}

impl ApiError {
  /// Adapter for `map_err` that wraps a store failure under `message`.
  pub fn store<E>(message: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Store {
      message,
      source: Box::new(e),
    }
  }
}

impl From<forensica_core::Error> for ApiError {
  fn from(e: forensica_core::Error) -> Self {
    match e {
      forensica_core::Error::InvalidModality(m) => Self::InvalidModality(m),
      other => Self::Validation(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::MissingModality
      | ApiError::InvalidModality(_)
      | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match &self {
      ApiError::Store { message, source } => {
        tracing::error!(error = %source, "{message}");
      }
      ApiError::InvalidModality(m) => {
        tracing::debug!(modality = %m, "rejected request: invalid modality");
      }
      other => tracing::debug!("rejected request: {other}"),
    }

    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
