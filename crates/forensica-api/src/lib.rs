//! JSON/multipart HTTP API for Forensica.
//!
//! Exposes an axum [`Router`] backed by any
//! [`forensica_core::store::AnalysisStore`]. TLS, static assets and the
//! presentation layer are the caller's concern.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", forensica_api::api_router(store.clone(), limits))
//! ```

pub mod detect;
pub mod error;
pub mod feedback;
pub mod history;
pub mod stats;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use forensica_core::store::AnalysisStore;
use serde::{Deserialize, Serialize};

pub use detect::UploadLimits;
pub use error::ApiError;

/// State shared by every API handler.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub limits: UploadLimits,
}

// Manual impl: cloning the `Arc` must not require `S: Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      limits: self.limits,
    }
  }
}

/// Body returned by endpoints that only acknowledge success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
  pub success: bool,
}

impl Ack {
  pub const OK: Self = Self { success: true };
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, limits: UploadLimits) -> Router<()>
where
  S: AnalysisStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Scoring
    .route(
      "/detect",
      post(detect::handler::<S>).layer(DefaultBodyLimit::max(limits.body_limit())),
    )
    // Feedback
    .route("/feedback", post(feedback::handler::<S>))
    // History
    .route("/history", get(history::list::<S>))
    .route("/history/clear", post(history::clear::<S>))
    .route("/history/{id}", get(history::get_one::<S>))
    // Stats
    .route("/stats", get(stats::handler::<S>))
    .with_state(ApiState { store, limits })
}
