//! Handler for `GET /stats`.

use axum::{Json, extract::State};
use forensica_core::{stats::SystemStats, store::AnalysisStore};

use crate::{ApiState, error::ApiError};

/// `GET /stats`: recomputed from the store on every call.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<SystemStats>, ApiError>
where
  S: AnalysisStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let snapshot = state
    .store
    .snapshot()
    .await
    .map_err(ApiError::store("Failed to fetch stats"))?;
  Ok(Json(SystemStats::from_snapshot(&snapshot)))
}
