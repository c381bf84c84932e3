//! Handlers for `/history` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/history` | Newest first, at most [`HISTORY_LIMIT`] entries |
//! | `GET`  | `/history/{id}` | 404 if not found |
//! | `POST` | `/history/clear` | Removes every analysis and all feedback |

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use chrono::{DateTime, Utc};
use forensica_core::{
  analysis::{Analysis, Score, Source},
  modality::Modality,
  store::AnalysisStore,
};
use serde::{Deserialize, Serialize};

use crate::{Ack, ApiState, error::ApiError};

/// Maximum number of entries returned by `GET /history`.
pub const HISTORY_LIMIT: usize = 50;

/// One entry in the history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
  pub id:            i64,
  pub modality:      Modality,
  pub source:        Source,
  pub score:         Score,
  pub confidence:    f64,
  pub justification: String,
  pub timestamp:     DateTime<Utc>,
}

impl From<Analysis> for HistoryItem {
  fn from(a: Analysis) -> Self {
    Self {
      id:            a.id,
      modality:      a.modality,
      source:        a.source,
      score:         a.score,
      confidence:    a.confidence,
      justification: a.justification,
      timestamp:     a.created_at,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /history`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<HistoryItem>>, ApiError>
where
  S: AnalysisStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let analyses = state
    .store
    .list_recent(HISTORY_LIMIT)
    .await
    .map_err(ApiError::store("Failed to fetch history"))?;
  Ok(Json(analyses.into_iter().map(HistoryItem::from).collect()))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /history/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Json<HistoryItem>, ApiError>
where
  S: AnalysisStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(id) = id.map_err(|e| ApiError::Validation(e.body_text()))?;
  let analysis = state
    .store
    .get_analysis(id)
    .await
    .map_err(ApiError::store("Failed to fetch analysis"))?
    .ok_or_else(|| ApiError::NotFound(format!("analysis {id} not found")))?;
  Ok(Json(analysis.into()))
}

// ─── Clear ────────────────────────────────────────────────────────────────────

/// `POST /history/clear`
pub async fn clear<S>(State(state): State<ApiState<S>>) -> Result<Json<Ack>, ApiError>
where
  S: AnalysisStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .clear_all()
    .await
    .map_err(ApiError::store("Failed to clear history"))?;
  tracing::info!("history cleared");
  Ok(Json(Ack::OK))
}
