//! Handler for `POST /feedback`.
//!
//! Body: `{"analysisId": 1, "rating": 5, "isCorrect": true}`. All three
//! fields are required. The rating is stored as given and the referenced
//! analysis is not looked up.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use forensica_core::{feedback::NewFeedback, store::AnalysisStore};
use serde::Deserialize;

use crate::{Ack, ApiState, error::ApiError};

const FAILURE: &str = "Failed to submit feedback";

/// JSON body accepted by `POST /feedback`. Fields are optional here so that a
/// missing one produces a named validation error rather than a generic
/// deserialisation failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBody {
  pub analysis_id: Option<i64>,
  pub rating:      Option<i64>,
  pub is_correct:  Option<bool>,
}

impl TryFrom<FeedbackBody> for NewFeedback {
  type Error = ApiError;

  fn try_from(b: FeedbackBody) -> Result<Self, ApiError> {
    let missing = |field: &str| ApiError::Validation(format!("{field} is required"));
    Ok(NewFeedback {
      analysis_id: b.analysis_id.ok_or_else(|| missing("analysisId"))?,
      rating:      b.rating.ok_or_else(|| missing("rating"))?,
      is_correct:  b.is_correct.ok_or_else(|| missing("isCorrect"))?,
    })
  }
}

/// `POST /feedback`: returns `{"success": true}`.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<FeedbackBody>, JsonRejection>,
) -> Result<Json<Ack>, ApiError>
where
  S: AnalysisStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
  let input = NewFeedback::try_from(body)?;

  let feedback = state
    .store
    .insert_feedback(input)
    .await
    .map_err(ApiError::store(FAILURE))?;

  tracing::info!(
    id = feedback.id,
    analysis_id = feedback.analysis_id,
    rating = feedback.rating,
    is_correct = feedback.is_correct,
    "feedback recorded"
  );

  Ok(Json(Ack::OK))
}
