//! Handler for `POST /detect`.
//!
//! Accepts `multipart/form-data` with these fields:
//!
//! | Field | Notes |
//! |-------|-------|
//! | `modality` | `photo`, `video`, `text` or `audio`; required |
//! | `textContent` | required when `modality` is `text` |
//! | `file` | required for every other modality; never decoded |
//!
//! Unknown fields are ignored. Validation happens before the store is
//! touched, so a rejected request leaves no trace.

use axum::{
  Json,
  extract::{
    Multipart, State,
    multipart::{MultipartError, MultipartRejection},
  },
  http::StatusCode,
};
use bytes::{Bytes, BytesMut};
use forensica_core::{
  analysis::{Analysis, Score, Source},
  modality::Modality,
  scoring::{self, BreakdownEntry, Payload},
  store::AnalysisStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

const FAILURE: &str = "Internal analysis system error";

/// Extra body allowance for multipart boundaries and the small text fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// ─── Limits ──────────────────────────────────────────────────────────────────

/// Size limits applied to `/detect` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
  /// Largest accepted `file` field.
  pub max_upload_bytes: usize,
  /// Largest accepted `textContent` field.
  pub max_text_bytes:   usize,
}

impl Default for UploadLimits {
  fn default() -> Self {
    Self {
      max_upload_bytes: 500 * 1024 * 1024,
      max_text_bytes:   50 * 1024 * 1024,
    }
  }
}

impl UploadLimits {
  /// Whole-request body limit for the route.
  pub fn body_limit(&self) -> usize {
    self
      .max_upload_bytes
      .max(self.max_text_bytes)
      .saturating_add(MULTIPART_OVERHEAD)
  }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// The raw multipart fields, before validation.
#[derive(Debug, Default)]
pub struct DetectForm {
  pub modality:     Option<String>,
  pub text_content: Option<String>,
  pub file:         Option<Bytes>,
}

impl DetectForm {
  /// Drain `multipart`, enforcing `limits` while reading so an oversized
  /// upload is rejected without buffering all of it.
  pub async fn read(
    mut multipart: Multipart,
    limits: &UploadLimits,
  ) -> Result<Self, ApiError> {
    let mut form = Self::default();
    let to_api = multipart_error(limits);

    while let Some(mut field) = multipart.next_field().await.map_err(&to_api)? {
      let limit = match field.name() {
        Some("modality") => MULTIPART_OVERHEAD,
        Some("textContent") => limits.max_text_bytes,
        Some("file") => limits.max_upload_bytes,
        _ => continue,
      };
      let name = field.name().unwrap_or_default().to_owned();

      let mut buf = BytesMut::new();
      while let Some(chunk) = field.chunk().await.map_err(&to_api)? {
        if buf.len() + chunk.len() > limit {
          return Err(ApiError::PayloadTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
      }
      let bytes = buf.freeze();

      match name.as_str() {
        "file" => form.file = Some(bytes),
        other => {
          let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
            ApiError::Validation(format!("{other} must be UTF-8 text"))
          })?;
          if other == "modality" {
            form.modality = Some(text);
          } else {
            form.text_content = Some(text);
          }
        }
      }
    }

    Ok(form)
  }

  /// Check presence, membership and size; produce what the engine needs.
  pub fn validate(
    self,
    limits: &UploadLimits,
  ) -> Result<(Modality, Payload), ApiError> {
    let raw = self
      .modality
      .filter(|m| !m.is_empty())
      .ok_or(ApiError::MissingModality)?;
    let modality = Modality::parse(&raw)?;

    let payload = if modality.is_textual() {
      let text = self.text_content.ok_or_else(|| {
        ApiError::Validation("textContent is required for text analysis".into())
      })?;
      Payload::Text(text)
    } else {
      let file = self.file.ok_or_else(|| {
        ApiError::Validation(format!("file is required for {modality} analysis"))
      })?;
      Payload::Blob(file)
    };

    let limit = match payload {
      Payload::Text(_) => limits.max_text_bytes,
      Payload::Blob(_) => limits.max_upload_bytes,
    };
    if payload.len() > limit {
      return Err(ApiError::PayloadTooLarge { limit });
    }

    Ok((modality, payload))
  }
}

fn multipart_error(limits: &UploadLimits) -> impl Fn(MultipartError) -> ApiError {
  let body_limit = limits.body_limit();
  move |e| {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
      // The route-level body limit fired before a field limit could.
      ApiError::PayloadTooLarge { limit: body_limit }
    } else {
      ApiError::Validation(e.body_text())
    }
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

/// JSON body returned on success.
#[derive(Debug, Clone, Serialize)]
pub struct DetectResponse {
  pub id:                i64,
  #[serde(rename = "type")]
  pub modality:          Modality,
  pub generation_source: Source,
  pub score:             Score,
  pub justification:     String,
  pub confidence:        f64,
  pub breakdown:         Vec<BreakdownEntry>,
}

impl DetectResponse {
  pub fn new(analysis: Analysis, breakdown: Vec<BreakdownEntry>) -> Self {
    Self {
      id: analysis.id,
      modality: analysis.modality,
      generation_source: analysis.source,
      score: analysis.score,
      justification: analysis.justification,
      confidence: analysis.confidence,
      breakdown,
    }
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /detect`: score the submitted content and record the analysis.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError>
where
  S: AnalysisStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let multipart = multipart.map_err(|e| ApiError::Validation(e.body_text()))?;
  let form = DetectForm::read(multipart, &state.limits).await?;
  let (modality, payload) = form.validate(&state.limits)?;

  let historical = state
    .store
    .count_by_modality(modality)
    .await
    .map_err(ApiError::store(FAILURE))?;

  let result =
    scoring::score(modality, &payload, historical, &mut rand::thread_rng());

  let analysis = state
    .store
    .insert_analysis(result.to_new_analysis())
    .await
    .map_err(ApiError::store(FAILURE))?;

  tracing::info!(
    id = analysis.id,
    %modality,
    score = analysis.score.value(),
    source = analysis.source.as_str(),
    confidence = analysis.confidence,
    bytes = payload.len(),
    "analysis recorded"
  );

  Ok(Json(DetectResponse::new(analysis, result.breakdown)))
}
