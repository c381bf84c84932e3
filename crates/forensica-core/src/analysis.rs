//! Analysis types: one scored evaluation of a content item.
//!
//! An analysis is written once and never updated. The only way to remove one
//! is a bulk clear of the whole store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, modality::Modality};

// ─── Score ───────────────────────────────────────────────────────────────────

/// An authenticity score in `0..=100`; higher means more likely human-made.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
  pub const MAX: u8 = 100;

  pub fn new(value: u8) -> Result<Self> {
    if value > Self::MAX {
      return Err(Error::ScoreOutOfRange(value.into()));
    }
    Ok(Self(value))
  }

  /// Saturate at [`Score::MAX`]; used where the value comes from a bounded
  /// sampler.
  pub(crate) fn saturating(value: u8) -> Self { Self(value.min(Self::MAX)) }

  pub fn value(self) -> u8 { self.0 }

  /// The verdict implied by this score. Strictly greater than 50 is human.
  pub fn source(self) -> Source {
    if self.0 > 50 { Source::Human } else { Source::Ai }
  }
}

impl TryFrom<i64> for Score {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    u8::try_from(value)
      .map_err(|_| Error::ScoreOutOfRange(value))
      .and_then(Self::new)
  }
}

impl From<Score> for u8 {
  fn from(score: Score) -> Self { score.0 }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// Who the engine believes produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
  #[serde(rename = "HUMAN")]
  Human,
  #[serde(rename = "AI")]
  Ai,
}

impl Source {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Human => "HUMAN",
      Self::Ai => "AI",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "HUMAN" => Ok(Self::Human),
      "AI" => Ok(Self::Ai),
      other => Err(Error::UnknownSource(other.to_owned())),
    }
  }
}

// ─── Analysis ────────────────────────────────────────────────────────────────

/// A persisted analysis. No field changes after the store returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
  /// Store-assigned; strictly increasing and never reused.
  pub id:            i64,
  pub modality:      Modality,
  pub source:        Source,
  pub score:         Score,
  pub confidence:    f64,
  pub justification: String,
  /// Store-assigned insert time.
  pub created_at:    DateTime<Utc>,
}

// ─── NewAnalysis ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::AnalysisStore::insert_analysis`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
  pub modality:      Modality,
  pub source:        Source,
  pub score:         Score,
  pub confidence:    f64,
  pub justification: String,
}

impl NewAnalysis {
  /// Build an analysis whose verdict is derived from `score`.
  pub fn new(
    modality: Modality,
    score: Score,
    confidence: f64,
    justification: impl Into<String>,
  ) -> Self {
    Self {
      modality,
      source: score.source(),
      score,
      confidence,
      justification: justification.into(),
    }
  }
}
