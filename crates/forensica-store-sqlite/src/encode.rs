//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexical order on `created_at` is chronological order.
//! Modality and source use their wire names.

use chrono::{DateTime, SecondsFormat, Utc};
use forensica_core::{
  analysis::{Analysis, Score, Source},
  modality::Modality,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

/// SQLite hands back `COUNT(*)` and `SUM(..)` as signed integers.
pub fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::Decode(format!("negative count: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `analyses` row.
pub struct RawAnalysis {
  pub id:            i64,
  pub modality:      String,
  pub source:        String,
  pub score:         i64,
  pub confidence:    f64,
  pub justification: String,
  pub created_at:    String,
}

/// Column list matching the field order [`RawAnalysis::from_row`] expects.
pub const ANALYSIS_COLUMNS: &str =
  "id, modality, source, score, confidence, justification, created_at";

impl RawAnalysis {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      modality:      row.get(1)?,
      source:        row.get(2)?,
      score:         row.get(3)?,
      confidence:    row.get(4)?,
      justification: row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_analysis(self) -> Result<Analysis> {
    let score = Score::try_from(self.score)?;
    let source = Source::parse(&self.source)?;
    if source != score.source() {
      return Err(Error::Decode(format!(
        "analysis {} has source {} but score {}",
        self.id,
        source.as_str(),
        score.value()
      )));
    }

    Ok(Analysis {
      id: self.id,
      modality: Modality::parse(&self.modality)?,
      source,
      score,
      confidence: self.confidence,
      justification: self.justification,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
