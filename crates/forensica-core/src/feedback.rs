//! Feedback: a user's correctness judgment on one analysis.
//!
//! `analysis_id` is a plain back-reference. The store does not check that the
//! analysis exists, and an analysis may collect any number of feedback rows.

use serde::{Deserialize, Serialize};

/// A persisted feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
  pub id:          i64,
  pub analysis_id: i64,
  /// Star rating; conventionally 1–5 but not range-checked.
  pub rating:      i64,
  pub is_correct:  bool,
}

/// Input to [`crate::store::AnalysisStore::insert_feedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewFeedback {
  pub analysis_id: i64,
  pub rating:      i64,
  pub is_correct:  bool,
}

/// Aggregate counts over every feedback record in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackTally {
  pub total:   u64,
  pub correct: u64,
}
