//! System-wide statistics derived from store contents.
//!
//! Nothing here is stored. Every stats request reads a fresh
//! [`StoreSnapshot`] and recomputes.

use serde::{Deserialize, Serialize};

use crate::feedback::FeedbackTally;

/// Accuracy reported before any feedback exists.
pub const DEFAULT_ACCURACY: f64 = 85.0;

/// Sample volume at which the volume term reaches its full weight.
pub const VOLUME_NORMALIZER: f64 = 500.0;
pub const VOLUME_WEIGHT: f64 = 40.0;
pub const ACCURACY_WEIGHT: f64 = 60.0;
pub const MAX_PROGRESS: f64 = 100.0;

/// Counts read from the store in one consistent pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
  pub total_analyses: u64,
  pub feedback:       FeedbackTally,
}

/// The derived metrics served by `GET /api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
  pub total_attempts:    u64,
  pub average_accuracy:  u32,
  pub learning_progress: u32,
}

impl SystemStats {
  pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
    let accuracy = accuracy(snapshot.feedback);
    Self {
      total_attempts:    snapshot.total_analyses,
      average_accuracy:  accuracy.round() as u32,
      learning_progress: learning_progress(snapshot.total_analyses, accuracy)
        .round() as u32,
    }
  }
}

/// Percentage of feedback marked correct, or [`DEFAULT_ACCURACY`] when there
/// is no feedback. Unrounded.
pub fn accuracy(tally: FeedbackTally) -> f64 {
  if tally.total == 0 {
    return DEFAULT_ACCURACY;
  }
  tally.correct as f64 / tally.total as f64 * 100.0
}

/// Volume contributes up to 40 points, accuracy up to 60; the sum is capped
/// at 100. Unrounded.
pub fn learning_progress(total_attempts: u64, accuracy: f64) -> f64 {
  let volume = total_attempts as f64 / VOLUME_NORMALIZER * VOLUME_WEIGHT;
  let quality = accuracy / 100.0 * ACCURACY_WEIGHT;
  (volume + quality).min(MAX_PROGRESS)
}
