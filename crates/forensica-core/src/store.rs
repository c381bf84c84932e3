//! The `AnalysisStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `forensica-store-sqlite`). The request boundary depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  analysis::{Analysis, NewAnalysis},
  feedback::{Feedback, NewFeedback},
  modality::Modality,
  stats::StoreSnapshot,
};

/// Abstraction over the analysis and feedback collections.
///
/// Implementations must serialize mutating calls relative to each other so
/// that identifiers stay strictly increasing and [`AnalysisStore::clear_all`]
/// is never observed half-done. Reads only need a consistent snapshot.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AnalysisStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Analyses ──────────────────────────────────────────────────────────

  /// Persist an analysis, assigning its identifier and creation time.
  fn insert_analysis(
    &self,
    input: NewAnalysis,
  ) -> impl Future<Output = Result<Analysis, Self::Error>> + Send + '_;

  /// Retrieve one analysis. Returns `None` if it does not exist (or was
  /// cleared).
  fn get_analysis(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Analysis>, Self::Error>> + Send + '_;

  /// Up to `limit` analyses, newest first. Ties on creation time are broken
  /// by identifier, descending.
  fn list_recent(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Analysis>, Self::Error>> + Send + '_;

  /// Number of stored analyses of `modality`.
  fn count_by_modality(
    &self,
    modality: Modality,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Feedback ──────────────────────────────────────────────────────────

  /// Persist a feedback record. The referenced analysis is not checked.
  fn insert_feedback(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  // ── Whole-store operations ────────────────────────────────────────────

  /// Empty both collections atomically. Identifiers are not reused
  /// afterwards.
  fn clear_all(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Total analyses and feedback tally, read together.
  fn snapshot(
    &self,
  ) -> impl Future<Output = Result<StoreSnapshot, Self::Error>> + Send + '_;
}
