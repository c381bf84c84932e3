//! [`SqliteStore`], the SQLite implementation of [`AnalysisStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use forensica_core::{
  analysis::{Analysis, NewAnalysis},
  feedback::{Feedback, FeedbackTally, NewFeedback},
  modality::Modality,
  stats::StoreSnapshot,
  store::AnalysisStore,
};

use crate::{
  Result,
  encode::{ANALYSIS_COLUMNS, RawAnalysis, decode_count, decode_dt, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An analysis store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every clone
/// talks to the same connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Checkpoint the WAL into the main database file and close the
  /// connection. Other clones of this store fail after this returns.
  pub async fn close(self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    self.conn.close().await?;
    Ok(())
  }
}

// ─── AnalysisStore impl ──────────────────────────────────────────────────────

impl AnalysisStore for SqliteStore {
  type Error = crate::Error;

  // ── Analyses ──────────────────────────────────────────────────────────────

  async fn insert_analysis(&self, input: NewAnalysis) -> Result<Analysis> {
    let NewAnalysis {
      modality,
      source,
      score,
      confidence,
      justification,
    } = input;
    let modality_str = modality.as_str();
    let source_str   = source.as_str();
    let score_val    = i64::from(score.value());

    // The timestamp is taken on the connection thread so that insert order,
    // id order and timestamp order agree.
    let (id, justification, created_at_str): (i64, String, String) = self
      .conn
      .call(move |conn| {
        let created_at_str = encode_dt(Utc::now());
        conn.execute(
          "INSERT INTO analyses (
             modality, source, score, confidence, justification, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            modality_str,
            source_str,
            score_val,
            confidence,
            justification,
            created_at_str,
          ],
        )?;
        Ok((conn.last_insert_rowid(), justification, created_at_str))
      })
      .await?;

    Ok(Analysis {
      id,
      modality,
      source,
      score,
      confidence,
      justification,
      created_at: decode_dt(&created_at_str)?,
    })
  }

  async fn get_analysis(&self, id: i64) -> Result<Option<Analysis>> {
    let raw: Option<RawAnalysis> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id = ?1"),
              rusqlite::params![id],
              RawAnalysis::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnalysis::into_analysis).transpose()
  }

  async fn list_recent(&self, limit: usize) -> Result<Vec<Analysis>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawAnalysis> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANALYSIS_COLUMNS}
           FROM analyses
           ORDER BY created_at DESC, id DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawAnalysis::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnalysis::into_analysis).collect()
  }

  async fn count_by_modality(&self, modality: Modality) -> Result<u64> {
    let modality_str = modality.as_str();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM analyses WHERE modality = ?1",
          rusqlite::params![modality_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    decode_count(count)
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn insert_feedback(&self, input: NewFeedback) -> Result<Feedback> {
    let NewFeedback {
      analysis_id,
      rating,
      is_correct,
    } = input;

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feedback (analysis_id, rating, is_correct) VALUES (?1, ?2, ?3)",
          rusqlite::params![analysis_id, rating, is_correct],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Feedback {
      id,
      analysis_id,
      rating,
      is_correct,
    })
  }

  // ── Whole-store operations ────────────────────────────────────────────────

  async fn clear_all(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM feedback", [])?;
        tx.execute("DELETE FROM analyses", [])?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn snapshot(&self) -> Result<StoreSnapshot> {
    let (total, fb_total, fb_correct): (i64, i64, i64) = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let total: i64 =
          tx.query_row("SELECT COUNT(*) FROM analyses", [], |r| r.get(0))?;
        let (fb_total, fb_correct): (i64, i64) = tx.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM(CASE WHEN is_correct = 1 THEN 1 ELSE 0 END), 0)
           FROM feedback",
          [],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        tx.commit()?;
        Ok((total, fb_total, fb_correct))
      })
      .await?;

    Ok(StoreSnapshot {
      total_analyses: decode_count(total)?,
      feedback:       FeedbackTally {
        total:   decode_count(fb_total)?,
        correct: decode_count(fb_correct)?,
      },
    })
  }
}
