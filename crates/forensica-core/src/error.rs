//! Error types for `forensica-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid modality: {0:?}")]
  InvalidModality(String),

  #[error("score {0} is outside 0..=100")]
  ScoreOutOfRange(i64),

  #[error("unknown source verdict: {0:?}")]
  UnknownSource(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
