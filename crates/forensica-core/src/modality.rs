//! Modality: the closed set of content categories the engine can score.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// The category of content being evaluated.
///
/// The lowercase variant name is both the wire name and the value stored in
/// the `modality` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Modality {
  Photo,
  Video,
  Text,
  Audio,
}

impl Modality {
  /// Parse a wire name. Matching is exact; `"Photo"` is not a modality.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::InvalidModality(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }

  /// Whether the content arrives as text rather than an uploaded file.
  pub fn is_textual(self) -> bool { matches!(self, Self::Text) }
}
