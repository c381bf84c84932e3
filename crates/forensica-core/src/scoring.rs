//! The scoring engine.
//!
//! There is no model here. Media verdicts are drawn from per-modality score
//! ranges selected by a random "complexity factor"; text verdicts come from a
//! shallow lexical check. Confidence grows with the number of samples the
//! store has already seen for the modality.
//!
//! The engine is pure apart from the injected random source, so callers
//! decide both the RNG and where the result is persisted.

use std::ops::RangeInclusive;

use bytes::Bytes;
use rand::Rng;
use serde::Serialize;

use crate::{
  analysis::{NewAnalysis, Score, Source},
  modality::Modality,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Words that, when two or more appear, push text into the synthetic range.
pub const AI_TELL_KEYWORDS: [&str; 6] = [
  "delve",
  "comprehensive",
  "tapestry",
  "testament",
  "pivotal",
  "vibrant",
];

/// Trimmed text shorter than this many characters is scored as synthetic.
///
/// Length is counted in Unicode scalar values, not UTF-16 code units, so a
/// character outside the Basic Multilingual Plane (most emoji) counts once.
pub const MIN_TEXT_CHARS: usize = 20;

/// Number of distinct keyword hits that forces the synthetic range.
pub const KEYWORD_HITS_FOR_SYNTHETIC: usize = 2;

pub const TEXT_HUMAN_RANGE: RangeInclusive<u8> = 55..=94;
pub const TEXT_SYNTHETIC_RANGE: RangeInclusive<u8> = 10..=29;

const CONFIDENCE_BASE: f64 = 0.80;
const EXPERIENCE_SAMPLES: f64 = 1000.0;
const EXPERIENCE_CAP: f64 = 0.15;
const CONFIDENCE_JITTER: f64 = 0.05;
/// Highest confidence ever reported; the engine never claims certainty.
pub const CONFIDENCE_CEILING: f64 = 0.99;

// ─── Media profiles ──────────────────────────────────────────────────────────

/// Score sampling parameters for a binary (non-text) modality.
#[derive(Debug, Clone)]
pub struct MediaProfile {
  /// A complexity factor strictly above this selects the human range.
  pub threshold: f64,
  pub human:     RangeInclusive<u8>,
  pub synthetic: RangeInclusive<u8>,
}

pub const PHOTO_PROFILE: MediaProfile = MediaProfile {
  threshold: 0.40,
  human:     65..=94,
  synthetic: 10..=39,
};

pub const VIDEO_PROFILE: MediaProfile = MediaProfile {
  threshold: 0.50,
  human:     70..=94,
  synthetic: 15..=39,
};

pub const AUDIO_PROFILE: MediaProfile = MediaProfile {
  threshold: 0.45,
  human:     60..=94,
  synthetic: 5..=39,
};

impl MediaProfile {
  /// The profile for `modality`, or `None` for text.
  pub fn for_modality(modality: Modality) -> Option<&'static Self> {
    match modality {
      Modality::Photo => Some(&PHOTO_PROFILE),
      Modality::Video => Some(&VIDEO_PROFILE),
      Modality::Audio => Some(&AUDIO_PROFILE),
      Modality::Text => None,
    }
  }

  /// The score range selected by a complexity factor in `[0, 1)`.
  pub fn range_for(&self, complexity: f64) -> &RangeInclusive<u8> {
    if complexity > self.threshold {
      &self.human
    } else {
      &self.synthetic
    }
  }
}

// ─── Input / output ──────────────────────────────────────────────────────────

/// Content handed to the engine. Blobs are never inspected.
#[derive(Debug, Clone)]
pub enum Payload {
  Text(String),
  Blob(Bytes),
}

impl Payload {
  pub fn text(&self) -> Option<&str> {
    match self {
      Self::Text(t) => Some(t),
      Self::Blob(_) => None,
    }
  }

  /// Size in bytes.
  pub fn len(&self) -> usize {
    match self {
      Self::Text(t) => t.len(),
      Self::Blob(b) => b.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// One named sub-score shown alongside the overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
  pub label: &'static str,
  pub value: f64,
}

impl BreakdownEntry {
  fn new(label: &'static str, value: f64) -> Self { Self { label, value } }
}

/// Everything the engine produces for one piece of content.
#[derive(Debug, Clone)]
pub struct ScoreResult {
  pub modality:      Modality,
  pub score:         Score,
  pub source:        Source,
  pub justification: String,
  pub breakdown:     Vec<BreakdownEntry>,
  pub confidence:    f64,
}

impl ScoreResult {
  /// The persistable part of the result. The breakdown is not stored.
  pub fn to_new_analysis(&self) -> NewAnalysis {
    NewAnalysis::new(
      self.modality,
      self.score,
      self.confidence,
      self.justification.clone(),
    )
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Score `payload` as content of the given `modality`.
///
/// `historical_count` is the number of analyses already recorded for the
/// modality. A text modality given a blob payload is scored as empty text.
pub fn score<R: Rng + ?Sized>(
  modality: Modality,
  payload: &Payload,
  historical_count: u64,
  rng: &mut R,
) -> ScoreResult {
  let score = match MediaProfile::for_modality(modality) {
    Some(profile) => sample_media_score(profile, rng),
    None => sample_text_score(payload.text().unwrap_or_default(), rng),
  };
  let source = score.source();
  let human = source == Source::Human;

  let justification = justification(modality, human, historical_count);
  let breakdown = breakdown(modality, human, rng);
  let confidence = confidence(historical_count, rng);

  ScoreResult {
    modality,
    score,
    source,
    justification,
    breakdown,
    confidence,
  }
}

fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 { rng.gen_range(0.0..1.0) }

fn sample_media_score<R: Rng + ?Sized>(
  profile: &MediaProfile,
  rng: &mut R,
) -> Score {
  let complexity = unit(rng);
  let range = profile.range_for(complexity).clone();
  Score::saturating(rng.gen_range(range))
}

/// Whether `text` trips the lexical synthetic-content heuristic.
pub fn looks_synthetic(text: &str) -> bool {
  let trimmed = text.trim();
  if trimmed.chars().count() < MIN_TEXT_CHARS {
    return true;
  }
  let lower = trimmed.to_lowercase();
  let hits = AI_TELL_KEYWORDS
    .iter()
    .filter(|k| lower.contains(*k))
    .count();
  hits >= KEYWORD_HITS_FOR_SYNTHETIC
}

fn sample_text_score<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Score {
  let range = if looks_synthetic(text) {
    TEXT_SYNTHETIC_RANGE
  } else {
    TEXT_HUMAN_RANGE
  };
  Score::saturating(rng.gen_range(range))
}

fn justification(modality: Modality, human: bool, historical_count: u64) -> String {
  match (modality, human) {
    (Modality::Photo, true) => format!(
      "High-frequency noise analysis confirms organic sensor patterns. \
       Cross-referenced with {historical_count} historical samples."
    ),
    (Modality::Photo, false) => "GAN-specific artifacts detected in shadow gradients. \
       Metadata inconsistencies suggest synthetic origin."
      .to_owned(),
    (Modality::Video, true) => "Temporal coherence verified across 240 frames. \
       Biometric pulse detection aligns with human physiology."
      .to_owned(),
    (Modality::Video, false) => "Deepfake artifacts detected in facial landmark transitions. \
       Background temporal jitter indicates frame synthesis."
      .to_owned(),
    (Modality::Text, true) => "Stylometric variance and idiosyncratic syntax patterns \
       indicate human authorship. Natural linguistic flow detected."
      .to_owned(),
    (Modality::Text, false) => "Predictive text patterns and uniform sentence structure \
       suggest LLM generation. High perplexity score detected."
      .to_owned(),
    (Modality::Audio, true) => "Phase-coherent spectral analysis confirms organic vocal \
       cords resonance. Micro-tremors match human speech patterns."
      .to_owned(),
    (Modality::Audio, false) => "Neural vocoder signatures detected in high-frequency \
       bands. Phase inconsistencies found in consonant transitions."
      .to_owned(),
  }
}

fn breakdown<R: Rng + ?Sized>(
  modality: Modality,
  human: bool,
  rng: &mut R,
) -> Vec<BreakdownEntry> {
  let pick = |h: f64, s: f64| if human { h } else { s };
  match modality {
    Modality::Photo => {
      let noise = if human { 85.0 + unit(rng) * 10.0 } else { 15.0 + unit(rng) * 20.0 };
      let edge = if human { 78.0 + unit(rng) * 15.0 } else { 22.0 + unit(rng) * 15.0 };
      vec![
        BreakdownEntry::new("Noise Pattern Consistency", noise),
        BreakdownEntry::new("Edge Gradient Analysis", edge),
        BreakdownEntry::new("Metadata Integrity", pick(95.0, 40.0)),
      ]
    }
    Modality::Video => vec![
      BreakdownEntry::new("Temporal Coherence", pick(92.0, 28.0)),
      BreakdownEntry::new("Facial Landmark Stability", pick(88.0, 35.0)),
      BreakdownEntry::new("Biometric Alignment", pick(94.0, 12.0)),
    ],
    Modality::Text => vec![
      BreakdownEntry::new("Perplexity Score", pick(75.0, 92.0)),
      BreakdownEntry::new("Burstiness Index", pick(82.0, 14.0)),
      BreakdownEntry::new("Semantic Uniformity", pick(25.0, 88.0)),
    ],
    Modality::Audio => vec![
      BreakdownEntry::new("Spectral Resonance", pick(91.0, 18.0)),
      BreakdownEntry::new("Phase Coherence", pick(85.0, 42.0)),
      BreakdownEntry::new("Harmonic Integrity", pick(89.0, 25.0)),
    ],
  }
}

/// Confidence for a modality that has `historical_count` prior samples.
///
/// Rounded to two decimals and capped at [`CONFIDENCE_CEILING`].
pub fn confidence<R: Rng + ?Sized>(historical_count: u64, rng: &mut R) -> f64 {
  let experience = (historical_count as f64 / EXPERIENCE_SAMPLES).min(EXPERIENCE_CAP);
  let raw = CONFIDENCE_BASE + experience + unit(rng) * CONFIDENCE_JITTER;
  ((raw * 100.0).round() / 100.0).min(CONFIDENCE_CEILING)
}
