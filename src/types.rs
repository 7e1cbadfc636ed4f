use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::TreePath;

/// Audio handed to the aligner untouched; decoding is the aligner's job.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    Path(PathBuf),
    Samples { sample_rate_hz: u32, samples: Vec<f32> },
}

impl AudioSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Samples {
                sample_rate_hz,
                samples,
            } => format!("{} samples @ {sample_rate_hz} Hz", samples.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: String,
    /// Unit text after trimming and normalization. Never empty.
    pub text: String,
    pub position: TreePath,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence {
    pub tokens: Vec<Token>,
}

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.id.as_str())
    }
}

/// One timed segment as reported by an aligner.
///
/// Millisecond interval is [start_ms, end_ms). A zero-length segment is the
/// "no confident alignment" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSegment {
    /// Identifier echoed back by the aligner, when its protocol does so.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl AlignmentSegment {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self {
            id: None,
            start_ms,
            end_ms,
        }
    }

    pub fn unaligned() -> Self {
        Self::new(0, 0)
    }

    pub fn is_unaligned(&self) -> bool {
        self.start_ms == self.end_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl TimeRange {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Resolved timing of an alignable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Timed(TimeRange),
    Unaligned,
}

impl Alignment {
    pub fn range(&self) -> Option<TimeRange> {
        match self {
            Self::Timed(range) => Some(*range),
            Self::Unaligned => None,
        }
    }
}

/// Flat per-unit result, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordTiming {
    pub id: String,
    pub text: String,
    /// `None` for units the aligner could not place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<u64>,
}

/// Format milliseconds as seconds with millisecond precision (`1.250`).
pub fn format_seconds(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}
