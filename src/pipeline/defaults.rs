use std::path::{Path, PathBuf};

use crate::alignment::request::PreparedRequest;
use crate::error::{AlignerError, AlignmentError};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::traits::{Aligner, TextNormalizer};
use crate::types::{AlignmentSegment, AudioSource};

/// Lowercases and strips punctuation around and inside words, keeping
/// letters, digits, apostrophes and hyphens.
pub struct DefaultNormalizer;

impl TextNormalizer for DefaultNormalizer {
    fn normalize(&self, text: &str, _language: &str) -> String {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric() || is_word_joiner(*c))
                    .collect::<String>()
                    .trim_matches(is_word_joiner)
                    .to_lowercase()
            })
            .filter(|word| !word.is_empty())
            .collect();
        words.join(" ")
    }
}

fn is_word_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

/// Replays segments recorded from an earlier aligner run.
///
/// The audio source is not read; the segment list must have been produced
/// for the same document.
pub struct SegmentFileAligner {
    segments: Vec<AlignmentSegment>,
    origin: PathBuf,
}

impl SegmentFileAligner {
    pub fn new(segments: Vec<AlignmentSegment>) -> Self {
        Self {
            segments,
            origin: PathBuf::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read segments", e))?;
        let segments: Vec<AlignmentSegment> =
            serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse segments", e))?;
        Ok(Self {
            segments,
            origin: path.to_path_buf(),
        })
    }
}

impl Aligner for SegmentFileAligner {
    fn name(&self) -> &str {
        "segment-file"
    }

    fn align(
        &self,
        _audio: &AudioSource,
        request: &PreparedRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<AlignmentSegment>, AlignerError> {
        if cancel.is_cancelled() {
            return Err(AlignerError::Cancelled);
        }
        tracing::debug!(
            origin = %self.origin.display(),
            recorded = self.segments.len(),
            requested = request.len(),
            "segment-file aligner: replaying recorded segments"
        );
        Ok(self.segments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlignConfig, Granularity};
    use crate::document::TreePath;
    use crate::types::{Token, TokenSequence};

    #[test]
    fn default_normalizer_lowercases_and_strips_punctuation() {
        let n = DefaultNormalizer;
        assert_eq!(n.normalize("Hello,", "eng"), "hello");
        assert_eq!(n.normalize("\u{ab}\u{a0}Qu'est-ce\u{a0}\u{bb}", "fra"), "qu'est-ce");
        assert_eq!(n.normalize("l\u{2019}ami.", "fra"), "l\u{2019}ami");
        assert_eq!(n.normalize("Élan  VITAL!", "fra"), "élan vital");
        assert_eq!(n.normalize("--", "eng"), "");
        assert_eq!(n.normalize("...", "eng"), "");
        assert_eq!(n.normalize("", "eng"), "");
    }

    fn one_unit_request() -> PreparedRequest {
        let tokens = TokenSequence {
            tokens: vec![Token {
                id: "w0".to_string(),
                text: "a".to_string(),
                position: TreePath(vec![0]),
            }],
        };
        PreparedRequest::build(&tokens, &AlignConfig::new("eng", Granularity::Word))
            .expect("valid request")
    }

    #[test]
    fn segment_file_aligner_replays_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("segments.json");
        std::fs::write(&path, r#"[{"start_ms": 0, "end_ms": 120, "id": "w0"}]"#)
            .expect("write segments");
        let aligner = SegmentFileAligner::load(&path).expect("load segments");
        let out = aligner
            .align(
                &AudioSource::Path(PathBuf::from("unused.wav")),
                &one_unit_request(),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.as_deref(), Some("w0"));
    }

    #[test]
    fn segment_file_aligner_reports_bad_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("segments.json");
        std::fs::write(&path, "{not json").expect("write segments");
        assert!(matches!(
            SegmentFileAligner::load(&path),
            Err(AlignmentError::Json { .. })
        ));
        assert!(matches!(
            SegmentFileAligner::load(&dir.path().join("missing.json")),
            Err(AlignmentError::Io { .. })
        ));
    }

    #[test]
    fn segment_file_aligner_honours_cancellation() {
        let aligner = SegmentFileAligner::new(vec![AlignmentSegment::new(0, 10)]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = aligner.align(
            &AudioSource::Path(PathBuf::from("unused.wav")),
            &one_unit_request(),
            &cancel,
        );
        assert!(matches!(result, Err(AlignerError::Cancelled)));
    }
}
