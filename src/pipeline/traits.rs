use crate::alignment::request::PreparedRequest;
use crate::error::AlignerError;
use crate::pipeline::cancel::CancellationToken;
use crate::types::{AlignmentSegment, AudioSource};

/// Language-dependent text normalization applied to every unit.
///
/// Must be a pure function of its inputs; an empty result marks the unit
/// as not alignable.
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str, language: &str) -> String;
}

impl<F> TextNormalizer for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn normalize(&self, text: &str, language: &str) -> String {
        self(text, language)
    }
}

/// External forced-alignment capability.
///
/// Implementations return exactly one segment per `request.units()` entry,
/// in the same order, and should poll `cancel` during long work.
pub trait Aligner: Send + Sync {
    fn name(&self) -> &str;

    fn align(
        &self,
        audio: &AudioSource,
        request: &PreparedRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<AlignmentSegment>, AlignerError>;
}
