use crate::document::{Document, Node, Unit};
use crate::error::AlignmentError;
use crate::types::{Alignment, AlignmentSegment, TimeRange, TokenSequence, WordTiming};

/// Document whose alignable units all carry a timing or an unaligned marker.
///
/// Only [`index_alignment`] creates one, and it exposes no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedDocument {
    document: Document,
    timed: usize,
    unaligned: usize,
}

impl AlignedDocument {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn nodes(&self) -> &[Node] {
        self.document.nodes()
    }

    pub fn timed_count(&self) -> usize {
        self.timed
    }

    pub fn unaligned_count(&self) -> usize {
        self.unaligned
    }

    /// Alignable units in document order with their resolved timing.
    pub fn words(&self) -> Vec<WordTiming> {
        self.document
            .units()
            .into_iter()
            .filter_map(word_timing)
            .collect()
    }
}

fn word_timing(unit: &Unit) -> Option<WordTiming> {
    let alignment = unit.alignment()?;
    let range = alignment.range();
    Some(WordTiming {
        id: unit.id()?.to_string(),
        text: unit.normalized_text()?.to_string(),
        start_ms: range.map(|r| r.start_ms),
        end_ms: range.map(|r| r.end_ms),
    })
}

/// Attach aligner segments to the tokenized document, by position.
///
/// The reply must have one segment per token, timed segments must not
/// overlap in submission order, and echoed identifiers must match. Any
/// violation is fatal: nothing is written back on error.
pub fn index_alignment(
    mut document: Document,
    tokens: &TokenSequence,
    segments: Vec<AlignmentSegment>,
) -> Result<AlignedDocument, AlignmentError> {
    if segments.len() != tokens.len() {
        return Err(AlignmentError::AlignmentCountMismatch {
            expected: tokens.len(),
            got: segments.len(),
        });
    }

    let alignments = verify_segments(tokens, &segments)?;

    let mut timed = 0usize;
    let mut unaligned = 0usize;
    for (token, alignment) in tokens.tokens.iter().zip(alignments) {
        let unit = document
            .unit_at_mut(&token.position)
            .filter(|unit| unit.id() == Some(token.id.as_str()))
            .ok_or_else(|| {
                AlignmentError::config(format!(
                    "token '{}' does not match the unit at {}; was the document re-tokenized?",
                    token.id, token.position
                ))
            })?;
        match alignment {
            Alignment::Timed(_) => timed += 1,
            Alignment::Unaligned => {
                unaligned += 1;
                tracing::warn!(id = token.id.as_str(), text = token.text.as_str(), "indexer: unit left unaligned");
            }
        }
        unit.alignment = Some(alignment);
    }

    tracing::debug!(units = tokens.len(), timed, unaligned, "indexer: segments attached");

    Ok(AlignedDocument {
        document,
        timed,
        unaligned,
    })
}

fn verify_segments(
    tokens: &TokenSequence,
    segments: &[AlignmentSegment],
) -> Result<Vec<Alignment>, AlignmentError> {
    let mut previous_end_ms: Option<u64> = None;
    let mut alignments = Vec::with_capacity(segments.len());

    for (index, (token, segment)) in tokens.tokens.iter().zip(segments).enumerate() {
        if let Some(echoed) = &segment.id {
            if *echoed != token.id {
                return Err(AlignmentError::AlignmentIdMismatch {
                    index,
                    expected: token.id.clone(),
                    got: echoed.clone(),
                });
            }
        }

        let order_error = |previous_end_ms: u64| AlignmentError::AlignmentOrder {
            index,
            id: token.id.clone(),
            previous_end_ms,
            start_ms: segment.start_ms,
            end_ms: segment.end_ms,
        };

        if segment.end_ms < segment.start_ms {
            return Err(order_error(segment.start_ms));
        }
        if segment.is_unaligned() {
            alignments.push(Alignment::Unaligned);
            continue;
        }
        if let Some(prev) = previous_end_ms {
            if segment.start_ms < prev {
                return Err(order_error(prev));
            }
        }
        previous_end_ms = Some(segment.end_ms);
        alignments.push(Alignment::Timed(TimeRange {
            start_ms: segment.start_ms,
            end_ms: segment.end_ms,
        }));
    }

    Ok(alignments)
}

#[cfg(test)]
mod tests;
