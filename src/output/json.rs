use serde::Serialize;

use crate::alignment::indexer::AlignedDocument;
use crate::error::AlignmentError;
use crate::types::WordTiming;

#[derive(Debug, Serialize)]
struct WordList<'a> {
    words: &'a [WordTiming],
}

/// `{"words": [{"id", "text", "start_ms", "end_ms"}, ...]}` in document order.
pub fn to_json(aligned: &AlignedDocument) -> Result<String, AlignmentError> {
    let words = aligned.words();
    serde_json::to_string_pretty(&WordList { words: &words })
        .map_err(|e| AlignmentError::json("serialize word list", e))
}
