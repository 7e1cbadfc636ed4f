use crate::alignment::indexer::{index_alignment, AlignedDocument};
use crate::alignment::request::PreparedRequest;
use crate::alignment::tokenization::{tokenize, TokenizerOptions};
use crate::config::AlignConfig;
use crate::document::Document;
use crate::error::AlignmentError;
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::traits::{Aligner, TextNormalizer};
use crate::types::{AudioSource, TokenSequence, WordTiming};

/// Source document for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentInput<'a> {
    Xml(&'a str),
    PlainText(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAlongOutput {
    pub aligned: AlignedDocument,
    /// Alignable units in document order with their timing.
    pub words: Vec<WordTiming>,
}

/// Document tokenized and ready to be sent to an aligner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    pub document: Document,
    pub tokens: TokenSequence,
    pub request: PreparedRequest,
}

/// Tokenize, align, index. Holds no per-request state, so one pipeline can
/// serve concurrent requests.
pub struct ReadAlongPipeline {
    config: AlignConfig,
    aligner: Box<dyn Aligner>,
    normalizer: Box<dyn TextNormalizer>,
}

pub(crate) struct ReadAlongPipelineParts {
    pub config: AlignConfig,
    pub aligner: Box<dyn Aligner>,
    pub normalizer: Box<dyn TextNormalizer>,
}

impl ReadAlongPipeline {
    pub(crate) fn from_parts(parts: ReadAlongPipelineParts) -> Self {
        Self {
            config: parts.config,
            aligner: parts.aligner,
            normalizer: parts.normalizer,
        }
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn load_document(&self, input: DocumentInput<'_>) -> Result<Document, AlignmentError> {
        match input {
            DocumentInput::Xml(source) => Document::parse_xml(source, self.config.granularity),
            DocumentInput::PlainText(text) => {
                Document::from_plain_text(text, &self.config.language, self.config.granularity)
            }
        }
    }

    pub fn prepare(&self, mut document: Document) -> Result<PreparedDocument, AlignmentError> {
        if document.granularity() != self.config.granularity {
            return Err(AlignmentError::config(format!(
                "document was parsed at {} granularity but the request is {}",
                document.granularity().as_str(),
                self.config.granularity.as_str()
            )));
        }
        let options = TokenizerOptions::from(&self.config);
        let tokens = tokenize(&mut document, &options, self.normalizer.as_ref())?;
        let request = PreparedRequest::build(&tokens, &self.config)?;
        Ok(PreparedDocument {
            document,
            tokens,
            request,
        })
    }

    pub fn align(
        &self,
        input: DocumentInput<'_>,
        audio: &AudioSource,
    ) -> Result<ReadAlongOutput, AlignmentError> {
        self.align_with_cancel(input, audio, &CancellationToken::new())
    }

    pub fn align_with_cancel(
        &self,
        input: DocumentInput<'_>,
        audio: &AudioSource,
        cancel: &CancellationToken,
    ) -> Result<ReadAlongOutput, AlignmentError> {
        let document = self.load_document(input)?;
        self.align_document(document, audio, cancel)
    }

    pub fn align_document(
        &self,
        document: Document,
        audio: &AudioSource,
        cancel: &CancellationToken,
    ) -> Result<ReadAlongOutput, AlignmentError> {
        let prepared = self.prepare(document)?;
        let aligner = self.aligner.name();

        tracing::info!(
            aligner,
            audio = %audio.describe(),
            units = prepared.request.len(),
            language = prepared.request.language(),
            "pipeline: invoking aligner"
        );

        let cancel = cancel.bounded(self.config.timeout());
        let result = self.aligner.align(audio, &prepared.request, &cancel);
        // Past the deadline any outcome, failure included, counts as cancelled.
        if cancel.is_cancelled() {
            if let Err(e) = &result {
                tracing::debug!(aligner, error = %e, "pipeline: aligner error after cancellation");
            }
            return Err(AlignmentError::AlignmentCancelled);
        }
        let segments = result.map_err(|e| AlignmentError::from_aligner(aligner, e))?;

        let aligned = index_alignment(prepared.document, &prepared.tokens, segments)?;
        let words = aligned.words();

        tracing::info!(
            aligner,
            timed = aligned.timed_count(),
            unaligned = aligned.unaligned_count(),
            "pipeline: alignment complete"
        );

        Ok(ReadAlongOutput { aligned, words })
    }
}
