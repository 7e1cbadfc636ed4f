use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{context}: {message}")]
    Runtime {
        context: &'static str,
        message: String,
    },
    #[error("malformed document at byte {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("duplicate identifier '{id}'")]
    DuplicateId { id: String },
    #[error("invalid configuration: {message}")]
    Config { message: String },
    #[error("audio unreadable: {message}")]
    AudioUnreadable { message: String },
    #[error("aligner '{aligner}' failed: {message}")]
    AlignmentEngine { aligner: String, message: String },
    #[error("language '{language}' is not supported by the aligner")]
    UnsupportedLanguage { language: String },
    #[error("aligner returned {got} segments for {expected} units")]
    AlignmentCountMismatch { expected: usize, got: usize },
    #[error(
        "segment {index} ('{id}') spans {start_ms}..{end_ms} ms but the previous segment ends at {previous_end_ms} ms"
    )]
    AlignmentOrder {
        index: usize,
        id: String,
        previous_end_ms: u64,
        start_ms: u64,
        end_ms: u64,
    },
    #[error("segment {index} echoes identifier '{got}' but unit '{expected}' was submitted there")]
    AlignmentIdMismatch {
        index: usize,
        expected: String,
        got: String,
    },
    #[error("alignment was cancelled")]
    AlignmentCancelled,
}

/// Failure reported by an [`Aligner`](crate::pipeline::traits::Aligner) implementation.
#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("engine failure: {0}")]
    Engine(String),
    #[error("audio unreadable: {0}")]
    AudioUnreadable(String),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("cancelled")]
    Cancelled,
}

impl AlignmentError {
    pub(crate) fn from_aligner(aligner: &str, err: AlignerError) -> Self {
        match err {
            AlignerError::Engine(message) => Self::AlignmentEngine {
                aligner: aligner.to_string(),
                message,
            },
            AlignerError::AudioUnreadable(message) => Self::AudioUnreadable { message },
            AlignerError::UnsupportedLanguage(language) => Self::UnsupportedLanguage { language },
            AlignerError::Cancelled => Self::AlignmentCancelled,
        }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn runtime(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Runtime {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
