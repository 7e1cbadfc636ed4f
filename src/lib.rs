pub mod alignment;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

pub use alignment::indexer::{index_alignment, AlignedDocument};
pub use alignment::request::PreparedRequest;
pub use alignment::tokenization::{tokenize, IdAllocator, TokenizerOptions};
pub use config::{AlignConfig, Granularity, PresentationOptions};
pub use document::{Document, Node, TreePath, Unit};
pub use error::{AlignerError, AlignmentError};
pub use output::{render, OutputFormat};
pub use pipeline::builder::ReadAlongBuilder;
pub use pipeline::cancel::CancellationToken;
pub use pipeline::defaults::{DefaultNormalizer, SegmentFileAligner};
pub use pipeline::runtime::{DocumentInput, PreparedDocument, ReadAlongOutput, ReadAlongPipeline};
pub use pipeline::traits::{Aligner, TextNormalizer};
pub use types::{
    Alignment, AlignmentSegment, AudioSource, TimeRange, Token, TokenSequence, WordTiming,
};
