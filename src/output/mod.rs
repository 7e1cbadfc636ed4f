mod annotate;
mod json;
mod smil;
mod xhtml;

pub use annotate::annotate;
pub use json::to_json;
pub use smil::to_smil;
pub use xhtml::to_xhtml;

use crate::alignment::indexer::AlignedDocument;
use crate::config::PresentationOptions;
use crate::error::AlignmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Source markup with timing attributes on units.
    #[default]
    Xml,
    Xhtml,
    Smil,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Xhtml => "xhtml",
            Self::Smil => "smil",
            Self::Json => "json",
        }
    }
}

pub fn render(
    aligned: &AlignedDocument,
    format: OutputFormat,
    options: &PresentationOptions,
) -> Result<String, AlignmentError> {
    match format {
        OutputFormat::Xml => Ok(annotate(aligned, options)),
        OutputFormat::Xhtml => Ok(to_xhtml(aligned, options)),
        OutputFormat::Smil => to_smil(aligned, options),
        OutputFormat::Json => to_json(aligned),
    }
}
