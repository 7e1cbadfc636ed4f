use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// Size of the unit submitted to the aligner. Fixed for a whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Word,
    Sentence,
}

impl Granularity {
    /// Element name that carries one unit of this granularity.
    pub fn unit_tag(self) -> &'static str {
        match self {
            Self::Word => "w",
            Self::Sentence => "s",
        }
    }

    pub fn default_id_prefix(self) -> &'static str {
        match self {
            Self::Word => "w",
            Self::Sentence => "s",
        }
    }

    pub fn default_separator(self) -> &'static str {
        match self {
            Self::Word => " ",
            Self::Sentence => "\n",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Sentence => "sentence",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" | "w" => Ok(Self::Word),
            "sentence" | "s" => Ok(Self::Sentence),
            other => Err(AlignmentError::config(format!(
                "unknown granularity '{other}', expected 'word' or 'sentence'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub granularity: Granularity,
    /// ISO-639 code of the document language; `und` when unknown.
    pub language: String,
    /// Prefix for synthesized unit identifiers. Defaults per granularity.
    pub id_prefix: Option<String>,
    /// Separator used when joining unit texts. Defaults per granularity.
    pub separator: Option<String>,
    /// Upper bound on the aligner call, propagated as a cancellation deadline.
    pub timeout_ms: Option<u64>,
}

impl AlignConfig {
    pub const UNDETERMINED_LANGUAGE: &'static str = "und";

    pub fn new(language: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            language: language.into(),
            granularity,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read alignment config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse alignment config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        if !is_iso639_code(&self.language) {
            return Err(AlignmentError::config(format!(
                "'{}' is not an ISO-639 language code",
                self.language
            )));
        }
        if let Some(prefix) = &self.id_prefix {
            let valid_start = prefix
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            let valid_rest = prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
            if !valid_start || !valid_rest {
                return Err(AlignmentError::config(format!(
                    "id prefix '{prefix}' cannot start an XML identifier"
                )));
            }
        }
        if self.separator.as_deref() == Some("") {
            return Err(AlignmentError::config("unit separator must not be empty"));
        }
        Ok(())
    }

    pub fn id_prefix(&self) -> &str {
        self.id_prefix
            .as_deref()
            .unwrap_or_else(|| self.granularity.default_id_prefix())
    }

    pub fn separator(&self) -> &str {
        self.separator
            .as_deref()
            .unwrap_or_else(|| self.granularity.default_separator())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            language: Self::UNDETERMINED_LANGUAGE.to_string(),
            id_prefix: None,
            separator: None,
            timeout_ms: None,
        }
    }
}

fn is_iso639_code(code: &str) -> bool {
    (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// Attribute names and sources used by the presentation renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationOptions {
    pub begin_attribute: String,
    pub end_attribute: String,
    /// Document reference written into SMIL `text/@src`.
    pub text_src: String,
    /// Audio reference written into SMIL `audio/@src`.
    pub audio_src: String,
    /// Title placed in the XHTML head.
    pub title: String,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            begin_attribute: "data-begin".to_string(),
            end_attribute: "data-end".to_string(),
            text_src: "text.xml".to_string(),
            audio_src: "audio.wav".to_string(),
            title: "Book".to_string(),
        }
    }
}
