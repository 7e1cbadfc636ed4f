use std::fmt::Write as _;

use crate::config::{AlignConfig, Granularity};
use crate::error::AlignmentError;
use crate::types::TokenSequence;

/// What the aligner receives: unit texts in submission order plus the
/// position to identifier mapping used when the reply comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    units: Vec<String>,
    ids: Vec<String>,
    language: String,
    granularity: Granularity,
    separator: String,
}

impl PreparedRequest {
    pub fn build(tokens: &TokenSequence, config: &AlignConfig) -> Result<Self, AlignmentError> {
        config.validate()?;
        if tokens.is_empty() {
            return Err(AlignmentError::config(
                "document contains no alignable units",
            ));
        }

        let mut units = Vec::with_capacity(tokens.len());
        let mut ids = Vec::with_capacity(tokens.len());
        for token in &tokens.tokens {
            units.push(token.text.clone());
            ids.push(token.id.clone());
        }

        tracing::debug!(
            units = units.len(),
            language = config.language.as_str(),
            granularity = config.granularity.as_str(),
            "request: prepared aligner input"
        );

        Ok(Self {
            units,
            ids,
            language: config.language.clone(),
            granularity: config.granularity,
            separator: config.separator().to_string(),
        })
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Identifier of the unit submitted at `position`.
    pub fn id_at(&self, position: usize) -> Option<&str> {
        self.ids.get(position).map(String::as_str)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit texts joined with the granularity separator.
    pub fn text(&self) -> String {
        self.units.join(&self.separator)
    }

    /// Linear JSGF grammar over unit identifiers, for FSG-driven decoders.
    pub fn jsgf_grammar(&self, name: &str) -> String {
        let mut out = String::from("#JSGF V1.0;\n\n");
        let _ = writeln!(out, "grammar {name};\n");
        let _ = writeln!(out, "public <s> = {};", self.ids.join(" "));
        out
    }

    /// `id<TAB>text` lines mapping grammar symbols to their unit text.
    pub fn dictionary(&self) -> String {
        let mut out = String::new();
        for (id, unit) in self.ids.iter().zip(&self.units) {
            let _ = writeln!(out, "{id}\t{unit}");
        }
        out
    }
}
