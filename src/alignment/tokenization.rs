use std::collections::HashSet;

use crate::config::AlignConfig;
use crate::document::{Document, Element, Node, TreePath, Unit};
use crate::error::AlignmentError;
use crate::pipeline::traits::TextNormalizer;
use crate::types::{Token, TokenSequence};

/// Attribute that removes an element's units from alignment.
pub const DO_NOT_ALIGN_ATTRIBUTE: &str = "do-not-align";

const ID_ATTRIBUTES: [&str; 2] = ["id", "xml:id"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerOptions {
    pub id_prefix: String,
    pub language: String,
}

impl From<&AlignConfig> for TokenizerOptions {
    fn from(config: &AlignConfig) -> Self {
        Self {
            id_prefix: config.id_prefix().to_string(),
            language: config.language.clone(),
        }
    }
}

/// Request-scoped identifier source.
///
/// Candidates are `prefix + document-order index`; an index whose candidate
/// is already taken by the source document is skipped, and no identifier is
/// handed out twice.
#[derive(Debug)]
pub struct IdAllocator {
    prefix: String,
    next: usize,
    taken: HashSet<String>,
}

impl IdAllocator {
    pub fn new(prefix: impl Into<String>, taken: HashSet<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            taken,
        }
    }

    pub fn allocate(&mut self, index: usize) -> String {
        self.next = self.next.max(index);
        loop {
            let candidate = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Walk `document` in pre-order, assign an identifier to every unit and
/// return the alignable ones as tokens.
///
/// Units whose normalized text is empty, or that sit under a
/// `do-not-align="true"` element, stay in the tree without a token.
pub fn tokenize(
    document: &mut Document,
    options: &TokenizerOptions,
    normalizer: &dyn TextNormalizer,
) -> Result<TokenSequence, AlignmentError> {
    let taken = collect_source_ids(document)?;
    let source_id_count = taken.len();
    let mut ctx = WalkContext {
        options,
        normalizer,
        ids: IdAllocator::new(options.id_prefix.clone(), taken),
        unit_index: 0,
        synthesized: 0,
        tokens: Vec::new(),
    };

    for (index, node) in document.nodes.iter_mut().enumerate() {
        ctx.visit(node, TreePath(vec![index]), false);
    }

    tracing::debug!(
        units = ctx.unit_index,
        tokens = ctx.tokens.len(),
        source_ids = source_id_count,
        synthesized_ids = ctx.synthesized,
        granularity = document.granularity.as_str(),
        "tokenization: units collected"
    );

    Ok(TokenSequence { tokens: ctx.tokens })
}

struct WalkContext<'a> {
    options: &'a TokenizerOptions,
    normalizer: &'a dyn TextNormalizer,
    ids: IdAllocator,
    unit_index: usize,
    synthesized: usize,
    tokens: Vec<Token>,
}

impl WalkContext<'_> {
    fn visit(&mut self, node: &mut Node, path: TreePath, excluded: bool) {
        match node {
            Node::Container(element) => {
                let excluded = excluded || is_excluded(element);
                for (index, child) in element.children.iter_mut().enumerate() {
                    self.visit(child, path.child(index), excluded);
                }
            }
            Node::Unit(unit) => {
                let excluded = excluded || is_excluded(&unit.element);
                self.visit_unit(unit, path, excluded);
            }
            Node::Text(_) | Node::Verbatim(_) => {}
        }
    }

    fn visit_unit(&mut self, unit: &mut Unit, path: TreePath, excluded: bool) {
        let index = self.unit_index;
        self.unit_index += 1;

        let (id, synthesized) = match source_id(&unit.element) {
            Some(id) => (id, false),
            None => {
                self.synthesized += 1;
                (self.ids.allocate(index), true)
            }
        };

        let text = if excluded {
            None
        } else {
            let raw = unit.element.text_content();
            let normalized = self
                .normalizer
                .normalize(raw.trim(), &self.options.language)
                .trim()
                .to_string();
            (!normalized.is_empty()).then_some(normalized)
        };

        if let Some(text) = &text {
            self.tokens.push(Token {
                id: id.clone(),
                text: text.clone(),
                position: path,
            });
        } else {
            tracing::trace!(id = id.as_str(), excluded, "tokenization: unit not alignable");
        }

        unit.id = Some(id);
        unit.id_synthesized = synthesized;
        unit.text = text;
        unit.alignment = None;
    }
}

fn is_excluded(element: &Element) -> bool {
    element
        .attribute(DO_NOT_ALIGN_ATTRIBUTE)
        .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

fn source_id(element: &Element) -> Option<String> {
    ID_ATTRIBUTES
        .iter()
        .find_map(|key| element.attribute(key))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Every identifier declared in the source, failing on the first repeat.
fn collect_source_ids(document: &Document) -> Result<HashSet<String>, AlignmentError> {
    fn walk(nodes: &[Node], seen: &mut HashSet<String>) -> Result<(), AlignmentError> {
        for node in nodes {
            let Some(element) = node.element() else {
                continue;
            };
            if let Some(id) = source_id(element) {
                if !seen.insert(id.clone()) {
                    return Err(AlignmentError::DuplicateId { id });
                }
            }
            walk(element.children(), seen)?;
        }
        Ok(())
    }

    let mut seen = HashSet::new();
    walk(document.nodes(), &mut seen)?;
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Granularity;
    use crate::pipeline::defaults::DefaultNormalizer;

    fn options() -> TokenizerOptions {
        TokenizerOptions {
            id_prefix: "w".to_string(),
            language: "eng".to_string(),
        }
    }

    fn tokenize_xml(source: &str) -> Result<(Document, TokenSequence), AlignmentError> {
        let mut doc = Document::parse_xml(source, Granularity::Word)?;
        let tokens = tokenize(&mut doc, &options(), &DefaultNormalizer)?;
        Ok((doc, tokens))
    }

    #[test]
    fn synthesizes_ids_in_document_order() {
        let (_, seq) = tokenize_xml("<p><s><w>One</w> <w>two</w></s><s><w>three</w></s></p>").unwrap();
        assert_eq!(seq.ids().collect::<Vec<_>>(), ["w0", "w1", "w2"]);
        assert_eq!(seq.tokens[0].text, "one");
        assert_eq!(seq.tokens[2].position, TreePath(vec![0, 1, 0]));
    }

    #[test]
    fn keeps_source_ids() {
        let (doc, seq) =
            tokenize_xml("<s><w id=\"a\">x</w><w xml:id=\"b\">y</w></s>").unwrap();
        assert_eq!(seq.ids().collect::<Vec<_>>(), ["a", "b"]);
        assert!(doc.units().iter().all(|u| !u.id_synthesized()));
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = tokenize_xml("<s id=\"x\"><w id=\"a\">x</w><w id=\"a\">y</w></s>").unwrap_err();
        assert!(matches!(err, AlignmentError::DuplicateId { ref id } if id == "a"), "{err}");

        let err = tokenize_xml("<s id=\"a\"><w id=\"a\">x</w></s>").unwrap_err();
        assert!(matches!(err, AlignmentError::DuplicateId { .. }));
    }

    #[test]
    fn synthesized_ids_skip_source_ids() {
        let (_, seq) = tokenize_xml("<s><w>a</w><w id=\"w2\">b</w><w>c</w><w>d</w></s>").unwrap();
        assert_eq!(seq.ids().collect::<Vec<_>>(), ["w0", "w2", "w3", "w4"]);
    }

    #[test]
    fn punctuation_units_get_ids_but_no_tokens() {
        let (doc, seq) = tokenize_xml("<s><w>Hi</w><w>,</w><w/><w>there</w></s>").unwrap();
        assert_eq!(seq.ids().collect::<Vec<_>>(), ["w0", "w3"]);
        let units = doc.units();
        assert_eq!(units.len(), 4);
        assert_eq!(units[1].id(), Some("w1"));
        assert!(!units[1].is_alignable());
        assert!(!units[2].is_alignable());
    }

    #[test]
    fn do_not_align_excludes_subtree() {
        let (doc, seq) = tokenize_xml(
            "<p><s><w>kept</w></s><s do-not-align=\"true\"><w>skipped</w></s><w do-not-align=\"TRUE\">also</w></p>",
        )
        .unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(doc.units().len(), 3);
        assert_eq!(doc.units()[2].id(), Some("w2"));
    }

    #[test]
    fn caller_normalizer_decides_alignability() {
        let mut doc = Document::parse_xml("<s><w>Keep</w><w>drop</w></s>", Granularity::Word).unwrap();
        let upper_only = |text: &str, _language: &str| {
            if text.chars().next().is_some_and(char::is_uppercase) {
                text.to_uppercase()
            } else {
                String::new()
            }
        };
        let seq = tokenize(&mut doc, &options(), &upper_only).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.tokens[0].text, "KEEP");
    }

    #[test]
    fn sentence_units_join_word_text() {
        let mut doc = Document::parse_xml(
            "<p><s><w>Hello</w><w>world</w>!</s></p>",
            Granularity::Sentence,
        )
        .unwrap();
        let opts = TokenizerOptions {
            id_prefix: "s".to_string(),
            language: "eng".to_string(),
        };
        let seq = tokenize(&mut doc, &opts, &DefaultNormalizer).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.tokens[0].id, "s0");
        assert_eq!(seq.tokens[0].text, "hello world");
    }

    #[test]
    fn retokenizing_is_stable() {
        let mut doc = Document::parse_xml("<s><w>a</w> <w>b</w></s>", Granularity::Word).unwrap();
        let first = tokenize(&mut doc, &options(), &DefaultNormalizer).unwrap();
        let second = tokenize(&mut doc, &options(), &DefaultNormalizer).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn allocator_never_reuses() {
        let taken: HashSet<String> = ["w1".to_string()].into_iter().collect();
        let mut ids = IdAllocator::new("w", taken);
        assert_eq!(ids.allocate(0), "w0");
        assert_eq!(ids.allocate(1), "w2");
        assert_eq!(ids.allocate(2), "w3");
        assert_eq!(ids.allocate(5), "w5");
    }
}
