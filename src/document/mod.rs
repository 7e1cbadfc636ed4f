use std::borrow::Cow;
use std::fmt;

use crate::config::Granularity;
use crate::error::AlignmentError;
use crate::types::Alignment;

pub mod plain_text;
mod xml;

/// Child indices from the top level of a document down to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(pub Vec<usize>);

impl TreePath {
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    /// Value exactly as written in the source, still escaped.
    pub raw_value: String,
}

impl Attribute {
    pub fn value(&self) -> Cow<'_, str> {
        quick_xml::escape::unescape(&self.raw_value).unwrap_or(Cow::Borrowed(&self.raw_value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) name: String,
    pub(crate) attributes: Vec<Attribute>,
    /// Source bytes of the start tag, `<` through `>`.
    pub(crate) open_tag: String,
    /// Source bytes of the end tag; `None` for `<empty/>` elements.
    pub(crate) close_tag: Option<String>,
    pub(crate) children: Vec<Node>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(Attribute::value)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_self_closing(&self) -> bool {
        self.close_tag.is_none()
    }

    /// Start tag with `extra` attributes appended before the closing bracket.
    ///
    /// The source bytes are kept when none of the keys already exist;
    /// otherwise the tag is rebuilt with the existing values replaced.
    pub(crate) fn open_tag_with(&self, extra: &[(&str, String)]) -> String {
        if extra.is_empty() {
            return self.open_tag.clone();
        }
        let collides = extra
            .iter()
            .any(|(key, _)| self.attributes.iter().any(|a| a.key == *key));
        if collides {
            return self.rebuild_open_tag(&self.name, extra);
        }

        let (body, closing) = match self.open_tag.strip_suffix("/>") {
            Some(body) => (body, "/>"),
            None => (
                self.open_tag.strip_suffix('>').unwrap_or(&self.open_tag),
                ">",
            ),
        };
        let mut tag = body.trim_end().to_string();
        for (key, value) in extra {
            push_attribute(&mut tag, key, &quick_xml::escape::escape(value.as_str()));
        }
        tag.push_str(closing);
        tag
    }

    /// Start tag rebuilt from parsed attributes under a (possibly new) name.
    pub(crate) fn rebuild_open_tag(&self, name: &str, overrides: &[(&str, String)]) -> String {
        self.rebuild_open_tag_filtered(name, overrides, |_| true)
    }

    /// Like `rebuild_open_tag`, leaving out source attributes `keep` rejects.
    pub(crate) fn rebuild_open_tag_filtered(
        &self,
        name: &str,
        overrides: &[(&str, String)],
        keep: impl Fn(&Attribute) -> bool,
    ) -> String {
        let kept: Vec<&Attribute> = self.attributes.iter().filter(|&a| keep(a)).collect();
        let mut tag = format!("<{name}");
        for attr in &kept {
            match overrides.iter().find(|(key, _)| *key == attr.key) {
                Some((key, value)) => {
                    push_attribute(&mut tag, key, &quick_xml::escape::escape(value.as_str()))
                }
                None => push_attribute(&mut tag, &attr.key, &attr.raw_value),
            }
        }
        for (key, value) in overrides {
            if !kept.iter().any(|a| a.key == *key) {
                push_attribute(&mut tag, key, &quick_xml::escape::escape(value.as_str()));
            }
        }
        tag.push_str(if self.is_self_closing() { "/>" } else { ">" });
        tag
    }

    /// Decoded descendant text. Word-element boundaries count as whitespace.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn push_attribute(tag: &mut String, key: &str, escaped_value: &str) {
    let quote = if escaped_value.contains('"') { '\'' } else { '"' };
    tag.push(' ');
    tag.push_str(key);
    tag.push('=');
    tag.push(quote);
    tag.push_str(escaped_value);
    tag.push(quote);
}

fn collect_text(nodes: &[Node], out: &mut String) {
    let word_tag = Granularity::Word.unit_tag();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.decoded),
            Node::Verbatim(_) => {}
            Node::Container(element) => {
                let boundary = element.name == word_tag;
                if boundary {
                    out.push(' ');
                }
                collect_text(&element.children, out);
                if boundary {
                    out.push(' ');
                }
            }
            Node::Unit(unit) => {
                out.push(' ');
                collect_text(&unit.element.children, out);
                out.push(' ');
            }
        }
    }
}

/// An element eligible for alignment at the request's granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub(crate) element: Element,
    pub(crate) id: Option<String>,
    pub(crate) id_synthesized: bool,
    /// Normalized text; `None` until tokenized or when nothing alignable remains.
    pub(crate) text: Option<String>,
    pub(crate) alignment: Option<Alignment>,
}

impl Unit {
    pub(crate) fn new(element: Element) -> Self {
        Self {
            element,
            id: None,
            id_synthesized: false,
            text: None,
            alignment: None,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn id_synthesized(&self) -> bool {
        self.id_synthesized
    }

    pub fn normalized_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_alignable(&self) -> bool {
        self.text.is_some()
    }

    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Source bytes, including entity references or a CDATA wrapper.
    pub(crate) raw: String,
    pub(crate) decoded: String,
}

impl Text {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn decoded(&self) -> &str {
        &self.decoded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Container(Element),
    Unit(Unit),
    Text(Text),
    /// Comments, processing instructions, declaration, doctype.
    Verbatim(String),
}

impl Node {
    pub fn element(&self) -> Option<&Element> {
        match self {
            Self::Container(element) => Some(element),
            Self::Unit(unit) => Some(&unit.element),
            Self::Text(_) | Self::Verbatim(_) => None,
        }
    }

    fn children(&self) -> &[Node] {
        self.element().map(Element::children).unwrap_or(&[])
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Container(element) => Some(&mut element.children),
            Self::Unit(unit) => Some(&mut unit.element.children),
            Self::Text(_) | Self::Verbatim(_) => None,
        }
    }
}

/// A parsed document: prolog, exactly one root element, trailing misc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) granularity: Granularity,
}

impl Document {
    /// Parse XML, treating elements named after `granularity`'s unit tag as units.
    pub fn parse_xml(source: &str, granularity: Granularity) -> Result<Self, AlignmentError> {
        xml::parse(source, granularity)
    }

    /// Wrap plain text into the canonical `TEI/text/body/div/p/s/w` tree.
    pub fn from_plain_text(
        text: &str,
        language: &str,
        granularity: Granularity,
    ) -> Result<Self, AlignmentError> {
        let source = plain_text::synthesize(text, language);
        xml::parse(&source, granularity)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::element)
    }

    pub fn node_at(&self, path: &TreePath) -> Option<&Node> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.nodes.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    pub(crate) fn unit_at_mut(&mut self, path: &TreePath) -> Option<&mut Unit> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.nodes.get_mut(*first)?;
        for index in rest {
            node = node.children_mut()?.get_mut(*index)?;
        }
        match node {
            Node::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Every unit in document order, alignable or not.
    pub fn units(&self) -> Vec<&Unit> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Unit>) {
            for node in nodes {
                match node {
                    Node::Unit(unit) => out.push(unit),
                    Node::Container(element) => walk(&element.children, out),
                    Node::Text(_) | Node::Verbatim(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Re-serialize exactly as parsed, plus any identifiers written since.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_source(&self.nodes, &mut out);
        out
    }
}

fn write_source(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.raw),
            Node::Verbatim(raw) => out.push_str(raw),
            Node::Container(element) => write_element_source(element, None, out),
            Node::Unit(unit) => {
                let extra = synthesized_id_attribute(unit);
                write_element_source(&unit.element, Some(extra.as_slice()), out);
            }
        }
    }
}

pub(crate) fn synthesized_id_attribute(unit: &Unit) -> Vec<(&'static str, String)> {
    match (&unit.id, unit.id_synthesized) {
        (Some(id), true) => vec![("id", id.clone())],
        _ => Vec::new(),
    }
}

fn write_element_source(element: &Element, extra: Option<&[(&str, String)]>, out: &mut String) {
    match extra {
        Some(extra) => out.push_str(&element.open_tag_with(extra)),
        None => out.push_str(&element.open_tag),
    }
    write_source(&element.children, out);
    if let Some(close) = &element.close_tag {
        out.push_str(close);
    }
}
