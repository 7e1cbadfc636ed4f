use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::Granularity;
use crate::document::{Attribute, Document, Element, Node, Text, Unit};
use crate::error::AlignmentError;

struct OpenElement {
    element: Element,
    is_unit: bool,
}

/// Parse `source` keeping the exact bytes of every tag, text run and
/// comment so the document can be written back unchanged.
pub(super) fn parse(source: &str, granularity: Granularity) -> Result<Document, AlignmentError> {
    let unit_tag = granularity.unit_tag();
    let word_tag = Granularity::Word.unit_tag();

    let mut reader = Reader::from_str(source);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut top_level: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut last = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| AlignmentError::parse(reader.buffer_position(), e.to_string()))?;
        let position = reader.buffer_position();
        let raw = &source[last..position];
        let start = last;
        last = position;
        let self_closing = matches!(event, Event::Empty(_));

        let node = match event {
            Event::Start(tag) | Event::Empty(tag) => {
                let element = open_element(&tag, raw, start)?;
                let in_unit = stack.iter().any(|open| open.is_unit);
                let is_unit = element.name == unit_tag;
                if is_unit && in_unit {
                    return Err(AlignmentError::parse(
                        start,
                        format!("<{unit_tag}> elements cannot be nested"),
                    ));
                }
                if granularity == Granularity::Sentence && element.name == word_tag && !in_unit {
                    return Err(AlignmentError::config(format!(
                        "sentence granularity requested but <{word_tag}> at byte {start} is outside any <{unit_tag}>"
                    )));
                }
                if !self_closing {
                    stack.push(OpenElement { element, is_unit });
                    continue;
                }
                finish(element, is_unit)
            }
            Event::End(_) => {
                let Some(mut open) = stack.pop() else {
                    return Err(AlignmentError::parse(start, "closing tag without an open element"));
                };
                open.element.close_tag = Some(raw.to_string());
                finish(open.element, open.is_unit)
            }
            Event::Text(_) => text_node(raw, start)?,
            Event::CData(data) => Node::Text(Text {
                raw: raw.to_string(),
                decoded: String::from_utf8_lossy(&data.into_inner()).into_owned(),
            }),
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {
                Node::Verbatim(raw.to_string())
            }
            Event::Eof => {
                // The reader can consume trailing misc without reporting it.
                let trailing = &source[start..];
                if !trailing.is_empty() {
                    top_level.push(text_node(trailing, start)?);
                }
                break;
            }
        };

        match stack.last_mut() {
            Some(parent) => parent.element.children.push(node),
            None => top_level.push(node),
        }
    }

    if let Some(open) = stack.last() {
        return Err(AlignmentError::parse(
            source.len(),
            format!("unclosed element <{}>", open.element.name),
        ));
    }
    check_document_shape(&top_level)?;

    Ok(Document {
        nodes: top_level,
        granularity,
    })
}

fn open_element(tag: &BytesStart<'_>, raw: &str, start: usize) -> Result<Element, AlignmentError> {
    let name = std::str::from_utf8(tag.name().as_ref())
        .map_err(|e| AlignmentError::parse(start, e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| AlignmentError::parse(start, e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| AlignmentError::parse(start, e.to_string()))?
            .to_string();
        let raw_value = std::str::from_utf8(&attr.value)
            .map_err(|e| AlignmentError::parse(start, e.to_string()))?
            .to_string();
        if let Err(e) = quick_xml::escape::unescape(&raw_value) {
            return Err(AlignmentError::parse(
                start,
                format!("attribute '{key}' of <{name}>: {e}"),
            ));
        }
        attributes.push(Attribute { key, raw_value });
    }

    Ok(Element {
        name,
        attributes,
        open_tag: raw.to_string(),
        close_tag: None,
        children: Vec::new(),
    })
}

fn text_node(raw: &str, start: usize) -> Result<Node, AlignmentError> {
    let decoded = quick_xml::escape::unescape(raw)
        .map_err(|e| AlignmentError::parse(start, e.to_string()))?;
    Ok(Node::Text(Text {
        raw: raw.to_string(),
        decoded: decoded.into_owned(),
    }))
}

fn finish(element: Element, is_unit: bool) -> Node {
    if is_unit {
        Node::Unit(Unit::new(element))
    } else {
        Node::Container(element)
    }
}

fn check_document_shape(top_level: &[Node]) -> Result<(), AlignmentError> {
    let roots = top_level.iter().filter(|n| n.element().is_some()).count();
    if roots != 1 {
        return Err(AlignmentError::parse(
            0,
            format!("expected exactly one root element, found {roots}"),
        ));
    }
    let stray_text = top_level.iter().any(|node| match node {
        Node::Text(text) => !text.decoded.trim().is_empty(),
        _ => false,
    });
    if stray_text {
        return Err(AlignmentError::parse(0, "text outside the root element"));
    }
    Ok(())
}
