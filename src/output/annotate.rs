use crate::alignment::indexer::AlignedDocument;
use crate::config::PresentationOptions;
use crate::document::{synthesized_id_attribute, Element, Node, Unit};
use crate::types::{format_seconds, Alignment};

/// Serialize the aligned document with timing attributes on timed units.
///
/// Everything outside unit start tags is copied from the source bytes.
pub fn annotate(aligned: &AlignedDocument, options: &PresentationOptions) -> String {
    let mut out = String::new();
    write_nodes(aligned.nodes(), options, &mut out);
    out
}

fn write_nodes(nodes: &[Node], options: &PresentationOptions, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text.raw()),
            Node::Verbatim(raw) => out.push_str(raw),
            Node::Container(element) => write_element(element, element.open_tag.clone(), options, out),
            Node::Unit(unit) => {
                let open = unit.element.open_tag_with(&unit_attributes(unit, options));
                write_element(&unit.element, open, options, out);
            }
        }
    }
}

fn write_element(element: &Element, open: String, options: &PresentationOptions, out: &mut String) {
    out.push_str(&open);
    write_nodes(&element.children, options, out);
    if let Some(close) = &element.close_tag {
        out.push_str(close);
    }
}

/// Identifier (when synthesized) followed by begin/end (when timed).
pub(crate) fn unit_attributes<'a>(
    unit: &Unit,
    options: &'a PresentationOptions,
) -> Vec<(&'a str, String)> {
    let mut attrs: Vec<(&'a str, String)> = synthesized_id_attribute(unit);
    if let Some(Alignment::Timed(range)) = unit.alignment() {
        attrs.push((options.begin_attribute.as_str(), format_seconds(range.start_ms)));
        attrs.push((options.end_attribute.as_str(), format_seconds(range.end_ms)));
    }
    attrs
}
