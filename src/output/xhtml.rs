use quick_xml::escape::escape;

use crate::alignment::indexer::AlignedDocument;
use crate::config::PresentationOptions;
use crate::document::{Element, Node};
use crate::output::annotate::unit_attributes;

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";

/// Render the aligned document as XHTML for a read-along player.
///
/// TEI structure maps onto HTML elements; sentences and words become
/// `span`s with a class, and timed units carry the timing attributes.
/// Text, comments and attribute values are carried over unchanged.
pub fn to_xhtml(aligned: &AlignedDocument, options: &PresentationOptions) -> String {
    let mut out = String::new();
    write_nodes(aligned.nodes(), options, 0, &mut out);
    out
}

fn html_name(tei_name: &str) -> &'static str {
    match tei_name {
        "TEI" => "html",
        "text" => "body",
        "body" | "div" => "div",
        "p" => "p",
        _ => "span",
    }
}

fn class_for(tei_name: &str) -> Option<&'static str> {
    match tei_name {
        "s" => Some("sentence"),
        "w" => Some("word"),
        _ => None,
    }
}

fn write_nodes(nodes: &[Node], options: &PresentationOptions, depth: usize, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text.raw()),
            Node::Verbatim(raw) => out.push_str(raw),
            Node::Container(element) => write_element(element, Vec::new(), options, depth, out),
            Node::Unit(unit) => {
                let attrs = unit_attributes(unit, options);
                write_element(&unit.element, attrs, options, depth, out);
            }
        }
    }
}

fn write_element(
    element: &Element,
    mut attrs: Vec<(&str, String)>,
    options: &PresentationOptions,
    depth: usize,
    out: &mut String,
) {
    let tei_name = element.name();
    let name = html_name(tei_name);

    match class_for(tei_name) {
        Some(class) => attrs.push(("class", class.to_string())),
        None if name == "span" && element.attribute("class").is_none() => {
            attrs.push(("class", tei_name.to_string()))
        }
        None => {}
    }
    let is_root = depth == 0 && name == "html";
    if is_root {
        attrs.push(("xmlns", XHTML_NAMESPACE.to_string()));
    }

    // A TEI default namespace would pull the HTML elements out of XHTML.
    let open = element.rebuild_open_tag_filtered(name, &attrs, |attr| {
        !(attr.key == "xmlns" && attr.value() == TEI_NAMESPACE)
    });
    out.push_str(&open);
    if element.is_self_closing() {
        return;
    }
    if is_root {
        out.push_str(&format!(
            "<head><meta charset=\"utf-8\"/><title>{}</title></head>",
            escape(options.title.as_str())
        ));
    }
    write_nodes(&element.children, options, depth + 1, out);
    out.push_str(&format!("</{name}>"));
}
