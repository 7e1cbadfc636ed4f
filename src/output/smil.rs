use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::alignment::indexer::AlignedDocument;
use crate::config::PresentationOptions;
use crate::error::AlignmentError;
use crate::types::{format_seconds, Alignment};

const SMIL_NAMESPACE: &str = "http://www.w3.org/ns/SMIL";

/// One `<par>` per timed unit, pointing into the text and the audio.
pub fn to_smil(
    aligned: &AlignedDocument,
    options: &PresentationOptions,
) -> Result<String, AlignmentError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let write_err = |e: quick_xml::Error| AlignmentError::runtime("write smil", e);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("smil").with_attributes([("xmlns", SMIL_NAMESPACE), ("version", "3.0")]),
        ))
        .map_err(write_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("body")))
        .map_err(write_err)?;

    for unit in aligned.document().units() {
        let (Some(id), Some(Alignment::Timed(range))) = (unit.id(), unit.alignment()) else {
            continue;
        };
        let par_id = format!("par-{id}");
        let text_src = format!("{}#{id}", options.text_src);
        let clip_begin = format_seconds(range.start_ms);
        let clip_end = format_seconds(range.end_ms);

        writer
            .write_event(Event::Start(
                BytesStart::new("par").with_attributes([("id", par_id.as_str())]),
            ))
            .map_err(write_err)?;
        writer
            .write_event(Event::Empty(
                BytesStart::new("text").with_attributes([("src", text_src.as_str())]),
            ))
            .map_err(write_err)?;
        writer
            .write_event(Event::Empty(BytesStart::new("audio").with_attributes([
                ("src", options.audio_src.as_str()),
                ("clipBegin", clip_begin.as_str()),
                ("clipEnd", clip_end.as_str()),
            ])))
            .map_err(write_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("par")))
            .map_err(write_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("body")))
        .map_err(write_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("smil")))
        .map_err(write_err)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| AlignmentError::runtime("write smil", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::indexer::index_alignment;
    use crate::alignment::tokenization::{tokenize, TokenizerOptions};
    use crate::config::Granularity;
    use crate::document::Document;
    use crate::pipeline::defaults::DefaultNormalizer;
    use crate::types::AlignmentSegment;

    #[test]
    fn lists_timed_units_in_order() {
        let mut doc =
            Document::parse_xml("<s><w>a</w> <w>b</w> <w>c</w></s>", Granularity::Word).unwrap();
        let options = TokenizerOptions {
            id_prefix: "w".to_string(),
            language: "eng".to_string(),
        };
        let tokens = tokenize(&mut doc, &options, &DefaultNormalizer).unwrap();
        let aligned = index_alignment(
            doc,
            &tokens,
            vec![
                AlignmentSegment::new(0, 120),
                AlignmentSegment::unaligned(),
                AlignmentSegment::new(300, 1450),
            ],
        )
        .unwrap();
        let options = PresentationOptions {
            text_src: "story.xml".to_string(),
            audio_src: "story.mp3".to_string(),
            ..PresentationOptions::default()
        };

        let smil = to_smil(&aligned, &options).unwrap();
        assert!(smil.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(smil.contains("<smil xmlns=\"http://www.w3.org/ns/SMIL\" version=\"3.0\">"));
        assert_eq!(smil.matches("<par ").count(), 2);
        assert!(smil.contains("<text src=\"story.xml#w0\"/>"));
        assert!(smil.contains(
            "<audio src=\"story.mp3\" clipBegin=\"0.300\" clipEnd=\"1.450\"/>"
        ));
        assert!(!smil.contains("#w1"));
        let first = smil.find("par-w0").unwrap();
        let last = smil.find("par-w2").unwrap();
        assert!(first < last);
        assert_eq!(smil, to_smil(&aligned, &options).unwrap());
    }
}
