use proptest::prelude::*;

use super::{index_alignment, AlignedDocument};
use crate::alignment::tokenization::{tokenize, TokenizerOptions};
use crate::config::Granularity;
use crate::document::{Document, Node};
use crate::error::AlignmentError;
use crate::pipeline::defaults::DefaultNormalizer;
use crate::types::{Alignment, AlignmentSegment, TimeRange, TokenSequence};

fn tokenized(source: &str) -> (Document, TokenSequence) {
    let mut doc = Document::parse_xml(source, Granularity::Word).expect("valid xml");
    let options = TokenizerOptions {
        id_prefix: "w".to_string(),
        language: "eng".to_string(),
    };
    let tokens = tokenize(&mut doc, &options, &DefaultNormalizer).expect("tokenize");
    (doc, tokens)
}

fn words_xml(count: usize) -> String {
    let words: Vec<String> = (0..count).map(|i| format!("<w>word{i}</w>")).collect();
    format!("<s>{}</s>", words.join(" "))
}

fn seg(start_ms: u64, end_ms: u64) -> AlignmentSegment {
    AlignmentSegment::new(start_ms, end_ms)
}

fn count_nodes(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + node.element().map_or(0, |e| count_nodes(e.children())))
        .sum()
}

#[test]
fn attaches_segments_by_position() {
    let (doc, tokens) = tokenized("<s><w>one</w> <w>,</w> <w>two</w></s>");
    let aligned = index_alignment(doc, &tokens, vec![seg(0, 300), seg(300, 650)]).unwrap();

    let units = aligned.document().units();
    assert_eq!(
        units[0].alignment(),
        Some(Alignment::Timed(TimeRange {
            start_ms: 0,
            end_ms: 300
        }))
    );
    assert_eq!(units[1].alignment(), None, "punctuation is not alignable");
    assert_eq!(units[2].id(), Some("w2"));
    assert_eq!(
        units[2].alignment().and_then(|a| a.range()),
        Some(TimeRange {
            start_ms: 300,
            end_ms: 650
        })
    );
    assert_eq!(aligned.timed_count(), 2);
    assert_eq!(aligned.unaligned_count(), 0);
}

#[test]
fn count_mismatch_is_fatal() {
    let (doc, tokens) = tokenized(&words_xml(3));
    let err = index_alignment(doc.clone(), &tokens, vec![seg(0, 10), seg(10, 20)]).unwrap_err();
    assert!(matches!(
        err,
        AlignmentError::AlignmentCountMismatch {
            expected: 3,
            got: 2
        }
    ));

    let four = vec![seg(0, 10), seg(10, 20), seg(20, 30), seg(30, 40)];
    let err = index_alignment(doc, &tokens, four).unwrap_err();
    assert!(matches!(
        err,
        AlignmentError::AlignmentCountMismatch {
            expected: 3,
            got: 4
        }
    ));
}

#[test]
fn overlap_is_an_order_error() {
    let (doc, tokens) = tokenized(&words_xml(3));
    let err = index_alignment(doc, &tokens, vec![seg(0, 100), seg(90, 200), seg(200, 300)])
        .unwrap_err();
    match err {
        AlignmentError::AlignmentOrder {
            index,
            id,
            previous_end_ms,
            start_ms,
            ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(id, "w1");
            assert_eq!(previous_end_ms, 100);
            assert_eq!(start_ms, 90);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn touching_boundaries_and_gaps_are_allowed() {
    let (doc, tokens) = tokenized(&words_xml(3));
    let aligned =
        index_alignment(doc, &tokens, vec![seg(0, 100), seg(100, 200), seg(500, 600)]).unwrap();
    assert_eq!(aligned.timed_count(), 3);
}

#[test]
fn inverted_segment_is_an_order_error() {
    let (doc, tokens) = tokenized(&words_xml(1));
    let err = index_alignment(doc, &tokens, vec![seg(500, 400)]).unwrap_err();
    assert!(matches!(err, AlignmentError::AlignmentOrder { index: 0, .. }));
}

#[test]
fn zero_length_segments_mark_units_unaligned() {
    let (doc, tokens) = tokenized(&words_xml(3));
    let aligned = index_alignment(
        doc,
        &tokens,
        vec![seg(1000, 1200), AlignmentSegment::unaligned(), seg(1300, 1500)],
    )
    .unwrap();
    assert_eq!(aligned.unaligned_count(), 1);
    let words = aligned.words();
    assert_eq!(words.len(), 3);
    assert_eq!(words[1].id, "w1");
    assert_eq!(words[1].start_ms, None);
    assert_eq!(words[2].start_ms, Some(1300));
}

#[test]
fn echoed_ids_must_match() {
    let (doc, tokens) = tokenized(&words_xml(2));
    let mut segments = vec![seg(0, 10), seg(10, 20)];
    segments[0].id = Some("w0".to_string());
    segments[1].id = Some("w7".to_string());
    let err = index_alignment(doc, &tokens, segments).unwrap_err();
    assert!(matches!(
        err,
        AlignmentError::AlignmentIdMismatch { index: 1, ref expected, ref got }
            if expected == "w1" && got == "w7"
    ));
}

#[test]
fn foreign_token_sequence_is_rejected() {
    let (_, tokens) = tokenized("<s><w id=\"a\">x</w></s>");
    let (other, _) = tokenized("<s><w id=\"b\">x</w></s>");
    let err = index_alignment(other, &tokens, vec![seg(0, 10)]).unwrap_err();
    assert!(matches!(err, AlignmentError::Config { .. }));
}

#[test]
fn words_follow_document_order() {
    let (doc, tokens) = tokenized("<p><s><w id=\"z\">b</w></s><s><w id=\"a\">c</w></s></p>");
    let aligned: AlignedDocument = index_alignment(doc, &tokens, vec![seg(0, 5), seg(5, 9)]).unwrap();
    let ids: Vec<String> = aligned.words().into_iter().map(|w| w.id).collect();
    assert_eq!(ids, ["z", "a"]);
}

fn well_ordered_segments() -> impl Strategy<Value = Vec<AlignmentSegment>> {
    prop::collection::vec((0u64..500, 0u64..500, any::<bool>()), 1..40).prop_map(|steps| {
        let mut cursor = 0u64;
        steps
            .into_iter()
            .map(|(gap, len, sentinel)| {
                if sentinel {
                    return AlignmentSegment::unaligned();
                }
                let start = cursor + gap;
                let end = start + len + 1;
                cursor = end;
                AlignmentSegment::new(start, end)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn well_ordered_replies_time_every_unit(segments in well_ordered_segments()) {
        let (doc, tokens) = tokenized(&words_xml(segments.len()));
        let nodes_before = count_nodes(doc.nodes());
        let sentinels = segments.iter().filter(|s| s.is_unaligned()).count();

        let aligned = index_alignment(doc, &tokens, segments.clone()).unwrap();

        prop_assert_eq!(count_nodes(aligned.nodes()), nodes_before);
        prop_assert_eq!(aligned.timed_count() + aligned.unaligned_count(), tokens.len());
        prop_assert_eq!(aligned.unaligned_count(), sentinels);
        for (word, segment) in aligned.words().iter().zip(&segments) {
            if segment.is_unaligned() {
                prop_assert_eq!(word.start_ms, None);
            } else {
                prop_assert_eq!(word.start_ms, Some(segment.start_ms));
                prop_assert_eq!(word.end_ms, Some(segment.end_ms));
            }
        }
    }

    #[test]
    fn any_count_mismatch_is_rejected(units in 1usize..20, replies in 0usize..25) {
        prop_assume!(units != replies);
        let (doc, tokens) = tokenized(&words_xml(units));
        let segments: Vec<AlignmentSegment> =
            (0..replies as u64).map(|i| seg(i * 10, i * 10 + 5)).collect();
        let err = index_alignment(doc, &tokens, segments).unwrap_err();
        let is_count_mismatch = matches!(
            err,
            AlignmentError::AlignmentCountMismatch { expected, got }
                if expected == units && got == replies
        );
        prop_assert!(is_count_mismatch);
    }

    #[test]
    fn any_overlap_is_rejected(units in 2usize..20, at in 0usize..19, overlap in 1u64..50) {
        prop_assume!(at + 1 < units);
        let (doc, tokens) = tokenized(&words_xml(units));
        let mut segments: Vec<AlignmentSegment> =
            (0..units as u64).map(|i| seg(i * 100, i * 100 + 100)).collect();
        segments[at + 1].start_ms = segments[at].end_ms - overlap;
        let err = index_alignment(doc, &tokens, segments).unwrap_err();
        let is_order_error = matches!(err, AlignmentError::AlignmentOrder { index, .. } if index == at + 1);
        prop_assert!(is_order_error);
    }
}
