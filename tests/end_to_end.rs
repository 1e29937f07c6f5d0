//! End-to-end scenarios exercising the full Reader→Scanner→Parser→Composer
//! pipeline, and its Representer→Emitter mirror, against known inputs.

use pretty_assertions::assert_eq;

use yaml_core::{Document, EventData, Loader, LoaderOptions, NodeKind, NodeStyle, Parser, SequenceStyle};

fn parse_all(input: &[u8]) -> Vec<EventData> {
    let mut input = input;
    let mut parser = Parser::new();
    parser.set_input(&mut input);
    let mut events = Vec::new();
    loop {
        let event = parser.parse().unwrap();
        let done = matches!(event.data, EventData::StreamEnd);
        events.push(event.data);
        if done {
            break;
        }
    }
    events
}

#[test]
fn scenario_1_simple_mapping() {
    let events = parse_all(b"key: value");
    let kinds: Vec<&str> = events
        .iter()
        .map(|data| match data {
            EventData::StreamStart { .. } => "+STR",
            EventData::StreamEnd => "-STR",
            EventData::DocumentStart { .. } => "+DOC",
            EventData::DocumentEnd { .. } => "-DOC",
            EventData::MappingStart { .. } => "+MAP",
            EventData::MappingEnd => "-MAP",
            EventData::Scalar { .. } => "=VAL",
            other => panic!("unexpected event in a simple mapping: {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["+STR", "+DOC", "+MAP", "=VAL", "=VAL", "-MAP", "-DOC", "-STR"]
    );

    let values: Vec<&str> = events
        .iter()
        .filter_map(|data| match data {
            EventData::Scalar { value, .. } => Some(value.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(values, vec!["key", "value"]);
}

#[test]
fn scenario_2_flow_sequence_of_ints() {
    let mut input: &[u8] = b"[1, 2, 3]";
    let mut parser = Parser::new();
    parser.set_input(&mut input);
    let document = Document::load(&mut parser).unwrap();
    let root = document.root().unwrap();

    let NodeKind::Sequence { content, style } = &root.kind else {
        panic!("expected a sequence root, found {:?}", root.kind);
    };
    assert_eq!(*style, SequenceStyle::Flow);
    assert!(root.style.contains(NodeStyle::FLOW));

    let values: Vec<&str> = content
        .iter()
        .map(|&id| {
            let node = document.get(id).unwrap();
            assert_eq!(node.tag, yaml_core::INT_TAG);
            let NodeKind::Scalar { value } = &node.kind else {
                panic!("expected a scalar element");
            };
            value.as_str()
        })
        .collect();
    assert_eq!(values, vec!["1", "2", "3"]);
}

#[test]
fn scenario_3_anchor_and_alias() {
    let mut input: &[u8] = b"- &x 7\n- *x\n";
    let mut parser = Parser::new();
    parser.set_input(&mut input);
    let document = Document::load(&mut parser).unwrap();
    let root = document.root().unwrap();

    let NodeKind::Sequence { content, .. } = &root.kind else {
        panic!("expected a sequence root");
    };
    assert_eq!(content.len(), 2);

    let first = document.get(content[0]).unwrap();
    assert_eq!(first.anchor.as_deref(), Some("x"));
    let NodeKind::Scalar { value } = &first.kind else {
        panic!("expected a scalar");
    };
    assert_eq!(value, "7");

    let second = document.get(content[1]).unwrap();
    let NodeKind::Alias(name) = &second.kind else {
        panic!("expected an alias, found {:?}", second.kind);
    };
    assert_eq!(name, "x");

    let resolved = document.anchor("x").unwrap();
    let NodeKind::Scalar { value } = &resolved.kind else {
        panic!("expected the anchor to resolve to a scalar");
    };
    assert_eq!(value, "7");
}

#[test]
fn scenario_4_literal_block_scalar() {
    let mut input: &[u8] = b"key: |\n  line1\n  line2\n";
    let mut parser = Parser::new();
    parser.set_input(&mut input);
    let document = Document::load(&mut parser).unwrap();
    let root = document.root().unwrap();

    let NodeKind::Mapping { content, .. } = &root.kind else {
        panic!("expected a mapping root");
    };
    assert_eq!(content.len(), 2);
    let value_node = document.get(content[1]).unwrap();
    let NodeKind::Scalar { value } = &value_node.kind else {
        panic!("expected a scalar value");
    };
    assert_eq!(value, "line1\nline2\n");
    assert_eq!(value_node.tag, yaml_core::STR_TAG);
    assert_eq!(
        value_node.style.scalar_presentation(),
        Some(NodeStyle::LITERAL)
    );
}

#[test]
fn scenario_5_comment_placement() {
    let mut input: &[u8] = b"# head\nkey: value  # line\n# foot\n";
    let mut parser = Parser::new();
    parser.set_input(&mut input);
    let document = Document::load(&mut parser).unwrap();
    let root = document.root().unwrap();

    let NodeKind::Mapping { content, .. } = &root.kind else {
        panic!("expected a mapping root");
    };
    let key_node = document.get(content[0]).unwrap();
    assert_eq!(key_node.head_comment, "head");
    assert_eq!(key_node.line_comment, "line");
    assert_eq!(root.foot_comment, "foot");
}

#[test]
fn scenario_6_multi_document_error_in_single_document_mode() {
    let mut input: &[u8] = b"---\na: 1\n---\nb: 2\n";
    let mut loader = Loader::with_options(
        &mut input,
        LoaderOptions {
            single_document: true,
            ..LoaderOptions::default()
        },
    );
    assert!(loader.load().unwrap().is_some());
    let err = loader.load().unwrap_err();
    assert_eq!(err.to_string(), "expected single document, found multiple");
}

#[test]
fn node_round_trip_through_represent_and_compose() {
    let mut input: &[u8] = b"a: 1\nb: [2, 3]\n";
    let mut parser = Parser::new();
    parser.set_input(&mut input);
    let document = Document::load(&mut parser).unwrap();

    let mut output = Vec::new();
    let mut emitter = yaml_core::Emitter::new();
    emitter.set_output(&mut output);
    document.dump(&mut emitter).unwrap();

    let mut roundtrip_input: &[u8] = &output;
    let mut parser = Parser::new();
    parser.set_input(&mut roundtrip_input);
    let roundtrip = Document::load(&mut parser).unwrap();

    let NodeKind::Mapping { content, .. } = &roundtrip.root().unwrap().kind else {
        panic!("expected a mapping root after round trip");
    };
    assert_eq!(content.len(), 4);
}

#[test]
fn empty_input_produces_only_stream_framing() {
    let events = parse_all(b"");
    assert!(matches!(events[0], EventData::StreamStart { .. }));
    assert!(matches!(events.last().unwrap(), EventData::StreamEnd));
}

#[test]
fn dumper_open_and_close_track_emitter_lifecycle() {
    let mut output = Vec::new();
    let mut emitter = yaml_core::Emitter::new();
    emitter.set_output(&mut output);
    let dumper = yaml_core::Dumper::new();
    assert!(!emitter.is_opened());
    dumper.open(&mut emitter).unwrap();
    assert!(emitter.is_opened());
    assert!(!emitter.is_closed());
    dumper.close(&mut emitter).unwrap();
    assert!(emitter.is_closed());
}
