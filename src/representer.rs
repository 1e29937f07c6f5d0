//! Walks a composed [`Document`]'s node tree and produces an [`Event`]
//! stream, the mirror image of the [`Document`] composer (spec §4.5).
//!
//! Unlike the reference implementation this crate is grounded on, node
//! sharing is already explicit in the [`Node`] model: the composer turns
//! every alias into an [`NodeKind::Alias`] leaf carrying the anchor name,
//! so representing a tree back to events never needs to rediscover
//! sharing by reference counting. It only needs to replay the anchors
//! and styles already recorded on each node.

use crate::{
    Document, Event, Node, NodeId, NodeKind, Resolver, ScalarStyle, SequenceStyle, MappingStyle,
};

/// Tunable presentation knobs applied while representing a [`Document`]
/// as events, analogous to [`EmitterOptions`](crate::EmitterOptions) on
/// the byte-rendering side.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct RepresenterOptions {
    /// When set, a block-style sequence or mapping whose children are
    /// all scalars, and whose estimated flow rendering fits within
    /// `line_width`, is represented as flow style instead (spec §4.5).
    pub flow_simple_collections: bool,
    /// The width budget used by the `flow_simple_collections` heuristic.
    /// Matches [`EmitterOptions::width`](crate::EmitterOptions::width)'s
    /// default.
    pub line_width: i32,
}

impl Default for RepresenterOptions {
    fn default() -> Self {
        RepresenterOptions {
            flow_simple_collections: false,
            line_width: 80,
        }
    }
}

/// Turns a composed [`Document`] back into an [`Event`] stream.
///
/// Produces only the `DOCUMENT-START .. DOCUMENT-END` run for one
/// document; `STREAM-START`/`STREAM-END` framing is [`Dumper`](crate::Dumper)'s
/// job, same as [`Loader`](crate::Loader) owns `STREAM-START` detection
/// on the input side while [`Document`] composes one document at a time.
#[non_exhaustive]
pub struct Representer {
    options: RepresenterOptions,
    resolver: Resolver,
}

impl Default for Representer {
    fn default() -> Self {
        Self::new()
    }
}

impl Representer {
    /// A representer with default options and the YAML 1.2 core schema
    /// resolver (used only to decide when an implicitly-tagged string
    /// needs forced quoting to keep from being read back as another
    /// type).
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(RepresenterOptions::default())
    }

    #[must_use]
    pub fn with_options(options: RepresenterOptions) -> Self {
        Representer {
            options,
            resolver: Resolver::new(),
        }
    }

    /// Use a non-default resolver (e.g. [`Resolver::legacy`]) to decide
    /// forced quoting, matching whatever resolver composed the document.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Represent one document as an event run bracketed by
    /// `DOCUMENT-START`/`DOCUMENT-END`.
    #[must_use]
    pub fn represent_document(&self, document: &Document) -> Vec<Event> {
        let mut events = Vec::with_capacity(document.nodes.len() * 2 + 2);

        let mut start = Event::document_start(
            document.version_directive,
            &document.tag_directives,
            document.start_implicit,
        );
        start.start_mark = document.start_mark;
        events.push(start);

        if let Some(root) = document.root_id() {
            self.represent_node(document, root, &mut events);
        }

        let mut end = Event::document_end(document.end_implicit);
        end.end_mark = document.end_mark;
        events.push(end);
        events
    }

    fn represent_node(&self, document: &Document, id: NodeId, events: &mut Vec<Event>) {
        let node = document.get(id).expect("representer walked a dangling NodeId");
        match &node.kind {
            NodeKind::Scalar { value } => self.represent_scalar(node, value, events),
            NodeKind::Sequence { content, style } => {
                self.represent_sequence(document, node, content, *style, events);
            }
            NodeKind::Mapping { content, style } => {
                self.represent_mapping(document, node, content, *style, events);
            }
            NodeKind::Alias(anchor) => {
                let mut event = Event::alias(anchor);
                Self::copy_comments(node, &mut event);
                event.start_mark = node.start_mark;
                event.end_mark = node.end_mark;
                events.push(event);
            }
        }
    }

    fn represent_scalar(&self, node: &Node, value: &str, events: &mut Vec<Event>) {
        let style = self.scalar_style(node, value);
        let plain_implicit =
            node.tag_implicit && self.resolver.resolve_implicit(value) == node.tag;
        let quoted_implicit = node.tag_implicit && node.tag == crate::STR_TAG;

        let mut event = Event::scalar(
            node.anchor.as_deref(),
            (!node.tag_implicit).then_some(node.tag.as_str()),
            value,
            plain_implicit,
            quoted_implicit,
            style,
        );
        Self::copy_comments(node, &mut event);
        event.start_mark = node.start_mark;
        event.end_mark = node.end_mark;
        events.push(event);
    }

    /// Pick the scalar's presentation style: honor an explicit style
    /// recorded on the node, otherwise fall back to plain unless the
    /// value needs a block style (contains a newline) or forced quoting
    /// (an implicitly-`!!str`-tagged value that would resolve to a
    /// different type if read back in plain style).
    fn scalar_style(&self, node: &Node, value: &str) -> ScalarStyle {
        if let Some(explicit) = node.style.scalar_presentation() {
            return explicit.to_scalar_style();
        }
        if value.contains('\n') {
            return ScalarStyle::Literal;
        }
        if node.tag == crate::STR_TAG && self.resolver.resolve_implicit(value) != crate::STR_TAG {
            return ScalarStyle::DoubleQuoted;
        }
        ScalarStyle::Plain
    }

    fn represent_sequence(
        &self,
        document: &Document,
        node: &Node,
        content: &[NodeId],
        style: SequenceStyle,
        events: &mut Vec<Event>,
    ) {
        let style = self.resolve_sequence_style(document, content, style);
        let mut start = Event::sequence_start(
            node.anchor.as_deref(),
            (!node.tag_implicit).then_some(node.tag.as_str()),
            node.tag_implicit,
            style,
        );
        Self::copy_comments(node, &mut start);
        start.start_mark = node.start_mark;
        events.push(start);

        for &child in content {
            self.represent_node(document, child, events);
        }

        let mut end = Event::sequence_end();
        end.end_mark = node.end_mark;
        events.push(end);
    }

    fn represent_mapping(
        &self,
        document: &Document,
        node: &Node,
        content: &[NodeId],
        style: MappingStyle,
        events: &mut Vec<Event>,
    ) {
        let style = self.resolve_mapping_style(document, content, style);
        let mut start = Event::mapping_start(
            node.anchor.as_deref(),
            (!node.tag_implicit).then_some(node.tag.as_str()),
            node.tag_implicit,
            style,
        );
        Self::copy_comments(node, &mut start);
        start.start_mark = node.start_mark;
        events.push(start);

        debug_assert_eq!(content.len() % 2, 0, "mapping content must have even length");
        for pair in content.chunks_exact(2) {
            self.represent_node(document, pair[0], events);
            self.represent_node(document, pair[1], events);
        }

        let mut end = Event::mapping_end();
        end.end_mark = node.end_mark;
        events.push(end);
    }

    fn resolve_sequence_style(
        &self,
        document: &Document,
        content: &[NodeId],
        style: SequenceStyle,
    ) -> SequenceStyle {
        if matches!(style, SequenceStyle::Flow)
            || !self.options.flow_simple_collections
            || !self.fits_as_flow(document, content)
        {
            return style;
        }
        SequenceStyle::Flow
    }

    fn resolve_mapping_style(
        &self,
        document: &Document,
        content: &[NodeId],
        style: MappingStyle,
    ) -> MappingStyle {
        if matches!(style, MappingStyle::Flow)
            || !self.options.flow_simple_collections
            || !self.fits_as_flow(document, content)
        {
            return style;
        }
        MappingStyle::Flow
    }

    /// Estimate whether a collection made only of plain scalar children
    /// would fit on one line in flow style within the configured
    /// `line_width`. A crude sum of value lengths plus separators and
    /// brackets — good enough for a heuristic, not a budget guarantee.
    fn fits_as_flow(&self, document: &Document, content: &[NodeId]) -> bool {
        if content.is_empty() {
            return true;
        }
        let mut width = 2usize; // surrounding brackets
        for &id in content {
            let node = document.get(id).expect("dangling NodeId in collection content");
            let NodeKind::Scalar { value } = &node.kind else {
                return false;
            };
            if value.contains('\n') || !node.head_comment.is_empty() || !node.line_comment.is_empty()
            {
                return false;
            }
            width += value.len() + 2; // ", " separator
        }
        self.options.line_width < 0 || width <= self.options.line_width as usize
    }

    fn copy_comments(node: &Node, event: &mut Event) {
        event.head_comment.clone_from(&node.head_comment);
        event.line_comment.clone_from(&node.line_comment);
        event.foot_comment.clone_from(&node.foot_comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    fn load(input: &'static [u8]) -> Document {
        let mut input = input;
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        Document::load(&mut parser).unwrap()
    }

    #[test]
    fn plain_scalars_stay_plain() {
        let document = load(b"key: value\n");
        let representer = Representer::new();
        let events = representer.represent_document(&document);
        let scalar_styles: Vec<ScalarStyle> = events
            .iter()
            .filter_map(|event| match &event.data {
                crate::EventData::Scalar { style, .. } => Some(*style),
                _ => None,
            })
            .collect();
        assert_eq!(scalar_styles, vec![ScalarStyle::Plain, ScalarStyle::Plain]);
    }

    #[test]
    fn multiline_scalars_represent_as_literal() {
        let document = load(b"key: |\n  a\n  b\n");
        let representer = Representer::new();
        let events = representer.represent_document(&document);
        let value_style = events
            .iter()
            .filter_map(|event| match &event.data {
                crate::EventData::Scalar { value, style, .. } if value.contains('\n') => {
                    Some(*style)
                }
                _ => None,
            })
            .next();
        assert_eq!(value_style, Some(ScalarStyle::Literal));
    }

    #[test]
    fn a_string_that_would_resolve_to_another_tag_is_forced_to_quote() {
        // An explicit `!!str` tag on an otherwise-plain scalar leaves the
        // node with no recorded presentation style, so this exercises the
        // representer's forced-quoting fallback rather than a style the
        // composer already recorded.
        let document = load(b"key: !!str 123\n");
        let representer = Representer::new();
        let events = representer.represent_document(&document);
        let value_style = events
            .iter()
            .filter_map(|event| match &event.data {
                crate::EventData::Scalar { value, style, .. } if value == "123" => Some(*style),
                _ => None,
            })
            .next();
        assert_eq!(value_style, Some(ScalarStyle::DoubleQuoted));
    }

    #[test]
    fn anchors_and_aliases_round_trip_through_representation() {
        let document = load(b"- &x 7\n- *x\n");
        let representer = Representer::new();
        let events = representer.represent_document(&document);
        assert!(events
            .iter()
            .any(|event| matches!(&event.data, crate::EventData::Scalar { anchor, .. } if anchor.as_deref() == Some("x"))));
        assert!(events
            .iter()
            .any(|event| matches!(&event.data, crate::EventData::Alias { anchor } if anchor == "x")));
    }

    #[test]
    fn flow_simple_collections_reflows_a_short_block_sequence() {
        let document = load(b"- 1\n- 2\n- 3\n");
        let representer = Representer::with_options(RepresenterOptions {
            flow_simple_collections: true,
            line_width: 80,
        });
        let events = representer.represent_document(&document);
        let style = events
            .iter()
            .find_map(|event| match &event.data {
                crate::EventData::SequenceStart { style, .. } => Some(*style),
                _ => None,
            })
            .unwrap();
        assert_eq!(style, SequenceStyle::Flow);
    }

    #[test]
    fn flow_simple_collections_leaves_block_style_when_disabled() {
        let document = load(b"- 1\n- 2\n- 3\n");
        let representer = Representer::new();
        let events = representer.represent_document(&document);
        let style = events
            .iter()
            .find_map(|event| match &event.data {
                crate::EventData::SequenceStart { style, .. } => Some(*style),
                _ => None,
            })
            .unwrap();
        assert_eq!(style, SequenceStyle::Block);
    }

    #[test]
    fn head_line_and_foot_comments_copy_onto_the_event() {
        let document = load(b"# head\nkey: value  # line\n# foot\n");
        let representer = Representer::new();
        let events = representer.represent_document(&document);
        let key_event = events
            .iter()
            .find(|event| matches!(&event.data, crate::EventData::Scalar { value, .. } if value == "key"))
            .unwrap();
        assert_eq!(key_event.head_comment, "head");
        assert_eq!(key_event.line_comment, "line");
        let mapping_start = events
            .iter()
            .find(|event| matches!(event.data, crate::EventData::MappingStart { .. }))
            .unwrap();
        assert_eq!(mapping_start.foot_comment, "foot");
    }
}
