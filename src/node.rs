use std::collections::HashMap;

use crate::{
    ComposerError, Event, EventData, MappingStyle, Mark, NodeStyle, Parser, Resolver,
    SequenceStyle, TagDirective, VersionDirective,
};

/// An index into a [`Document`]'s node arena.
///
/// Stable for the lifetime of the `Document` that produced it; indices from
/// one document are not meaningful against another.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(usize);

/// A node anchor definition, recorded as it is encountered during
/// composition so later aliases can resolve against it.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct AliasData {
    /// The anchor name.
    pub anchor: String,
    /// The node the anchor refers to.
    pub index: NodeId,
    /// Where the anchor was first defined.
    pub mark: Mark,
}

/// A single node in the composed tree.
///
/// Nodes live in a flat arena ([`Document::nodes`]) and refer to each other
/// by [`NodeId`] rather than by reference, so cycles created by aliases
/// never become Rust reference cycles.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Node {
    /// The node's shape and content.
    pub kind: NodeKind,
    /// The resolved or explicit tag, e.g. `tag:yaml.org,2002:str`.
    pub tag: String,
    /// Was the tag implicit (resolved), as opposed to explicitly written?
    pub tag_implicit: bool,
    /// The anchor name, if this node was anchored (`&name`).
    pub anchor: Option<String>,
    /// Presentation style bits (flow/quoting/block scalar style).
    pub style: NodeStyle,
    /// Comment(s) on their own line(s) immediately before this node.
    pub head_comment: String,
    /// A trailing comment on the same line as this node.
    pub line_comment: String,
    /// Comment(s) attributed to this node after it closes.
    pub foot_comment: String,
    /// The beginning of the node.
    pub start_mark: Mark,
    /// The end of the node.
    pub end_mark: Mark,
}

impl Node {
    /// Decode this node's value as bytes, for a scalar tagged `!!binary`
    /// (spec §4.5's binary scalar round trip): the value text is the
    /// base64 encoding, whether it arrived that way in the source or was
    /// produced by [`Document::push_binary_scalar`].
    ///
    /// Returns `None` for anything other than a `!!binary`-tagged scalar,
    /// or if the value isn't valid base64.
    #[must_use]
    pub fn as_binary(&self) -> Option<Vec<u8>> {
        use base64::Engine;
        if self.tag != crate::BINARY_TAG {
            return None;
        }
        let NodeKind::Scalar { value } = &self.kind else {
            return None;
        };
        base64::engine::general_purpose::STANDARD.decode(value).ok()
    }
}

/// The shape-specific content of a [`Node`].
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A scalar value.
    Scalar {
        /// The scalar's textual value.
        value: String,
    },
    /// An ordered sequence of nodes.
    Sequence {
        /// The sequence's elements, in order.
        content: Vec<NodeId>,
        /// Block or flow presentation.
        style: SequenceStyle,
    },
    /// A mapping, stored as a flat alternating `[key0, value0, key1,
    /// value1, ...]` list rather than pairs, matching how the composer
    /// builds it incrementally off the event stream.
    Mapping {
        /// `content.len()` is always even; `content[2*i]` is the i-th key
        /// and `content[2*i + 1]` is the i-th value.
        content: Vec<NodeId>,
        /// Block or flow presentation.
        style: MappingStyle,
    },
    /// An alias reference to an anchored node.
    Alias(String),
}

/// A composed YAML document: an arena of [`Node`]s plus the anchor table
/// and directive state in effect for this document.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Document {
    /// The node arena. Index 0, if present, is always the document root.
    pub nodes: Vec<Node>,
    /// Anchor name to defining node lookup, for alias resolution during
    /// composition and for inspecting anchors afterward.
    pub anchors: HashMap<String, NodeId>,
    /// The version directive in effect (`%YAML major.minor`), if any.
    pub version_directive: Option<VersionDirective>,
    /// The tag directives in effect (`%TAG handle prefix`), beyond the
    /// implicit `!` and `!!` defaults.
    pub tag_directives: Vec<TagDirective>,
    /// Was the document start indicator (`---`) implicit?
    pub start_implicit: bool,
    /// Was the document end indicator (`...`) implicit?
    pub end_implicit: bool,
    /// The beginning of the document.
    pub start_mark: Mark,
    /// The end of the document.
    pub end_mark: Mark,
}

/// Composition-time state threaded through [`Document::load_nodes`]: the
/// stack of still-open collections and comment text waiting to be
/// attached to the next node produced.
struct ComposerCtx {
    open: Vec<NodeId>,
    pending_head: String,
    pending_stem: String,
}

impl ComposerCtx {
    fn take_comments(&mut self) -> String {
        let mut head = core::mem::take(&mut self.pending_stem);
        if !self.pending_head.is_empty() {
            if !head.is_empty() {
                head.push('\n');
            }
            head.push_str(&core::mem::take(&mut self.pending_head));
        }
        head
    }
}

impl Document {
    fn new() -> Document {
        Document {
            nodes: Vec::with_capacity(16),
            anchors: HashMap::new(),
            version_directive: None,
            tag_directives: Vec::new(),
            start_implicit: false,
            end_implicit: false,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// The document's root node, if the document is non-empty.
    ///
    /// A document produced by the parser with no root signals the end of
    /// the stream (spec §5).
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// The id of the document's root node, if the document is non-empty.
    #[must_use]
    pub fn root_id(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    /// Look up an anchor by name.
    #[must_use]
    pub fn anchor(&self, name: &str) -> Option<&Node> {
        self.anchors.get(name).and_then(|id| self.get(*id))
    }

    /// Push a new, unanchored `!!binary` scalar node holding `bytes`,
    /// base64-encoded (spec §4.5's binary scalar round trip), and return
    /// its id so a caller can splice it into a sequence or mapping being
    /// built by hand.
    pub fn push_binary_scalar(&mut self, bytes: &[u8]) -> NodeId {
        use base64::Engine;
        let value = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.push_node(Node {
            kind: NodeKind::Scalar { value },
            tag: crate::BINARY_TAG.to_string(),
            tag_implicit: false,
            anchor: None,
            style: NodeStyle::empty(),
            head_comment: String::new(),
            line_comment: String::new(),
            foot_comment: String::new(),
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        })
    }

    /// Parse the input stream and compose the next document.
    ///
    /// Call this repeatedly to walk a multi-document stream. A returned
    /// document with an empty `nodes` arena (no root) marks the end of the
    /// stream.
    pub fn load(parser: &mut Parser) -> Result<Document, ComposerError> {
        Self::load_with_resolver(parser, &Resolver::new())
    }

    /// Like [`Document::load`], but resolves implicit tags with the given
    /// [`Resolver`] instead of the default YAML 1.2 core schema resolver.
    pub fn load_with_resolver(
        parser: &mut Parser,
        resolver: &Resolver,
    ) -> Result<Document, ComposerError> {
        Self::load_with_options(parser, resolver, false)
    }

    /// Like [`Document::load_with_resolver`], additionally selecting the
    /// comment-attachment rule used when a block collection closes with a
    /// trailing comment still pending: the default rule attaches it to the
    /// collection itself, while `legacy_comments` attaches it to the
    /// collection's last child instead (spec §6's `v3_legacy_comments`
    /// loader option).
    pub fn load_with_options(
        parser: &mut Parser,
        resolver: &Resolver,
        legacy_comments: bool,
    ) -> Result<Document, ComposerError> {
        let mut document = Document::new();

        if !parser.stream_start_produced {
            match parser.parse()? {
                Event {
                    data: EventData::StreamStart { .. },
                    ..
                } => (),
                _ => panic!("expected stream start"),
            }
        }
        if parser.stream_end_produced {
            return Ok(document);
        }

        let event = parser.parse()?;
        if matches!(event.data, EventData::StreamEnd) {
            return Ok(document);
        }

        parser.aliases.reserve(16);
        let result = document.load_document(parser, event, resolver, legacy_comments);
        parser.delete_aliases();
        result?;
        Ok(document)
    }

    fn problem<T>(problem: &'static str, mark: Mark) -> Result<T, ComposerError> {
        Err(ComposerError::Problem { problem, mark })
    }

    fn problem_with_context<T>(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    ) -> Result<T, ComposerError> {
        Err(ComposerError::ProblemWithContext {
            context,
            context_mark,
            problem,
            mark,
        })
    }

    fn load_document(
        &mut self,
        parser: &mut Parser,
        event: Event,
        resolver: &Resolver,
        legacy_comments: bool,
    ) -> Result<(), ComposerError> {
        let EventData::DocumentStart {
            version_directive,
            tag_directives,
            implicit,
        } = event.data
        else {
            panic!("expected document start event")
        };
        self.version_directive = version_directive;
        self.tag_directives = tag_directives;
        self.start_implicit = implicit;
        self.start_mark = event.start_mark;

        let mut ctx = ComposerCtx {
            open: Vec::with_capacity(16),
            pending_head: event.head_comment,
            pending_stem: String::new(),
        };
        self.load_nodes(parser, &mut ctx, resolver, legacy_comments)
    }

    fn load_nodes(
        &mut self,
        parser: &mut Parser,
        ctx: &mut ComposerCtx,
        resolver: &Resolver,
        legacy_comments: bool,
    ) -> Result<(), ComposerError> {
        loop {
            let event = parser.parse()?;
            log::trace!("composer consuming {:?}", event.data);
            match event.data {
                EventData::DocumentEnd { implicit } => {
                    self.end_implicit = implicit;
                    self.end_mark = event.end_mark;
                    return Ok(());
                }
                EventData::Alias { .. } => self.load_alias(event, ctx)?,
                EventData::Scalar { .. } => self.load_scalar(parser, event, ctx, resolver)?,
                EventData::SequenceStart { .. } => self.load_sequence(parser, event, ctx)?,
                EventData::SequenceEnd => self.close_collection(event, ctx, legacy_comments),
                EventData::MappingStart { .. } => self.load_mapping(parser, event, ctx)?,
                EventData::MappingEnd => self.close_collection(event, ctx, legacy_comments),
                EventData::TailComment { comment } => self.attach_tail_comment(ctx, &comment),
                other => panic!("unexpected event in document body: {other:?}"),
            }
        }
    }

    fn attach_tail_comment(&mut self, ctx: &ComposerCtx, comment: &str) {
        let target = ctx
            .open
            .last()
            .copied()
            .or_else(|| self.nodes.len().checked_sub(1).map(NodeId));
        if let Some(id) = target {
            let node = &mut self.nodes[id.0];
            if node.foot_comment.is_empty() {
                node.foot_comment = comment.to_string();
            } else {
                node.foot_comment.push('\n');
                node.foot_comment.push_str(comment);
            }
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Register an anchor for the node just pushed. A later definition of
    /// the same anchor name silently overwrites the earlier one: YAML
    /// semantics are last-defined-wins, so aliases always resolve to the
    /// most recent preceding binding rather than erroring on rebind.
    fn register_anchor(&mut self, parser: &mut Parser, id: NodeId, anchor: Option<String>) {
        let Some(anchor) = anchor else {
            return;
        };
        let mark = self.nodes[id.0].start_mark;
        if let Some(existing) = parser.aliases.iter_mut().find(|a| a.anchor == anchor) {
            log::debug!("composer anchor {:?} redefined, overwriting prior binding", anchor);
            existing.index = id;
            existing.mark = mark;
        } else {
            log::debug!("composer anchor {:?} registered", anchor);
            parser.aliases.push(AliasData {
                anchor: anchor.clone(),
                index: id,
                mark,
            });
        }
        self.anchors.insert(anchor.clone(), id);
        self.nodes[id.0].anchor = Some(anchor);
    }

    fn attach(&mut self, ctx: &mut ComposerCtx, id: NodeId) {
        let Some(&parent_id) = ctx.open.last() else {
            return;
        };
        match &mut self.nodes[parent_id.0].kind {
            NodeKind::Sequence { content, .. } | NodeKind::Mapping { content, .. } => {
                content.push(id);
            }
            _ => panic!("open composer context is not a collection"),
        }
    }

    fn load_alias(&mut self, event: Event, ctx: &mut ComposerCtx) -> Result<(), ComposerError> {
        let EventData::Alias { anchor } = &event.data else {
            unreachable!()
        };
        if !self.anchors.contains_key(anchor) {
            return Self::problem("found undefined alias", event.start_mark);
        }
        let id = self.push_node(Node {
            kind: NodeKind::Alias(anchor.clone()),
            tag: String::new(),
            tag_implicit: true,
            anchor: None,
            style: NodeStyle::empty(),
            head_comment: ctx.take_comments(),
            line_comment: event.line_comment,
            foot_comment: event.foot_comment,
            start_mark: event.start_mark,
            end_mark: event.end_mark,
        });
        self.attach(ctx, id);
        Ok(())
    }

    fn load_scalar(
        &mut self,
        parser: &mut Parser,
        event: Event,
        ctx: &mut ComposerCtx,
        resolver: &Resolver,
    ) -> Result<(), ComposerError> {
        let EventData::Scalar {
            anchor,
            tag,
            value,
            plain_implicit,
            quoted_implicit,
            style,
        } = event.data
        else {
            unreachable!()
        };

        let (tag, tag_implicit) = match tag {
            Some(tag) if tag != "!" => (tag, false),
            _ => (
                resolver
                    .resolve_scalar(&value, style, plain_implicit || quoted_implicit)
                    .to_string(),
                true,
            ),
        };

        let head_comment = ctx.take_comments();
        let mut node_style = NodeStyle::from_scalar_style(style);
        if !tag_implicit {
            node_style |= NodeStyle::TAGGED;
        }
        let id = self.push_node(Node {
            kind: NodeKind::Scalar { value },
            tag,
            tag_implicit,
            anchor: None,
            style: node_style,
            head_comment,
            line_comment: event.line_comment,
            foot_comment: event.foot_comment,
            start_mark: event.start_mark,
            end_mark: event.end_mark,
        });
        self.register_anchor(parser, id, anchor);
        self.attach(ctx, id);
        Ok(())
    }

    fn load_sequence(
        &mut self,
        parser: &mut Parser,
        event: Event,
        ctx: &mut ComposerCtx,
    ) -> Result<(), ComposerError> {
        let EventData::SequenceStart {
            anchor,
            tag,
            style,
            stem_comment,
            ..
        } = event.data
        else {
            unreachable!()
        };

        let (tag, tag_implicit) = match tag {
            Some(tag) if tag != "!" => (tag, false),
            _ => (String::from(crate::DEFAULT_SEQUENCE_TAG), true),
        };

        ctx.pending_stem = stem_comment;
        let head_comment = ctx.take_comments();
        let mut node_style = if matches!(style, SequenceStyle::Flow) {
            NodeStyle::FLOW
        } else {
            NodeStyle::empty()
        };
        if !tag_implicit {
            node_style |= NodeStyle::TAGGED;
        }
        let id = self.push_node(Node {
            kind: NodeKind::Sequence {
                content: Vec::new(),
                style,
            },
            tag,
            tag_implicit,
            anchor: None,
            style: node_style,
            head_comment,
            line_comment: event.line_comment,
            foot_comment: String::new(),
            start_mark: event.start_mark,
            end_mark: event.end_mark,
        });
        self.register_anchor(parser, id, anchor);
        self.attach(ctx, id);
        ctx.open.push(id);
        Ok(())
    }

    fn load_mapping(
        &mut self,
        parser: &mut Parser,
        event: Event,
        ctx: &mut ComposerCtx,
    ) -> Result<(), ComposerError> {
        let EventData::MappingStart {
            anchor,
            tag,
            style,
            stem_comment,
            ..
        } = event.data
        else {
            unreachable!()
        };

        let (tag, tag_implicit) = match tag {
            Some(tag) if tag != "!" => (tag, false),
            _ => (String::from(crate::DEFAULT_MAPPING_TAG), true),
        };

        ctx.pending_stem = stem_comment;
        let head_comment = ctx.take_comments();
        let mut node_style = if matches!(style, MappingStyle::Flow) {
            NodeStyle::FLOW
        } else {
            NodeStyle::empty()
        };
        if !tag_implicit {
            node_style |= NodeStyle::TAGGED;
        }
        let id = self.push_node(Node {
            kind: NodeKind::Mapping {
                content: Vec::new(),
                style,
            },
            tag,
            tag_implicit,
            anchor: None,
            style: node_style,
            head_comment,
            line_comment: event.line_comment,
            foot_comment: String::new(),
            start_mark: event.start_mark,
            end_mark: event.end_mark,
        });
        self.register_anchor(parser, id, anchor);
        self.attach(ctx, id);
        ctx.open.push(id);
        Ok(())
    }

    fn close_collection(&mut self, event: Event, ctx: &mut ComposerCtx, legacy_comments: bool) {
        let id = ctx.open.pop().expect("unbalanced collection close");
        self.nodes[id.0].end_mark = event.end_mark;
        if event.foot_comment.is_empty() {
            return;
        }

        // Default rule: the comment belongs to the collection that just
        // closed. `legacy_comments` instead attributes it to the
        // collection's last child, matching the older attachment rule
        // (spec §6's `v3_legacy_comments`).
        let target = if legacy_comments {
            match &self.nodes[id.0].kind {
                NodeKind::Sequence { content, .. } | NodeKind::Mapping { content, .. } => {
                    content.last().copied()
                }
                _ => None,
            }
            .unwrap_or(id)
        } else {
            id
        };

        let node = &mut self.nodes[target.0];
        if node.foot_comment.is_empty() {
            node.foot_comment = event.foot_comment;
        } else {
            node.foot_comment.push('\n');
            node.foot_comment.push_str(&event.foot_comment);
        }
    }

    /// Represent and emit this document as a complete, self-contained
    /// YAML stream: opens `emitter` if it hasn't been already, emits
    /// this document, then closes the stream.
    ///
    /// To write several documents into one stream, drive
    /// [`Dumper`](crate::Dumper) directly instead.
    pub fn dump(&self, emitter: &mut crate::Emitter) -> Result<(), crate::DumpError> {
        crate::Dumper::new().dump_one(emitter, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_id_is_none_for_an_empty_document() {
        let document = Document::new();
        assert!(document.root_id().is_none());
        assert!(document.root().is_none());
    }

    #[test]
    fn binary_scalar_round_trips_through_base64() {
        let mut document = Document::new();
        let id = document.push_binary_scalar(&[0xde, 0xad, 0xbe, 0xef]);
        let node = document.get(id).unwrap();
        assert_eq!(node.tag, crate::BINARY_TAG);
        assert_eq!(node.as_binary().unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn as_binary_is_none_for_non_binary_scalars() {
        let mut document = Document::new();
        let id = document.push_node(Node {
            kind: NodeKind::Scalar {
                value: "hello".to_string(),
            },
            tag: crate::STR_TAG.to_string(),
            tag_implicit: true,
            anchor: None,
            style: NodeStyle::empty(),
            head_comment: String::new(),
            line_comment: String::new(),
            foot_comment: String::new(),
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        });
        assert!(document.get(id).unwrap().as_binary().is_none());
    }

    #[test]
    fn a_later_anchor_definition_overwrites_an_earlier_one() {
        let mut input: &[u8] = b"- &a one\n- &a two\n- *a\n";
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        let document = Document::load(&mut parser).unwrap();
        let root = document.root().unwrap();
        let NodeKind::Sequence { content, .. } = &root.kind else {
            panic!("expected a sequence");
        };
        let resolved = document.anchor("a").unwrap();
        let NodeKind::Scalar { value } = &resolved.kind else {
            panic!("expected a scalar");
        };
        assert_eq!(value, "two");
        assert_eq!(content.len(), 3);
    }

    #[test]
    fn a_trailing_comment_after_a_sequence_attaches_to_the_collection_by_default() {
        let mut input: &[u8] = b"- a\n- b\n# trailing\n";
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        let document = Document::load_with_options(&mut parser, &Resolver::new(), false).unwrap();
        let root = document.root().unwrap();
        assert_eq!(root.foot_comment, "trailing");
    }

    #[test]
    fn v3_legacy_comments_attaches_a_trailing_comment_to_the_last_child() {
        let mut input: &[u8] = b"- a\n- b\n# trailing\n";
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        let document = Document::load_with_options(&mut parser, &Resolver::new(), true).unwrap();
        let root = document.root().unwrap();
        assert!(root.foot_comment.is_empty());
        let NodeKind::Sequence { content, .. } = &root.kind else {
            panic!("expected a sequence");
        };
        let last = document.get(*content.last().unwrap()).unwrap();
        assert_eq!(last.foot_comment, "trailing");
    }

    #[test]
    fn loads_a_document_with_an_anchor_and_alias() {
        let mut input: &[u8] = b"- &a key\n- *a\n";
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        let document = Document::load(&mut parser).unwrap();
        let root = document.root().unwrap();
        let NodeKind::Sequence { content, .. } = &root.kind else {
            panic!("expected a sequence");
        };
        assert_eq!(content.len(), 2);
        let first = document.get(content[0]).unwrap();
        assert_eq!(first.anchor.as_deref(), Some("a"));
        let second = document.get(content[1]).unwrap();
        assert!(matches!(&second.kind, NodeKind::Alias(name) if name == "a"));
    }

    #[test]
    fn an_explicit_tag_sets_the_tagged_style_flag() {
        let mut input: &[u8] = b"key: !!str 123\n";
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        let document = Document::load(&mut parser).unwrap();
        let NodeKind::Mapping { content, .. } = &document.root().unwrap().kind else {
            panic!("expected a mapping");
        };
        let value = document.get(content[1]).unwrap();
        assert!(!value.tag_implicit);
        assert!(value.style.contains(NodeStyle::TAGGED));

        let key = document.get(content[0]).unwrap();
        assert!(key.tag_implicit);
        assert!(!key.style.contains(NodeStyle::TAGGED));
    }
}
