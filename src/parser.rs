//! Turns a token stream into an event stream, resolving tag handles and
//! deciding implicitness of document/tag indicators along the way.

use crate::scanner::Scanner;
use crate::{
    AliasData, Encoding, Event, MappingStyle, Mark, ParserError, ScalarStyle, SequenceStyle,
    TagDirective, Token, TokenData, VersionDirective, MAX_NESTING_DEPTH,
};

/// One position in the grammar's recursive descent, explicit so that it can
/// be suspended between calls to [`Parser::parse`] (one event per call).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParserState {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockNodeOrIndentlessSequence,
    FlowNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    End,
}

/// Turns a [`Token`] stream into an [`Event`] stream, one event per call to
/// [`Parser::parse`].
#[non_exhaustive]
pub struct Parser<'r> {
    scanner: Scanner<'r>,
    current_token: Option<Token>,
    states: Vec<ParserState>,
    state: ParserState,
    marks: Vec<Mark>,
    tag_directives: Vec<TagDirective>,
    pending_head_comment: String,
    /// The alias definitions recorded for the document currently being
    /// composed; consumed and cleared by [`Document::load`](crate::Document::load).
    pub(crate) aliases: Vec<AliasData>,
    /// Whether the `STREAM-START` event has been produced.
    pub(crate) stream_start_produced: bool,
    /// Whether the `STREAM-END` event has been produced.
    pub(crate) stream_end_produced: bool,
}

impl<'r> Parser<'r> {
    /// Create a new parser with no input attached yet.
    #[must_use]
    pub fn new() -> Self {
        Parser {
            scanner: Scanner::new(),
            current_token: None,
            states: Vec::new(),
            state: ParserState::StreamStart,
            marks: Vec::new(),
            tag_directives: Vec::new(),
            pending_head_comment: String::new(),
            aliases: Vec::new(),
            stream_start_produced: false,
            stream_end_produced: false,
        }
    }

    /// Attach a byte source to parse from.
    pub fn set_input(&mut self, read_handler: &'r mut dyn std::io::Read) {
        self.scanner.set_input(read_handler);
    }

    /// Force a specific encoding instead of auto-detecting from a BOM.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.scanner.set_encoding(encoding);
    }

    /// Skip comment capture in the underlying scanner (spec §6's
    /// `skip_comments` loader option).
    pub fn set_skip_comments(&mut self, skip_comments: bool) {
        self.scanner.set_skip_comments(skip_comments);
    }

    /// Drop the alias definitions accumulated for the last document.
    pub(crate) fn delete_aliases(&mut self) {
        self.aliases.clear();
    }

    /// Produce the next event.
    pub fn parse(&mut self) -> Result<Event, ParserError> {
        log::trace!("parser state {:?}", self.state);
        let event = self.state_machine()?;
        log::debug!("parser produced {:?}", event.data);
        if matches!(event.data, crate::EventData::StreamStart { .. }) {
            self.stream_start_produced = true;
        }
        if matches!(event.data, crate::EventData::StreamEnd) {
            self.stream_end_produced = true;
        }
        Ok(event)
    }

    fn error<T>(problem: &'static str, mark: Mark) -> Result<T, ParserError> {
        Err(ParserError::Problem { problem, mark })
    }

    fn error_with_context<T>(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    ) -> Result<T, ParserError> {
        Err(ParserError::ProblemWithContext {
            context,
            context_mark,
            problem,
            mark,
        })
    }

    fn push_state(&mut self, state: ParserState, mark: Mark) -> Result<(), ParserError> {
        if self.states.len() >= MAX_NESTING_DEPTH {
            return Self::error("maximum nesting depth exceeded", mark);
        }
        self.states.push(state);
        self.marks.push(mark);
        Ok(())
    }

    fn pop_state(&mut self) -> ParserState {
        self.marks.pop();
        self.states.pop().expect("states stack underflow")
    }

    fn peek_token(&mut self) -> Result<&Token, ParserError> {
        if self.current_token.is_none() {
            self.current_token = Some(self.scanner.scan()?);
        }
        Ok(self.current_token.as_ref().expect("just filled"))
    }

    fn get_token(&mut self) -> Result<Token, ParserError> {
        self.peek_token()?;
        Ok(self.current_token.take().expect("just filled"))
    }

    /// Fold a structural token's comments forward into the buffer that will
    /// prefix the next content-bearing event's `head_comment`.
    fn fold_passthrough(&mut self, token: &Token) {
        for text in [token.head_comment.as_str(), token.line_comment.as_str()] {
            if text.is_empty() {
                continue;
            }
            if !self.pending_head_comment.is_empty() {
                self.pending_head_comment.push('\n');
            }
            self.pending_head_comment.push_str(text);
        }
    }

    fn take_head_comment(&mut self, head_comment: &str) -> String {
        let mut head = core::mem::take(&mut self.pending_head_comment);
        if !head_comment.is_empty() {
            if !head.is_empty() {
                head.push('\n');
            }
            head.push_str(head_comment);
        }
        head
    }

    /// Fold a closing token's trailing comments into the event's
    /// `foot_comment`, used for `BLOCK-END`/flow-end/stream/document-end
    /// tokens whose `head_comment` is really a trailing comment attached
    /// to the value that just closed (spec §4.3).
    fn take_foot_comment(token: &Token) -> String {
        let mut foot = String::new();
        for text in [token.head_comment.as_str(), token.line_comment.as_str()] {
            if text.is_empty() {
                continue;
            }
            if !foot.is_empty() {
                foot.push('\n');
            }
            foot.push_str(text);
        }
        foot
    }

    fn state_machine(&mut self) -> Result<Event, ParserError> {
        match self.state {
            ParserState::StreamStart => self.parse_stream_start(),
            ParserState::ImplicitDocumentStart => self.parse_document_start(true),
            ParserState::DocumentStart => self.parse_document_start(false),
            ParserState::DocumentContent => self.parse_document_content(),
            ParserState::DocumentEnd => self.parse_document_end(),
            ParserState::BlockNode => self.parse_node(true, false),
            ParserState::BlockNodeOrIndentlessSequence => self.parse_node(true, true),
            ParserState::FlowNode => self.parse_node(false, false),
            ParserState::BlockSequenceFirstEntry => {
                let token = self.get_token()?;
                self.marks.push(token.start_mark);
                self.current_token = Some(token);
                self.parse_block_sequence_entry(true)
            }
            ParserState::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            ParserState::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            ParserState::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            ParserState::BlockMappingKey => self.parse_block_mapping_key(false),
            ParserState::BlockMappingValue => self.parse_block_mapping_value(),
            ParserState::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            ParserState::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            ParserState::FlowSequenceEntryMappingKey => self.parse_flow_sequence_entry_mapping_key(),
            ParserState::FlowSequenceEntryMappingValue => self.parse_flow_sequence_entry_mapping_value(),
            ParserState::FlowSequenceEntryMappingEnd => self.parse_flow_sequence_entry_mapping_end(),
            ParserState::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            ParserState::FlowMappingKey => self.parse_flow_mapping_key(false),
            ParserState::FlowMappingValue => self.parse_flow_mapping_value(false),
            ParserState::End => Err(ParserError::UnexpectedEof),
        }
    }

    fn parse_stream_start(&mut self) -> Result<Event, ParserError> {
        let token = self.get_token()?;
        let TokenData::StreamStart { encoding } = token.data else {
            return Self::error("did not find expected <stream-start>", token.start_mark);
        };
        self.state = ParserState::ImplicitDocumentStart;
        let mut event = Event::stream_start(encoding);
        event.start_mark = token.start_mark;
        event.end_mark = token.end_mark;
        Ok(event)
    }

    fn parse_document_start(&mut self, implicit_allowed: bool) -> Result<Event, ParserError> {
        // Skip stray document-end markers between documents.
        while matches!(self.peek_token()?.data, TokenData::DocumentEnd) {
            self.get_token()?;
        }

        let token = self.peek_token()?;
        if implicit_allowed
            && !matches!(
                token.data,
                TokenData::VersionDirective { .. }
                    | TokenData::TagDirective { .. }
                    | TokenData::DocumentStart
                    | TokenData::StreamEnd
            )
        {
            let start_mark = token.start_mark;
            self.tag_directives.clear();
            self.states.push(ParserState::DocumentEnd);
            self.state = ParserState::BlockNode;
            let mut event = Event::document_start(None, &[], true);
            event.start_mark = start_mark;
            event.end_mark = start_mark;
            return Ok(event);
        }

        if matches!(token.data, TokenData::StreamEnd) {
            let token = self.get_token()?;
            self.state = ParserState::End;
            let mut event = Event::stream_end();
            event.start_mark = token.start_mark;
            event.end_mark = token.end_mark;
            event.foot_comment = Self::take_foot_comment(&token);
            return Ok(event);
        }

        let start_mark = token.start_mark;
        let mut version_directive = None;
        self.tag_directives.clear();

        loop {
            let token = self.peek_token()?;
            match &token.data {
                TokenData::VersionDirective { major, minor } => {
                    if version_directive.is_some() {
                        return Self::error("found duplicate %YAML directive", token.start_mark);
                    }
                    if *major != 1 || (*minor != 1 && *minor != 2) {
                        return Self::error("found incompatible YAML document", token.start_mark);
                    }
                    version_directive = Some(VersionDirective {
                        major: *major,
                        minor: *minor,
                    });
                    self.get_token()?;
                }
                TokenData::TagDirective { handle, prefix } => {
                    if self.tag_directives.iter().any(|d| &d.handle == handle) {
                        return Self::error("found duplicate %TAG directive", token.start_mark);
                    }
                    self.tag_directives.push(TagDirective {
                        handle: handle.clone(),
                        prefix: prefix.clone(),
                    });
                    self.get_token()?;
                }
                _ => break,
            }
        }

        let token = self.peek_token()?;
        let implicit = !matches!(token.data, TokenData::DocumentStart);
        if !implicit {
            self.get_token()?;
        } else if version_directive.is_some() || !self.tag_directives.is_empty() {
            return Self::error("did not find expected <document start>", token.start_mark);
        }

        let tag_directives = self.tag_directives.clone();
        self.states.push(ParserState::DocumentEnd);
        self.state = ParserState::DocumentContent;
        let mut event = Event::document_start(version_directive, &tag_directives, implicit);
        event.start_mark = start_mark;
        event.end_mark = start_mark;
        Ok(event)
    }

    fn parse_document_content(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        if matches!(
            token.data,
            TokenData::VersionDirective { .. }
                | TokenData::TagDirective { .. }
                | TokenData::DocumentStart
                | TokenData::DocumentEnd
                | TokenData::StreamEnd
        ) {
            let mark = token.start_mark;
            self.state = self.pop_state();
            let mut event = Event::new(crate::EventData::Scalar {
                anchor: None,
                tag: None,
                value: String::new(),
                plain_implicit: true,
                quoted_implicit: false,
                style: ScalarStyle::Plain,
            });
            event.start_mark = mark;
            event.end_mark = mark;
            return Ok(event);
        }
        self.parse_node(true, false)
    }

    fn parse_document_end(&mut self) -> Result<Event, ParserError> {
        let mut start_mark = self.peek_token()?.start_mark;
        let mut end_mark = start_mark;
        let mut implicit = true;

        if matches!(self.peek_token()?.data, TokenData::DocumentEnd) {
            let token = self.get_token()?;
            start_mark = token.start_mark;
            end_mark = token.end_mark;
            implicit = false;
            self.pending_head_comment.clear();
        }

        self.tag_directives.clear();
        self.state = ParserState::DocumentStart;
        let mut event = Event::document_end(implicit);
        event.start_mark = start_mark;
        event.end_mark = end_mark;
        Ok(event)
    }

    /// Parses `block-node`, `flow-node`, `block-content`, or
    /// `block-indentless-sequence`.
    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<Event, ParserError> {
        let token = self.peek_token()?;

        if matches!(token.data, TokenData::Alias { .. }) {
            let token = self.get_token()?;
            let start_mark = token.start_mark;
            let end_mark = token.end_mark;
            let head_comment = self.take_head_comment(&token.head_comment);
            let line_comment = token.line_comment;
            let TokenData::Alias { value } = token.data else {
                unreachable!()
            };
            self.state = self.pop_state();
            let mut event = Event::alias(&value);
            event.start_mark = start_mark;
            event.end_mark = end_mark;
            event.head_comment = head_comment;
            event.line_comment = line_comment;
            return Ok(event);
        }

        let start_mark = token.start_mark;
        let mut end_mark = token.start_mark;
        let mut anchor = None;
        let mut tag_handle: Option<(String, String)> = None;
        let mut node_head_comment = String::new();

        let token = self.peek_token()?;
        if matches!(token.data, TokenData::Anchor { .. }) {
            let token = self.get_token()?;
            let anchor_end_mark = token.end_mark;
            node_head_comment = self.take_head_comment(&token.head_comment);
            if !token.line_comment.is_empty() {
                if !self.pending_head_comment.is_empty() {
                    self.pending_head_comment.push('\n');
                }
                self.pending_head_comment.push_str(&token.line_comment);
            }
            let TokenData::Anchor { value } = token.data else {
                unreachable!()
            };
            anchor = Some(value);
            end_mark = anchor_end_mark;
            if matches!(self.peek_token()?.data, TokenData::Tag { .. }) {
                let token = self.get_token()?;
                let TokenData::Tag { handle, suffix } = token.data else {
                    unreachable!()
                };
                end_mark = token.end_mark;
                tag_handle = Some((handle, suffix));
            }
        } else if matches!(token.data, TokenData::Tag { .. }) {
            let token = self.get_token()?;
            let TokenData::Tag { handle, suffix } = token.data else {
                unreachable!()
            };
            node_head_comment = self.take_head_comment(&token);
            end_mark = token.end_mark;
            tag_handle = Some((handle, suffix));
            if matches!(self.peek_token()?.data, TokenData::Anchor { .. }) {
                let token = self.get_token()?;
                let TokenData::Anchor { value } = token.data else {
                    unreachable!()
                };
                anchor = Some(value);
                end_mark = token.end_mark;
            }
        }

        let tag = match tag_handle {
            Some((handle, suffix)) => Some(self.resolve_tag(&handle, &suffix, start_mark)?),
            None => None,
        };

        let implicit = tag.is_none() || tag.as_deref() == Some("!");
        let token = self.peek_token()?;

        if indentless_sequence && matches!(token.data, TokenData::BlockEntry) {
            self.state = ParserState::IndentlessSequenceEntry;
            let mut event = Event::sequence_start(anchor.as_deref(), tag.as_deref(), implicit, SequenceStyle::Block);
            event.start_mark = start_mark;
            event.end_mark = token.start_mark;
            event.head_comment = node_head_comment;
            return Ok(event);
        }

        if anchor.is_some() || tag.is_some() {
            // Scalar with only properties and no content (empty plain scalar).
            if matches!(
                token.data,
                TokenData::BlockEnd
                    | TokenData::DocumentStart
                    | TokenData::DocumentEnd
                    | TokenData::StreamEnd
                    | TokenData::FlowSequenceEnd
                    | TokenData::FlowMappingEnd
                    | TokenData::FlowEntry
                    | TokenData::Key
                    | TokenData::Value
            ) {
                self.state = self.pop_state();
                let mut event = Event::scalar(
                    anchor.as_deref(),
                    tag.as_deref(),
                    "",
                    implicit,
                    false,
                    ScalarStyle::Plain,
                );
                event.start_mark = start_mark;
                event.end_mark = end_mark;
                event.head_comment = node_head_comment;
                return Ok(event);
            }
        }

        match &token.data {
            TokenData::Scalar { .. } => {
                let token = self.get_token()?;
                let TokenData::Scalar { value, style } = token.data else {
                    unreachable!()
                };
                let (plain_implicit, quoted_implicit) = if tag.is_none() {
                    (
                        matches!(style, ScalarStyle::Plain),
                        !matches!(style, ScalarStyle::Plain),
                    )
                } else if tag.as_deref() == Some("!") {
                    (true, true)
                } else {
                    (false, false)
                };
                self.state = self.pop_state();
                let mut event = Event::scalar(
                    anchor.as_deref(),
                    tag.as_deref(),
                    &value,
                    plain_implicit,
                    quoted_implicit,
                    style,
                );
                event.start_mark = start_mark;
                event.end_mark = token.end_mark;
                if node_head_comment.is_empty() {
                    node_head_comment = self.take_head_comment(&token);
                } else if !token.head_comment.is_empty() {
                    node_head_comment.push('\n');
                    node_head_comment.push_str(&token.head_comment);
                }
                event.head_comment = node_head_comment;
                event.line_comment = token.line_comment;
                Ok(event)
            }
            TokenData::FlowSequenceStart => {
                let token = self.get_token()?;
                self.state = ParserState::FlowSequenceFirstEntry;
                let mut event =
                    Event::sequence_start(anchor.as_deref(), tag.as_deref(), implicit, SequenceStyle::Flow);
                event.start_mark = start_mark;
                event.end_mark = token.end_mark;
                event.head_comment = node_head_comment;
                Ok(event)
            }
            TokenData::FlowMappingStart => {
                let token = self.get_token()?;
                self.state = ParserState::FlowMappingFirstKey;
                let mut event =
                    Event::mapping_start(anchor.as_deref(), tag.as_deref(), implicit, MappingStyle::Flow);
                event.start_mark = start_mark;
                event.end_mark = token.end_mark;
                event.head_comment = node_head_comment;
                Ok(event)
            }
            TokenData::BlockSequenceStart if block => {
                let token = self.get_token()?;
                self.state = ParserState::BlockSequenceFirstEntry;
                let mut event =
                    Event::sequence_start(anchor.as_deref(), tag.as_deref(), implicit, SequenceStyle::Block);
                event.start_mark = start_mark;
                event.end_mark = token.end_mark;
                event.head_comment = node_head_comment;
                Ok(event)
            }
            TokenData::BlockMappingStart if block => {
                let token = self.get_token()?;
                self.state = ParserState::BlockMappingFirstKey;
                let mut event =
                    Event::mapping_start(anchor.as_deref(), tag.as_deref(), implicit, MappingStyle::Block);
                event.start_mark = start_mark;
                event.end_mark = token.end_mark;
                event.head_comment = node_head_comment;
                Ok(event)
            }
            _ if anchor.is_some() || tag.is_some() => {
                self.state = self.pop_state();
                let mut event = Event::scalar(
                    anchor.as_deref(),
                    tag.as_deref(),
                    "",
                    implicit,
                    false,
                    ScalarStyle::Plain,
                );
                event.start_mark = start_mark;
                event.end_mark = end_mark;
                event.head_comment = node_head_comment;
                Ok(event)
            }
            _ => Self::error(
                if block {
                    "did not find expected node content"
                } else {
                    "did not find expected node content"
                },
                token.start_mark,
            ),
        }
    }

    fn resolve_tag(&self, handle: &str, suffix: &str, mark: Mark) -> Result<String, ParserError> {
        if handle == "!<>" {
            return Ok(suffix.to_string());
        }
        if handle.is_empty() && suffix == "!" {
            return Ok(String::from("!"));
        }
        if handle == "!" {
            return Ok(format!("!{suffix}"));
        }
        if handle == "!!" {
            let prefix = self
                .tag_directives
                .iter()
                .find(|d| d.handle == "!!")
                .map_or(crate::DEFAULT_SECONDARY_TAG_PREFIX, |d| d.prefix.as_str());
            return Ok(format!("{prefix}{suffix}"));
        }
        if let Some(directive) = self.tag_directives.iter().find(|d| d.handle == handle) {
            return Ok(format!("{}{}", directive.prefix, suffix));
        }
        Self::error("found undefined tag handle", mark)
    }

    fn parse_block_sequence_entry(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            self.marks.pop();
        }

        loop {
            let token = self.peek_token()?;
            match &token.data {
                TokenData::BlockEntry => {
                    let token = self.get_token()?;
                    self.fold_passthrough(&token);
                    if matches!(self.peek_token()?.data, TokenData::BlockEntry | TokenData::BlockEnd) {
                        self.state = ParserState::BlockSequenceEntry;
                        let mark = self.peek_token()?.start_mark;
                        let mut event = Event::new(crate::EventData::Scalar {
                            anchor: None,
                            tag: None,
                            value: String::new(),
                            plain_implicit: true,
                            quoted_implicit: false,
                            style: ScalarStyle::Plain,
                        });
                        event.start_mark = mark;
                        event.end_mark = mark;
                        return Ok(event);
                    }
                    self.push_state(ParserState::BlockSequenceEntry, token.start_mark)?;
                    return self.parse_node(true, false);
                }
                TokenData::BlockEnd => {
                    let token = self.get_token()?;
                    self.state = self.pop_state();
                    let mut event = Event::sequence_end();
                    event.start_mark = token.start_mark;
                    event.end_mark = token.end_mark;
                    event.foot_comment = Self::take_foot_comment(&token);
                    return Ok(event);
                }
                _ => {
                    let context_mark = self.marks.last().copied().unwrap_or(token.start_mark);
                    return Self::error_with_context(
                        "while parsing a block collection",
                        context_mark,
                        "did not find expected '-' indicator",
                        token.start_mark,
                    );
                }
            }
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        if matches!(token.data, TokenData::BlockEntry) {
            let token = self.get_token()?;
            self.fold_passthrough(&token);
            if matches!(
                self.peek_token()?.data,
                TokenData::BlockEntry
                    | TokenData::Key
                    | TokenData::Value
                    | TokenData::BlockEnd
            ) {
                self.state = ParserState::IndentlessSequenceEntry;
                let mark = self.peek_token()?.start_mark;
                let mut event = Event::new(crate::EventData::Scalar {
                    anchor: None,
                    tag: None,
                    value: String::new(),
                    plain_implicit: true,
                    quoted_implicit: false,
                    style: ScalarStyle::Plain,
                });
                event.start_mark = mark;
                event.end_mark = mark;
                return Ok(event);
            }
            self.push_state(ParserState::IndentlessSequenceEntry, token.start_mark)?;
            return self.parse_node(true, false);
        }

        self.state = self.pop_state();
        let mut event = Event::sequence_end();
        event.start_mark = token.start_mark;
        event.end_mark = token.start_mark;
        Ok(event)
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let token = self.get_token()?;
            self.marks.push(token.start_mark);
            self.current_token = Some(token);
        }

        let token = self.peek_token()?;
        match &token.data {
            TokenData::Key => {
                let token = self.get_token()?;
                self.fold_passthrough(&token);
                if matches!(
                    self.peek_token()?.data,
                    TokenData::Key | TokenData::Value | TokenData::BlockEnd
                ) {
                    self.state = ParserState::BlockMappingValue;
                    let mark = self.peek_token()?.start_mark;
                    let mut event = Event::new(crate::EventData::Scalar {
                        anchor: None,
                        tag: None,
                        value: String::new(),
                        plain_implicit: true,
                        quoted_implicit: false,
                        style: ScalarStyle::Plain,
                    });
                    event.start_mark = mark;
                    event.end_mark = mark;
                    return Ok(event);
                }
                self.push_state(ParserState::BlockMappingValue, token.start_mark)?;
                self.parse_node(true, true)
            }
            TokenData::BlockEnd => {
                let token = self.get_token()?;
                self.state = self.pop_state();
                let mut event = Event::mapping_end();
                event.start_mark = token.start_mark;
                event.end_mark = token.end_mark;
                event.foot_comment = Self::take_foot_comment(&token);
                Ok(event)
            }
            _ => {
                let context_mark = self.marks.last().copied().unwrap_or(token.start_mark);
                Self::error_with_context(
                    "while parsing a block mapping",
                    context_mark,
                    "did not find expected key",
                    token.start_mark,
                )
            }
        }
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        if matches!(token.data, TokenData::Value) {
            let token = self.get_token()?;
            self.fold_passthrough(&token);
            if matches!(
                self.peek_token()?.data,
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::BlockMappingKey;
                let mark = self.peek_token()?.start_mark;
                let mut event = Event::new(crate::EventData::Scalar {
                    anchor: None,
                    tag: None,
                    value: String::new(),
                    plain_implicit: true,
                    quoted_implicit: false,
                    style: ScalarStyle::Plain,
                });
                event.start_mark = mark;
                event.end_mark = mark;
                return Ok(event);
            }
            self.push_state(ParserState::BlockMappingKey, token.start_mark)?;
            return self.parse_node(true, true);
        }
        self.state = ParserState::BlockMappingKey;
        let mark = token.start_mark;
        let mut event = Event::new(crate::EventData::Scalar {
            anchor: None,
            tag: None,
            value: String::new(),
            plain_implicit: true,
            quoted_implicit: false,
            style: ScalarStyle::Plain,
        });
        event.start_mark = mark;
        event.end_mark = mark;
        Ok(event)
    }

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            self.get_token()?;
        }

        let token = self.peek_token()?;
        if !matches!(token.data, TokenData::FlowSequenceEnd) {
            if !first {
                if matches!(token.data, TokenData::FlowEntry) {
                    self.get_token()?;
                } else {
                    let context_mark = self.marks.last().copied().unwrap_or(token.start_mark);
                    return Self::error_with_context(
                        "while parsing a flow sequence",
                        context_mark,
                        "did not find expected ',' or ']'",
                        token.start_mark,
                    );
                }
            }

            let token = self.peek_token()?;
            if matches!(token.data, TokenData::Key) {
                self.state = ParserState::FlowSequenceEntryMappingKey;
                let mark = token.start_mark;
                let mut event = Event::mapping_start(None, None, true, MappingStyle::Flow);
                event.start_mark = mark;
                event.end_mark = mark;
                return Ok(event);
            }
            if !matches!(token.data, TokenData::FlowSequenceEnd) {
                self.push_state(ParserState::FlowSequenceEntry, token.start_mark)?;
                return self.parse_node(false, false);
            }
        }

        let token = self.get_token()?;
        self.state = self.pop_state();
        let mut event = Event::sequence_end();
        event.start_mark = token.start_mark;
        event.end_mark = token.end_mark;
        event.foot_comment = Self::take_foot_comment(&token);
        Ok(event)
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event, ParserError> {
        let token = self.get_token()?;
        if matches!(
            self.peek_token()?.data,
            TokenData::Value | TokenData::FlowEntry | TokenData::FlowSequenceEnd
        ) {
            self.state = ParserState::FlowSequenceEntryMappingValue;
            let mark = self.peek_token()?.start_mark;
            let mut event = Event::new(crate::EventData::Scalar {
                anchor: None,
                tag: None,
                value: String::new(),
                plain_implicit: true,
                quoted_implicit: false,
                style: ScalarStyle::Plain,
            });
            event.start_mark = mark;
            event.end_mark = mark;
            return Ok(event);
        }
        self.push_state(ParserState::FlowSequenceEntryMappingValue, token.start_mark)?;
        self.parse_node(false, false)
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        if matches!(token.data, TokenData::Value) {
            let token = self.get_token()?;
            if !matches!(
                self.peek_token()?.data,
                TokenData::FlowEntry | TokenData::FlowSequenceEnd
            ) {
                self.push_state(ParserState::FlowSequenceEntryMappingEnd, token.start_mark)?;
                return self.parse_node(false, false);
            }
        }
        self.state = ParserState::FlowSequenceEntryMappingEnd;
        let mark = self.peek_token()?.start_mark;
        let mut event = Event::new(crate::EventData::Scalar {
            anchor: None,
            tag: None,
            value: String::new(),
            plain_implicit: true,
            quoted_implicit: false,
            style: ScalarStyle::Plain,
        });
        event.start_mark = mark;
        event.end_mark = mark;
        Ok(event)
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event, ParserError> {
        self.state = ParserState::FlowSequenceEntry;
        let mark = self.peek_token()?.start_mark;
        let mut event = Event::mapping_end();
        event.start_mark = mark;
        event.end_mark = mark;
        Ok(event)
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            self.get_token()?;
        }

        let token = self.peek_token()?;
        if !matches!(token.data, TokenData::FlowMappingEnd) {
            if !first {
                if matches!(token.data, TokenData::FlowEntry) {
                    self.get_token()?;
                } else {
                    let context_mark = self.marks.last().copied().unwrap_or(token.start_mark);
                    return Self::error_with_context(
                        "while parsing a flow mapping",
                        context_mark,
                        "did not find expected ',' or '}'",
                        token.start_mark,
                    );
                }
            }

            let token = self.peek_token()?;
            match &token.data {
                TokenData::Key => {
                    let token = self.get_token()?;
                    self.fold_passthrough(&token);
                    if matches!(
                        self.peek_token()?.data,
                        TokenData::Value | TokenData::FlowEntry | TokenData::FlowMappingEnd
                    ) {
                        self.state = ParserState::FlowMappingValue;
                        let mark = self.peek_token()?.start_mark;
                        let mut event = Event::new(crate::EventData::Scalar {
                            anchor: None,
                            tag: None,
                            value: String::new(),
                            plain_implicit: true,
                            quoted_implicit: false,
                            style: ScalarStyle::Plain,
                        });
                        event.start_mark = mark;
                        event.end_mark = mark;
                        return Ok(event);
                    }
                    self.push_state(ParserState::FlowMappingValue, token.start_mark)?;
                    return self.parse_node(false, false);
                }
                TokenData::FlowMappingEnd => {}
                _ => {
                    self.push_state(ParserState::FlowMappingValue, token.start_mark)?;
                    return self.parse_node(false, false);
                }
            }
        }

        let token = self.get_token()?;
        self.state = self.pop_state();
        let mut event = Event::mapping_end();
        event.start_mark = token.start_mark;
        event.end_mark = token.end_mark;
        event.foot_comment = Self::take_foot_comment(&token);
        Ok(event)
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        if empty {
            self.state = ParserState::FlowMappingKey;
            let mark = token.start_mark;
            let mut event = Event::new(crate::EventData::Scalar {
                anchor: None,
                tag: None,
                value: String::new(),
                plain_implicit: true,
                quoted_implicit: false,
                style: ScalarStyle::Plain,
            });
            event.start_mark = mark;
            event.end_mark = mark;
            return Ok(event);
        }
        if matches!(token.data, TokenData::Value) {
            let token = self.get_token()?;
            if !matches!(
                self.peek_token()?.data,
                TokenData::FlowEntry | TokenData::FlowMappingEnd
            ) {
                self.push_state(ParserState::FlowMappingKey, token.start_mark)?;
                return self.parse_node(false, false);
            }
        }
        self.state = ParserState::FlowMappingKey;
        let mark = self.peek_token()?.start_mark;
        let mut event = Event::new(crate::EventData::Scalar {
            anchor: None,
            tag: None,
            value: String::new(),
            plain_implicit: true,
            quoted_implicit: false,
            style: ScalarStyle::Plain,
        });
        event.start_mark = mark;
        event.end_mark = mark;
        Ok(event)
    }
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Self::new()
    }
}
