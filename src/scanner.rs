//! Tokenizes decoded characters, resolving YAML's context-sensitive block
//! indentation grammar and the simple-key lookahead it requires.

use alloc::collections::VecDeque;

use crate::macros::{as_digit, as_hex, is_alpha, is_blank, is_blankz, is_break, is_breakz, is_digit, is_hex};
use crate::reader::Reader;
use crate::{Encoding, Mark, ScalarStyle, ScannerError, Token, TokenData, MAX_NESTING_DEPTH};

/// A candidate position for a retroactively-promoted mapping key (spec
/// §4.2). Recorded when a scalar, alias, anchor or flow/block collection
/// start is scanned; promoted to a `KEY` token if a `:` follows within
/// the same line (block context) or the same flow collection.
#[derive(Clone, Copy, Debug)]
struct SimpleKey {
    possible: bool,
    required: bool,
    token_number: u64,
    mark: Mark,
}

impl SimpleKey {
    const fn none() -> Self {
        SimpleKey {
            possible: false,
            required: false,
            token_number: 0,
            mark: Mark {
                index: 0,
                line: 0,
                column: 0,
            },
        }
    }
}

/// Converts decoded characters into a token stream.
pub struct Scanner<'r> {
    reader: Reader<'r>,
    mark: Mark,
    stream_start_produced: bool,
    stream_end_produced: bool,
    tokens: VecDeque<Token>,
    tokens_parsed: u64,
    indent: isize,
    indents: Vec<isize>,
    flow_level: u32,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
    pending_head_comment: String,
    skip_comments: bool,
}

impl<'r> Scanner<'r> {
    /// Create a new scanner with no input attached yet.
    #[must_use]
    pub fn new() -> Self {
        Scanner {
            reader: Reader::new(),
            mark: Mark::default(),
            stream_start_produced: false,
            stream_end_produced: false,
            tokens: VecDeque::new(),
            tokens_parsed: 0,
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            simple_key_allowed: true,
            simple_keys: vec![SimpleKey::none()],
            pending_head_comment: String::new(),
            skip_comments: false,
        }
    }

    /// Attach a byte source to scan from.
    pub fn set_input(&mut self, read_handler: &'r mut dyn std::io::Read) {
        self.reader.set_input(read_handler);
    }

    /// Force a specific encoding instead of auto-detecting from a BOM.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.reader.set_encoding(encoding);
    }

    /// Skip accumulating comment text into tokens (spec §6's
    /// `skip_comments` loader option). The scanner still has to walk
    /// past comment bytes; this just avoids building the strings.
    pub fn set_skip_comments(&mut self, skip_comments: bool) {
        self.skip_comments = skip_comments;
    }

    /// True once the stream-end token has been produced.
    #[must_use]
    pub fn stream_end_produced(&self) -> bool {
        self.stream_end_produced
    }

    /// Produce the next token.
    pub fn scan(&mut self) -> Result<Token, ScannerError> {
        self.ensure_token()?;
        self.tokens_parsed += 1;
        let token = self.tokens.pop_front().expect("ensure_token filled queue");
        log::trace!("scanner produced {:?}", token.data);
        Ok(token)
    }

    fn ensure_token(&mut self) -> Result<(), ScannerError> {
        self.stale_simple_keys()?;
        if self.tokens.is_empty() {
            self.fetch_more_tokens()?;
        }
        Ok(())
    }

    fn token_index(&self) -> u64 {
        self.tokens_parsed + self.tokens.len() as u64
    }

    fn push_token(&mut self, data: TokenData, start_mark: Mark, end_mark: Mark) {
        let mut token = Token::new(data, start_mark, end_mark);
        token.head_comment = core::mem::take(&mut self.pending_head_comment);
        self.tokens.push_back(token);
        self.scan_trailing_comment();
    }

    /// After pushing a content-bearing token, greedily look for a `#`
    /// comment on the same source line and attach it as that token's
    /// `line_comment` before returning control to the caller.
    fn scan_trailing_comment(&mut self) {
        loop {
            match self.peek(0) {
                Ok(Some(' ' | '\t')) => {
                    let _ = self.skip();
                }
                Ok(Some('#')) => {
                    let comment = self.read_comment_line();
                    if !self.skip_comments {
                        if let Some(token) = self.tokens.back_mut() {
                            if token.line_comment.is_empty() {
                                token.line_comment = comment;
                            } else {
                                token.line_comment.push('\n');
                                token.line_comment.push_str(&comment);
                            }
                        }
                    }
                    break;
                }
                _ => break,
            }
        }
    }

    fn read_comment_line(&mut self) -> String {
        // Consume the leading '#'.
        let _ = self.skip();
        let mut text = String::new();
        while !matches!(
            self.peek(0),
            Ok(None) | Ok(Some('\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}'))
        ) {
            let _ = self.read_into(&mut text);
        }
        String::from(text.trim())
    }

    fn peek(&mut self, n: usize) -> Result<Option<char>, ScannerError> {
        self.reader.update_buffer(n + 1)?;
        Ok(self.reader.buffer.get(n).copied())
    }

    fn skip(&mut self) -> Result<(), ScannerError> {
        self.reader.update_buffer(1)?;
        if let Some(ch) = self.reader.buffer.pop_front() {
            self.mark.index += ch.len_utf8() as u64;
            self.mark.column += 1;
        }
        Ok(())
    }

    fn skip_line(&mut self) -> Result<(), ScannerError> {
        self.reader.update_buffer(2)?;
        if self.reader.buffer.front() == Some(&'\r') && self.reader.buffer.get(1) == Some(&'\n') {
            self.skip()?;
            self.skip()?;
        } else if matches!(
            self.reader.buffer.front(),
            Some('\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
        ) {
            self.skip()?;
        }
        self.mark.line += 1;
        self.mark.column = 0;
        Ok(())
    }

    fn read_into(&mut self, out: &mut String) -> Result<(), ScannerError> {
        self.reader.update_buffer(1)?;
        if let Some(ch) = self.reader.buffer.pop_front() {
            out.push(ch);
            self.mark.index += ch.len_utf8() as u64;
            self.mark.column += 1;
        }
        Ok(())
    }

    fn error<T>(problem: &'static str, mark: Mark) -> Result<T, ScannerError> {
        Err(ScannerError::Simple {
            problem,
            problem_mark: mark,
        })
    }

    fn push_indent_if_needed(&mut self) -> Result<(), ScannerError> {
        if self.indents.len() >= MAX_NESTING_DEPTH {
            return Self::error("maximum nesting depth exceeded", self.mark);
        }
        Ok(())
    }

    /// Open a new block sequence/mapping if `column` is more indented than
    /// the current context, pushing the corresponding start token.
    fn roll_indent(&mut self, column: isize, sequence: bool, mark: Mark) -> Result<(), ScannerError> {
        if self.flow_level > 0 {
            return Ok(());
        }
        if self.indent < column {
            self.push_indent_if_needed()?;
            self.indents.push(self.indent);
            log::trace!("scanner indent {} -> {}", self.indent, column);
            self.indent = column;
            let data = if sequence {
                TokenData::BlockSequenceStart
            } else {
                TokenData::BlockMappingStart
            };
            self.push_token(data, mark, mark);
        }
        Ok(())
    }

    /// Close block collections more indented than `column`, pushing a
    /// `BLOCK_END` token for each.
    fn unroll_indent(&mut self, column: isize) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            let mark = self.mark;
            let previous = self.indent;
            self.indent = self.indents.pop().expect("indent stack underflow");
            log::trace!("scanner indent {} -> {}", previous, self.indent);
            self.push_token(TokenData::BlockEnd, mark, mark);
        }
    }

    fn stale_simple_keys(&mut self) -> Result<(), ScannerError> {
        let level = self.flow_level as usize;
        if let Some(key) = self.simple_keys.get_mut(level) {
            if key.possible
                && (key.mark.line < self.mark.line
                    || self.mark.index.saturating_sub(key.mark.index) > crate::MAX_SIMPLE_KEY_LENGTH)
            {
                if key.required {
                    return Self::error("could not find expected ':'", self.mark);
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScannerError> {
        let level = self.flow_level as usize;
        if let Some(key) = self.simple_keys.get_mut(level) {
            if key.possible && key.required {
                return Self::error("could not find expected ':'", self.mark);
            }
            key.possible = false;
        }
        Ok(())
    }

    fn save_simple_key(&mut self, mark: Mark) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        let required = self.flow_level == 0 && self.indent == self.mark.column as isize;
        let level = self.flow_level as usize;
        while self.simple_keys.len() <= level {
            self.simple_keys.push(SimpleKey::none());
        }
        if self.simple_key_allowed {
            self.simple_keys[level] = SimpleKey {
                possible: true,
                required,
                token_number: self.token_index(),
                mark,
            };
        }
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::none());
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Promote the saved simple key at the current flow level to a `KEY`
    /// token, inserting it at its remembered queue position.
    fn promote_simple_key_to_mapping_start(&mut self) -> Result<(), ScannerError> {
        let level = self.flow_level as usize;
        let key = self.simple_keys[level];
        if !key.possible {
            return Ok(());
        }
        self.simple_keys[level].possible = false;
        self.roll_indent(key.mark.column as isize, false, key.mark)?;
        let position = (key.token_number - self.tokens_parsed) as usize;
        self.tokens
            .insert(position, Token::new(TokenData::Key, key.mark, key.mark));
        Ok(())
    }

    fn skip_to_next_token(&mut self) -> Result<(), ScannerError> {
        loop {
            match self.peek(0)? {
                Some(' ') => {
                    self.skip()?;
                }
                Some('\t') if self.flow_level > 0 || !self.simple_key_allowed => {
                    self.skip()?;
                }
                Some('\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}') => {
                    self.skip_line()?;
                    if self.flow_level == 0 {
                        self.simple_key_allowed = true;
                    }
                }
                Some('#') => {
                    let comment = self.read_comment_line();
                    if !self.skip_comments {
                        if self.pending_head_comment.is_empty() {
                            self.pending_head_comment = comment;
                        } else {
                            self.pending_head_comment.push('\n');
                            self.pending_head_comment.push_str(&comment);
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn fetch_more_tokens(&mut self) -> Result<(), ScannerError> {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }

        self.skip_to_next_token()?;
        self.stale_simple_keys()?;
        self.unroll_indent(self.mark.column as isize);

        let Some(ch) = self.peek(0)? else {
            self.fetch_stream_end()?;
            return Ok(());
        };

        if self.mark.column == 0 {
            if ch == '%' {
                return self.fetch_directive();
            }
            if self.check_document_indicator("---")? {
                return self.fetch_document_indicator(TokenData::DocumentStart);
            }
            if self.check_document_indicator("...")? {
                return self.fetch_document_indicator(TokenData::DocumentEnd);
            }
        }

        match ch {
            '[' => self.fetch_flow_collection_start(TokenData::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenData::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenData::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenData::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if is_breakz(self.peek(1)?) || is_blank(self.peek(1)?) => self.fetch_block_entry(),
            '?' if self.flow_level > 0 || is_blank(self.peek(1)?) || is_breakz(self.peek(1)?) => {
                self.fetch_key()
            }
            ':' if self.flow_level > 0 || is_blank(self.peek(1)?) || is_breakz(self.peek(1)?) => {
                self.fetch_value()
            }
            '*' => self.fetch_anchor_or_alias(true),
            '&' => self.fetch_anchor_or_alias(false),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(true),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(false),
            '\'' => self.fetch_flow_scalar(true),
            '"' => self.fetch_flow_scalar(false),
            _ => self.fetch_plain_scalar(),
        }
    }

    fn check_document_indicator(&mut self, indicator: &str) -> Result<bool, ScannerError> {
        let chars: Vec<char> = indicator.chars().collect();
        for (i, expected) in chars.iter().enumerate() {
            if self.peek(i)? != Some(*expected) {
                return Ok(false);
            }
        }
        Ok(is_blankz(self.peek(chars.len())?))
    }

    fn fetch_stream_start(&mut self) {
        self.stream_start_produced = true;
        self.simple_key_allowed = true;
        let mark = self.mark;
        self.push_token(
            TokenData::StreamStart {
                encoding: self.reader.encoding,
            },
            mark,
            mark,
        );
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.stream_end_produced = true;
        let mark = self.mark;
        self.push_token(TokenData::StreamEnd, mark, mark);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip()?;
        self.skip()?;
        self.skip()?;
        self.push_token(data, start_mark, self.mark);
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip()?;

        let mut name = String::new();
        while is_alpha(self.peek(0)?) {
            self.read_into(&mut name)?;
        }
        if name == "YAML" {
            self.skip_blanks()?;
            let major = self.scan_directive_number()?;
            if self.peek(0)? != Some('.') {
                return Self::error("while scanning a directive, expected '.'", self.mark);
            }
            self.skip()?;
            let minor = self.scan_directive_number()?;
            self.finish_directive_line()?;
            self.push_token(
                TokenData::VersionDirective { major, minor },
                start_mark,
                self.mark,
            );
        } else if name == "TAG" {
            self.skip_blanks()?;
            let handle = self.scan_tag_handle()?;
            self.skip_blanks()?;
            let prefix = self.scan_tag_uri()?;
            self.finish_directive_line()?;
            self.push_token(
                TokenData::TagDirective { handle, prefix },
                start_mark,
                self.mark,
            );
        } else {
            return Self::error("found unknown directive name", start_mark);
        }
        Ok(())
    }

    fn skip_blanks(&mut self) -> Result<(), ScannerError> {
        while matches!(self.peek(0)?, Some(' ' | '\t')) {
            self.skip()?;
        }
        Ok(())
    }

    fn scan_directive_number(&mut self) -> Result<i32, ScannerError> {
        let mut value = 0i32;
        let mut length = 0;
        while is_digit(self.peek(0)?) {
            let ch = self.peek(0)?.unwrap();
            value = value * 10 + as_digit(ch) as i32;
            length += 1;
            self.skip()?;
        }
        if length == 0 {
            return Self::error("while scanning a directive, expected a digit", self.mark);
        }
        Ok(value)
    }

    fn finish_directive_line(&mut self) -> Result<(), ScannerError> {
        self.skip_blanks()?;
        if matches!(self.peek(0)?, Some('#')) {
            let _ = self.read_comment_line();
        }
        if !is_breakz(self.peek(0)?) {
            return Self::error(
                "while scanning a directive, expected a line break",
                self.mark,
            );
        }
        if self.peek(0)?.is_some() {
            self.skip_line()?;
        }
        Ok(())
    }

    fn scan_tag_handle(&mut self) -> Result<String, ScannerError> {
        if self.peek(0)? != Some('!') {
            return Self::error("while scanning a tag, expected '!'", self.mark);
        }
        let mut handle = String::from("!");
        self.skip()?;
        while is_alpha(self.peek(0)?) {
            self.read_into(&mut handle)?;
        }
        if self.peek(0)? == Some('!') {
            self.read_into(&mut handle)?;
        }
        Ok(handle)
    }

    fn scan_tag_uri(&mut self) -> Result<String, ScannerError> {
        let mut uri = String::new();
        loop {
            match self.peek(0)? {
                Some(ch) if is_alpha(Some(ch)) || "#;/?:@&=+$,_.!~*'()[]%-".contains(ch) => {
                    if ch == '%' {
                        uri.push(self.scan_uri_escape()?);
                    } else {
                        self.read_into(&mut uri)?;
                    }
                }
                _ => break,
            }
        }
        if uri.is_empty() {
            return Self::error("while parsing a tag, expected a URI", self.mark);
        }
        Ok(uri)
    }

    fn scan_uri_escape(&mut self) -> Result<char, ScannerError> {
        self.skip()?; // consume '%'
        let mut value = 0u32;
        for _ in 0..2 {
            if !is_hex(self.peek(0)?) {
                return Self::error("while parsing a tag, expected a hex digit", self.mark);
            }
            let ch = self.peek(0)?.unwrap();
            value = value * 16 + as_hex(ch);
            self.skip()?;
        }
        char::from_u32(value).ok_or(ScannerError::Simple {
            problem: "while parsing a tag, found an invalid UTF-8 escape",
            problem_mark: self.mark,
        })
    }

    fn fetch_flow_collection_start(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.save_simple_key(self.mark)?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip()?;
        self.push_token(data, start_mark, self.mark);
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip()?;
        self.push_token(data, start_mark, self.mark);
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip()?;
        self.push_token(TokenData::FlowEntry, start_mark, self.mark);
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Self::error("block sequence entries are not allowed here", self.mark);
            }
            self.roll_indent(self.mark.column as isize, true, self.mark)?;
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip()?;
        self.push_token(TokenData::BlockEntry, start_mark, self.mark);
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Self::error("mapping keys are not allowed here", self.mark);
            }
            self.roll_indent(self.mark.column as isize, false, self.mark)?;
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start_mark = self.mark;
        self.skip()?;
        self.push_token(TokenData::Key, start_mark, self.mark);
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScannerError> {
        let level = self.flow_level as usize;
        let key = self.simple_keys.get(level).copied().unwrap_or(SimpleKey::none());
        if key.possible {
            self.promote_simple_key_to_mapping_start()?;
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Self::error("mapping values are not allowed here", self.mark);
                }
                self.roll_indent(self.mark.column as isize, false, self.mark)?;
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start_mark = self.mark;
        self.skip()?;
        self.push_token(TokenData::Value, start_mark, self.mark);
        Ok(())
    }

    fn fetch_anchor_or_alias(&mut self, is_alias: bool) -> Result<(), ScannerError> {
        self.save_simple_key(self.mark)?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip()?;
        let mut value = String::new();
        while is_alpha(self.peek(0)?) {
            self.read_into(&mut value)?;
        }
        if value.is_empty() {
            return Self::error(
                if is_alias {
                    "while scanning an alias, did not find expected alphabetic or numeric character"
                } else {
                    "while scanning an anchor, did not find expected alphabetic or numeric character"
                },
                self.mark,
            );
        }
        let data = if is_alias {
            TokenData::Alias { value }
        } else {
            TokenData::Anchor { value }
        };
        self.push_token(data, start_mark, self.mark);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key(self.mark)?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;

        let (handle, suffix) = if self.peek(1)? == Some('<') {
            self.skip()?;
            self.skip()?;
            let mut uri = String::new();
            while self.peek(0)? != Some('>') {
                if is_breakz(self.peek(0)?) {
                    return Self::error("while scanning a tag, did not find '>'", self.mark);
                }
                self.read_into(&mut uri)?;
            }
            self.skip()?;
            (String::from("!<>"), uri)
        } else {
            let mut has_handle = false;
            let mut cursor = 1;
            while matches!(self.peek(cursor)?, Some(c) if is_alpha(Some(c))) {
                cursor += 1;
            }
            if self.peek(cursor)? == Some('!') {
                has_handle = true;
            }
            if has_handle || self.peek(1)? == Some('!') {
                let handle = self.scan_tag_handle()?;
                let suffix = self.scan_tag_uri()?;
                (handle, suffix)
            } else if matches!(self.peek(1)?, Some(c) if is_alpha(Some(c)) || "#;/?:@&=+$,_.~*'()[]%-".contains(c))
            {
                self.skip()?;
                let suffix = self.scan_tag_uri()?;
                (String::from("!"), suffix)
            } else {
                self.skip()?;
                (String::new(), String::from("!"))
            }
        };

        self.push_token(TokenData::Tag { handle, suffix }, start_mark, self.mark);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        let (value, style) = self.scan_block_scalar_body(literal)?;
        self.push_token(TokenData::Scalar { value, style }, start_mark, self.mark);
        Ok(())
    }

    fn scan_block_scalar_body(&mut self, literal: bool) -> Result<(String, ScalarStyle), ScannerError> {
        self.skip()?; // '|' or '>'

        let mut chomping: i8 = 0; // -1 strip, 0 clip, 1 keep
        let mut explicit_indent: isize = 0;
        for _ in 0..2 {
            match self.peek(0)? {
                Some('-') => {
                    chomping = -1;
                    self.skip()?;
                }
                Some('+') => {
                    chomping = 1;
                    self.skip()?;
                }
                Some(c) if c.is_ascii_digit() && c != '0' => {
                    explicit_indent = self.indent.max(0) + as_digit(c) as isize;
                    self.skip()?;
                }
                _ => break,
            }
        }
        self.skip_blanks()?;
        if matches!(self.peek(0)?, Some('#')) {
            let _ = self.read_comment_line();
        }
        if !is_breakz(self.peek(0)?) {
            return Self::error(
                "while scanning a block scalar, expected a comment or a line break",
                self.mark,
            );
        }
        if self.peek(0)?.is_some() {
            self.skip_line()?;
        }

        let mut indent = explicit_indent.max(0);
        let mut value = String::new();
        let mut trailing_blanks = String::new();
        let mut first_line = true;

        loop {
            let mut column = 0isize;
            while self.peek(0)? == Some(' ') {
                self.skip()?;
                column += 1;
            }
            if indent == 0 {
                indent = column.max(self.indent + 1).max(1);
            }
            if is_breakz(self.peek(0)?) {
                if self.peek(0)?.is_none() {
                    break;
                }
                trailing_blanks.push('\n');
                self.skip_line()?;
                continue;
            }
            if column < indent {
                break;
            }
            if !first_line {
                if literal {
                    value.push_str(&trailing_blanks);
                    if trailing_blanks.is_empty() {
                        value.push('\n');
                    }
                } else if trailing_blanks.len() > 1 {
                    value.push_str(&trailing_blanks);
                } else {
                    value.push(' ');
                }
            }
            trailing_blanks.clear();
            first_line = false;
            while !is_breakz(self.peek(0)?) {
                self.read_into(&mut value)?;
            }
            trailing_blanks.push('\n');
            if self.peek(0)?.is_some() {
                self.skip_line()?;
            }
        }

        match chomping {
            -1 => {}
            0 => value.push('\n'),
            _ => value.push_str(&trailing_blanks),
        }

        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok((value, style))
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), ScannerError> {
        self.save_simple_key(self.mark)?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        let value = self.scan_quoted_scalar_body(single)?;
        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        self.push_token(TokenData::Scalar { value, style }, start_mark, self.mark);
        Ok(())
    }

    fn scan_quoted_scalar_body(&mut self, single: bool) -> Result<String, ScannerError> {
        let quote = if single { '\'' } else { '"' };
        self.skip()?;
        let mut value = String::new();
        loop {
            match self.peek(0)? {
                None => {
                    return Self::error(
                        "while scanning a quoted scalar, found unexpected end of stream",
                        self.mark,
                    )
                }
                Some(c) if c == quote => {
                    if single && self.peek(1)? == Some('\'') {
                        value.push('\'');
                        self.skip()?;
                        self.skip()?;
                        continue;
                    }
                    self.skip()?;
                    break;
                }
                Some('\\') if !single => {
                    self.scan_double_quoted_escape(&mut value)?;
                }
                Some(c) if is_break(Some(c)) => {
                    self.scan_quoted_scalar_line_fold(&mut value)?;
                }
                Some(c) if is_blank(Some(c)) => {
                    self.scan_quoted_scalar_whitespace(&mut value)?;
                }
                Some(_) => {
                    self.read_into(&mut value)?;
                }
            }
        }
        Ok(value)
    }

    fn scan_quoted_scalar_whitespace(&mut self, value: &mut String) -> Result<(), ScannerError> {
        let mut whitespace = String::new();
        while is_blank(self.peek(0)?) {
            self.read_into(&mut whitespace)?;
        }
        if is_break(self.peek(0)?) {
            self.scan_quoted_scalar_line_fold(value)?;
        } else {
            value.push_str(&whitespace);
        }
        Ok(())
    }

    fn scan_quoted_scalar_line_fold(&mut self, value: &mut String) -> Result<(), ScannerError> {
        self.skip_line()?;
        let mut blank_lines = 0;
        loop {
            while matches!(self.peek(0)?, Some(' ' | '\t')) {
                self.skip()?;
            }
            if is_break(self.peek(0)?) {
                self.skip_line()?;
                blank_lines += 1;
            } else {
                break;
            }
        }
        if blank_lines == 0 {
            value.push(' ');
        } else {
            for _ in 0..blank_lines {
                value.push('\n');
            }
        }
        Ok(())
    }

    fn scan_double_quoted_escape(&mut self, value: &mut String) -> Result<(), ScannerError> {
        self.skip()?; // consume backslash
        let Some(esc) = self.peek(0)? else {
            return Self::error(
                "while parsing a quoted scalar, found unexpected end of stream",
                self.mark,
            );
        };
        match esc {
            '0' => {
                value.push('\0');
                self.skip()?;
            }
            'a' => {
                value.push('\u{7}');
                self.skip()?;
            }
            'b' => {
                value.push('\u{8}');
                self.skip()?;
            }
            't' | '\t' => {
                value.push('\t');
                self.skip()?;
            }
            'n' => {
                value.push('\n');
                self.skip()?;
            }
            'v' => {
                value.push('\u{b}');
                self.skip()?;
            }
            'f' => {
                value.push('\u{c}');
                self.skip()?;
            }
            'r' => {
                value.push('\r');
                self.skip()?;
            }
            'e' => {
                value.push('\u{1b}');
                self.skip()?;
            }
            ' ' => {
                value.push(' ');
                self.skip()?;
            }
            '"' => {
                value.push('"');
                self.skip()?;
            }
            '\\' => {
                value.push('\\');
                self.skip()?;
            }
            'N' => {
                value.push('\u{85}');
                self.skip()?;
            }
            '_' => {
                value.push('\u{a0}');
                self.skip()?;
            }
            'L' => {
                value.push('\u{2028}');
                self.skip()?;
            }
            'P' => {
                value.push('\u{2029}');
                self.skip()?;
            }
            'x' => {
                self.skip()?;
                value.push(self.scan_hex_escape(2)?);
            }
            'u' => {
                self.skip()?;
                value.push(self.scan_hex_escape(4)?);
            }
            'U' => {
                self.skip()?;
                value.push(self.scan_hex_escape(8)?);
            }
            c if is_break(Some(c)) => {
                self.scan_quoted_scalar_line_fold(value)?;
            }
            _ => {
                return Self::error(
                    "while parsing a quoted scalar, found unknown escape character",
                    self.mark,
                )
            }
        }
        Ok(())
    }

    fn scan_hex_escape(&mut self, digits: usize) -> Result<char, ScannerError> {
        let mut value = 0u32;
        for _ in 0..digits {
            if !is_hex(self.peek(0)?) {
                return Self::error(
                    "while parsing a quoted scalar, did not find expected hexadecimal number",
                    self.mark,
                );
            }
            let ch = self.peek(0)?.unwrap();
            value = value * 16 + as_hex(ch);
            self.skip()?;
        }
        char::from_u32(value).ok_or(ScannerError::Simple {
            problem: "while parsing a quoted scalar, found invalid Unicode character escape code",
            problem_mark: self.mark,
        })
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key(self.mark)?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        let value = self.scan_plain_scalar_body()?;
        self.push_token(
            TokenData::Scalar {
                value,
                style: ScalarStyle::Plain,
            },
            start_mark,
            self.mark,
        );
        Ok(())
    }

    fn scan_plain_scalar_one_line(&mut self) -> Result<String, ScannerError> {
        let mut text = String::new();
        let mut whitespace = String::new();
        loop {
            if matches!(self.peek(0)?, Some('#')) && !whitespace.is_empty() {
                break;
            }
            match self.peek(0)? {
                None => break,
                Some(c) if is_break(Some(c)) => break,
                Some(':') if self.flow_level > 0 || is_blank(self.peek(1)?) || is_breakz(self.peek(1)?) => {
                    break
                }
                Some(c) if self.flow_level > 0 && "[]{},".contains(c) => break,
                Some(c) if is_blank(Some(c)) => {
                    self.read_into(&mut whitespace)?;
                }
                Some(_) => {
                    if !whitespace.is_empty() {
                        text.push_str(&whitespace);
                        whitespace.clear();
                    }
                    self.read_into(&mut text)?;
                }
            }
        }
        Ok(text)
    }

    fn scan_plain_scalar_body(&mut self) -> Result<String, ScannerError> {
        let mut value = self.scan_plain_scalar_one_line()?;

        loop {
            if !is_break(self.peek(0)?) {
                break;
            }
            self.skip_line()?;
            let mut blank_lines = 0;
            loop {
                while self.peek(0)? == Some(' ') {
                    self.skip()?;
                }
                if is_break(self.peek(0)?) {
                    self.skip_line()?;
                    blank_lines += 1;
                } else {
                    break;
                }
            }

            let column = self.mark.column as isize;
            if self.flow_level == 0 && column <= self.indent {
                break;
            }
            if self.peek(0)?.is_none() {
                break;
            }

            let line = self.scan_plain_scalar_one_line()?;
            if line.is_empty() {
                break;
            }
            if blank_lines == 0 {
                value.push(' ');
            } else {
                for _ in 0..blank_lines {
                    value.push('\n');
                }
            }
            value.push_str(&line);
        }

        Ok(value)
    }
}

impl Default for Scanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}
