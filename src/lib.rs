#![doc = include_str!("../README.md")]
#![allow(non_snake_case)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::fn_params_excessive_bools,
    clippy::manual_range_contains,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::unnecessary_wraps,
    clippy::match_wildcard_for_single_variants
)]
#![forbid(unsafe_code)]

extern crate alloc;

mod macros;

mod dumper;
mod emitter;
mod error;
mod event;
mod loader;
mod mark;
mod node;
mod parser;
mod reader;
mod representer;
mod resolver;
mod scanner;
mod style;
mod token;
mod writer;

pub use crate::dumper::Dumper;
pub use crate::emitter::{Emitter, EmitterOptions};
pub use crate::error::*;
pub use crate::event::{Event, EventData};
pub use crate::loader::{Loader, LoaderOptions};
pub use crate::mark::Mark;
pub use crate::node::{AliasData, Document, Node, NodeId, NodeKind};
pub use crate::parser::{Parser, ParserState};
pub use crate::representer::{Representer, RepresenterOptions};
pub use crate::resolver::Resolver;
pub use crate::scanner::Scanner;
pub use crate::style::NodeStyle;
pub use crate::token::{Token, TokenData};

pub(crate) const INPUT_RAW_BUFFER_SIZE: usize = 16384;
pub(crate) const OUTPUT_BUFFER_SIZE: usize = 16384;

/// Maximum nesting depth enforced at every push onto the parser's states
/// stack and the scanner's indent stack, guarding against stack growth
/// on adversarial or accidentally-deep input. See spec §9.
pub const MAX_NESTING_DEPTH: usize = 10_000;

/// The number of characters a scanned simple key candidate remains valid
/// for before it expires (spec §4.2).
pub(crate) const MAX_SIMPLE_KEY_LENGTH: u64 = 1024;

/// The tag `!!null` with the only possible value: `null`.
pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
/// The tag `!!bool` with the values: `true` and `false`.
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
/// The tag `!!str` for string values.
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
/// The tag `!!int` for integer values.
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
/// The tag `!!float` for float values.
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
/// The tag `!!timestamp` for date and time values.
pub const TIMESTAMP_TAG: &str = "tag:yaml.org,2002:timestamp";
/// The tag `!!binary` for base64-encoded byte strings.
pub const BINARY_TAG: &str = "tag:yaml.org,2002:binary";
/// The tag `!!merge` for merge keys (`<<`).
pub const MERGE_TAG: &str = "tag:yaml.org,2002:merge";

/// The tag `!!seq` is used to denote sequences.
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
/// The tag `!!map` is used to denote mapping.
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";

/// The default scalar tag is `!!str`.
pub const DEFAULT_SCALAR_TAG: &str = STR_TAG;
/// The default sequence tag is `!!seq`.
pub const DEFAULT_SEQUENCE_TAG: &str = SEQ_TAG;
/// The default mapping tag is `!!map`.
pub const DEFAULT_MAPPING_TAG: &str = MAP_TAG;

/// The handle/prefix pair implicitly present at the start of every
/// document: `!` -> `!`.
pub const DEFAULT_PRIMARY_TAG_HANDLE: &str = "!";
/// The handle/prefix pair implicitly present at the start of every
/// document: `!!` -> `tag:yaml.org,2002:`.
pub const DEFAULT_SECONDARY_TAG_HANDLE: &str = "!!";
/// The prefix bound to the `!!` handle by default.
pub const DEFAULT_SECONDARY_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// The version directive data (`%YAML major.minor`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct VersionDirective {
    /// The major version number.
    pub major: i32,
    /// The minor version number.
    pub minor: i32,
}

/// The tag directive data (`%TAG handle prefix`). The defaults `!` -> `!`
/// and `!!` -> `tag:yaml.org,2002:` are implicitly present at every
/// document start and are not represented as directives themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TagDirective {
    /// The tag handle.
    pub handle: String,
    /// The tag prefix.
    pub prefix: String,
}

/// The stream encoding.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum Encoding {
    /// Let the reader choose the encoding from a byte-order mark, or
    /// default to UTF-8 if none is present.
    #[default]
    Any = 0,
    /// The default UTF-8 encoding.
    Utf8 = 1,
    /// The UTF-16-LE encoding with BOM.
    Utf16Le = 2,
    /// The UTF-16-BE encoding with BOM.
    Utf16Be = 3,
}

/// Line break style used by the emitter.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum Break {
    /// Use `\n` for line breaks (Unix style).
    #[default]
    Ln = 0,
    /// Use `\r` for line breaks (Mac style).
    Cr = 1,
    /// Use `\r\n` for line breaks (DOS style).
    CrLn = 2,
}

/// Scalar presentation styles, as used on the event/token stream where at
/// most one style applies at a time. [`Node`] uses the combinable
/// [`NodeStyle`] bitflags instead.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ScalarStyle {
    /// Let the emitter choose the style.
    #[default]
    Any = 0,
    /// The plain scalar style.
    Plain = 1,
    /// The single-quoted scalar style.
    SingleQuoted = 2,
    /// The double-quoted scalar style.
    DoubleQuoted = 3,
    /// The literal (`|`) scalar style.
    Literal = 4,
    /// The folded (`>`) scalar style.
    Folded = 5,
}

/// Sequence presentation styles.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum SequenceStyle {
    /// Let the emitter choose the style.
    #[default]
    Any = 0,
    /// The block sequence style.
    Block = 1,
    /// The flow sequence style.
    Flow = 2,
}

/// Mapping presentation styles.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum MappingStyle {
    /// Let the emitter choose the style.
    #[default]
    Any = 0,
    /// The block mapping style.
    Block = 1,
    /// The flow mapping style.
    Flow = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_a_simple_mapping() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new();
        emitter.set_output(&mut output);

        emitter.emit(Event::stream_start(Encoding::Utf8)).unwrap();
        emitter
            .emit(Event::document_start(None, &[], true))
            .unwrap();
        emitter
            .emit(Event::mapping_start(
                None,
                None,
                true,
                MappingStyle::Block,
            ))
            .unwrap();
        emitter
            .emit(Event::scalar(
                None,
                None,
                "key",
                true,
                true,
                ScalarStyle::Plain,
            ))
            .unwrap();
        emitter
            .emit(Event::scalar(
                None,
                None,
                "value",
                true,
                true,
                ScalarStyle::Plain,
            ))
            .unwrap();
        emitter.emit(Event::mapping_end()).unwrap();
        emitter.emit(Event::document_end(true)).unwrap();
        emitter.emit(Event::stream_end()).unwrap();

        assert_eq!(std::str::from_utf8(&output).unwrap(), "key: value\n");
    }

    #[test]
    fn loads_a_flow_sequence_of_ints() {
        let mut input: &[u8] = b"[1, 2, 3]";
        let mut parser = Parser::new();
        parser.set_input(&mut input);
        let document = Document::load(&mut parser).unwrap();
        let root = document.root().unwrap();
        match &root.kind {
            NodeKind::Sequence { content, .. } => assert_eq!(content.len(), 3),
            other => panic!("expected a sequence, found {other:?}"),
        }
    }
}
