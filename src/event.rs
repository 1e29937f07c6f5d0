use crate::{
    Encoding, MappingStyle, Mark, ScalarStyle, SequenceStyle, TagDirective, VersionDirective,
};

/// A structural grammar emission produced by the [`Parser`](crate::Parser)
/// and consumed by the [`Document`](crate::Document) composer (or, on the
/// output side, produced by the [`Representer`](crate::Representer) and
/// consumed by the [`Emitter`](crate::Emitter)).
#[derive(Debug, PartialEq, Default)]
#[non_exhaustive]
pub struct Event {
    /// The event data.
    pub data: EventData,
    /// The beginning of the event.
    pub start_mark: Mark,
    /// The end of the event.
    pub end_mark: Mark,
    /// Comment(s) on their own line(s) immediately preceding this event.
    /// Multiple consecutive `#` lines are joined with `\n`.
    pub head_comment: String,
    /// A trailing `#` comment on the same source line as this event.
    pub line_comment: String,
    /// Comment(s) that appear after this entity closes, before the next
    /// sibling begins, attributed to this event rather than the next one.
    pub foot_comment: String,
    /// A comment deferred past the end of the value this event starts,
    /// surfaced as a synthetic [`EventData::TailComment`] once the value
    /// closes. See spec §4.3.
    pub tail_comment: String,
}

#[derive(Debug, PartialEq, Default)]
pub enum EventData {
    #[default]
    NoEvent,
    /// The stream parameters (for `STREAM_START_TOKEN`).
    StreamStart {
        /// The document encoding.
        encoding: Encoding,
    },
    StreamEnd,
    /// The document parameters (for `DOCUMENT_START_TOKEN`).
    DocumentStart {
        /// The version directive.
        version_directive: Option<VersionDirective>,
        /// The tag directives list.
        tag_directives: Vec<TagDirective>,
        /// Is the document indicator implicit?
        implicit: bool,
    },
    /// The document end parameters (for `DOCUMENT_END_TOKEN`).
    DocumentEnd { implicit: bool },
    /// The alias parameters.
    Alias {
        /// The anchor.
        anchor: String,
    },
    /// The scalar parameters.
    Scalar {
        /// The anchor.
        anchor: Option<String>,
        /// The tag.
        tag: Option<String>,
        /// The scalar value.
        value: String,
        /// Is the tag optional for the plain style?
        plain_implicit: bool,
        /// Is the tag optional for any non-plain style?
        quoted_implicit: bool,
        /// The scalar style.
        style: ScalarStyle,
    },
    /// The sequence parameters.
    SequenceStart {
        /// The anchor.
        anchor: Option<String>,
        /// The tag.
        tag: Option<String>,
        /// Is the tag optional?
        implicit: bool,
        /// The sequence style.
        style: SequenceStyle,
        /// The head-comment prefix split off for this collection's
        /// opening event when it is the value of a sequence entry (see
        /// spec §4.3's `stem_comment` rule).
        stem_comment: String,
    },
    SequenceEnd,
    /// The mapping parameters.
    MappingStart {
        /// The anchor.
        anchor: Option<String>,
        /// The tag.
        tag: Option<String>,
        /// Is the tag optional?
        implicit: bool,
        /// The mapping style.
        style: MappingStyle,
        /// See [`EventData::SequenceStart::stem_comment`].
        stem_comment: String,
    },
    MappingEnd,
    /// Internal pseudo-event: a comment that trailed past the end of the
    /// previous value, deferred until the following event so it can be
    /// reattached as that value's `foot_comment` at composition time.
    TailComment { comment: String },
}

impl Event {
    /// Make an event from its data, setting both marks to zero.
    pub(crate) fn new(data: EventData) -> Self {
        Self {
            data,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
            head_comment: String::new(),
            line_comment: String::new(),
            foot_comment: String::new(),
            tail_comment: String::new(),
        }
    }

    /// Create the STREAM-START event.
    pub fn stream_start(encoding: Encoding) -> Self {
        Self::new(EventData::StreamStart { encoding })
    }

    /// Create the STREAM-END event.
    pub fn stream_end() -> Self {
        Self::new(EventData::StreamEnd)
    }

    /// Create the DOCUMENT-START event.
    ///
    /// The `implicit` argument is considered as a stylistic parameter and may be
    /// ignored by the emitter.
    pub fn document_start(
        version_directive: Option<VersionDirective>,
        tag_directives_in: &[TagDirective],
        implicit: bool,
    ) -> Self {
        let tag_directives = tag_directives_in.to_vec();

        Self::new(EventData::DocumentStart {
            version_directive,
            tag_directives,
            implicit,
        })
    }

    /// Create the DOCUMENT-END event.
    pub fn document_end(implicit: bool) -> Self {
        Self::new(EventData::DocumentEnd { implicit })
    }

    /// Create an ALIAS event.
    pub fn alias(anchor: &str) -> Self {
        Self::new(EventData::Alias {
            anchor: String::from(anchor),
        })
    }

    /// Create a SCALAR event.
    ///
    /// Either the `tag` attribute or one of the `plain_implicit` and
    /// `quoted_implicit` flags must be set.
    pub fn scalar(
        anchor: Option<&str>,
        tag: Option<&str>,
        value: &str,
        plain_implicit: bool,
        quoted_implicit: bool,
        style: ScalarStyle,
    ) -> Self {
        Self::new(EventData::Scalar {
            anchor: anchor.map(String::from),
            tag: tag.map(String::from),
            value: String::from(value),
            plain_implicit,
            quoted_implicit,
            style,
        })
    }

    /// Create a SEQUENCE-START event.
    pub fn sequence_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: SequenceStyle,
    ) -> Self {
        Self::new(EventData::SequenceStart {
            anchor: anchor.map(String::from),
            tag: tag.map(String::from),
            implicit,
            style,
            stem_comment: String::new(),
        })
    }

    /// Create a SEQUENCE-END event.
    pub fn sequence_end() -> Self {
        Self::new(EventData::SequenceEnd)
    }

    /// Create a MAPPING-START event.
    pub fn mapping_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: MappingStyle,
    ) -> Self {
        Self::new(EventData::MappingStart {
            anchor: anchor.map(String::from),
            tag: tag.map(String::from),
            implicit,
            style,
            stem_comment: String::new(),
        })
    }

    /// Create a MAPPING-END event.
    pub fn mapping_end() -> Self {
        Self::new(EventData::MappingEnd)
    }

    /// Create the internal TAIL-COMMENT pseudo-event.
    pub(crate) fn tail_comment_event(comment: String) -> Self {
        Self::new(EventData::TailComment { comment })
    }

    /// The anchor carried by this event, if any (scalars, sequences,
    /// mappings and aliases all carry one).
    pub fn anchor(&self) -> Option<&str> {
        match &self.data {
            EventData::Alias { anchor } => Some(anchor.as_str()),
            EventData::Scalar { anchor, .. }
            | EventData::SequenceStart { anchor, .. }
            | EventData::MappingStart { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }
}
