use bitflags::bitflags;

bitflags! {
    /// Independent style flags attached to a [`Node`](crate::Node).
    ///
    /// Unlike the token/event layer's single-valued `ScalarStyle` /
    /// `SequenceStyle` / `MappingStyle` enums, a node's style bits are
    /// orthogonal: `TAGGED` may combine with exactly one of the scalar
    /// presentation flags (spec §3).
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
    pub struct NodeStyle: u16 {
        /// Render a sequence or mapping in flow (`[...]`/`{...}`) style.
        const FLOW = 1 << 0;
        /// The node carries an explicit (non-implicit) tag.
        const TAGGED = 1 << 1;
        /// Single-quoted scalar presentation.
        const SINGLE_QUOTED = 1 << 2;
        /// Double-quoted scalar presentation.
        const DOUBLE_QUOTED = 1 << 3;
        /// Literal (`|`) block scalar presentation.
        const LITERAL = 1 << 4;
        /// Folded (`>`) block scalar presentation.
        const FOLDED = 1 << 5;
    }
}

impl NodeStyle {
    /// The set of mutually exclusive scalar presentation flags.
    const SCALAR_STYLE_MASK: NodeStyle = NodeStyle::SINGLE_QUOTED
        .union(NodeStyle::DOUBLE_QUOTED)
        .union(NodeStyle::LITERAL)
        .union(NodeStyle::FOLDED);

    /// The scalar presentation style encoded in these flags, if any.
    /// Returns `None` for plain presentation.
    #[must_use]
    pub fn scalar_presentation(self) -> Option<NodeStyle> {
        let bits = self & Self::SCALAR_STYLE_MASK;
        if bits.is_empty() {
            None
        } else {
            Some(bits)
        }
    }

    #[must_use]
    pub fn from_scalar_style(style: crate::ScalarStyle) -> NodeStyle {
        match style {
            crate::ScalarStyle::SingleQuoted => NodeStyle::SINGLE_QUOTED,
            crate::ScalarStyle::DoubleQuoted => NodeStyle::DOUBLE_QUOTED,
            crate::ScalarStyle::Literal => NodeStyle::LITERAL,
            crate::ScalarStyle::Folded => NodeStyle::FOLDED,
            crate::ScalarStyle::Plain | crate::ScalarStyle::Any => NodeStyle::empty(),
        }
    }

    #[must_use]
    pub fn to_scalar_style(self) -> crate::ScalarStyle {
        if self.contains(NodeStyle::SINGLE_QUOTED) {
            crate::ScalarStyle::SingleQuoted
        } else if self.contains(NodeStyle::DOUBLE_QUOTED) {
            crate::ScalarStyle::DoubleQuoted
        } else if self.contains(NodeStyle::LITERAL) {
            crate::ScalarStyle::Literal
        } else if self.contains(NodeStyle::FOLDED) {
            crate::ScalarStyle::Folded
        } else {
            crate::ScalarStyle::Plain
        }
    }
}
