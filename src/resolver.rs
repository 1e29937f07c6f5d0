use once_cell::sync::Lazy;
use regex::Regex;

use crate::{ScalarStyle, BOOL_TAG, FLOAT_TAG, INT_TAG, NULL_TAG, STR_TAG, TIMESTAMP_TAG};

static NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(~|null|Null|NULL|)$").unwrap());

static BOOL_RE_CORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(true|True|TRUE|false|False|FALSE)$").unwrap());

static BOOL_RE_LEGACY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(y|Y|yes|Yes|YES|n|N|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$",
    )
    .unwrap()
});

static INT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?0b[0-1_]+|[-+]?0o[0-7_]+|[-+]?0[0-7_]+|[-+]?(?:0|[1-9][0-9_]*)|[-+]?0x[0-9a-fA-F_]+|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
    )
    .unwrap()
});

static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?(?:[0-9][0-9_]*)\.[0-9_]*(?:[eE][-+]?[0-9]+)?|\.[0-9][0-9_]*(?:[eE][-+]?[0-9]+)?|[-+]?[0-9][0-9_]*[eE][-+]?[0-9]+|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
    .unwrap()
});

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]$|^[0-9][0-9][0-9][0-9]-[0-9][0-9]?-[0-9][0-9]?([Tt]|[ \t]+)[0-9][0-9]?:[0-9][0-9]:[0-9][0-9](\.[0-9]*)?([ \t]*(Z|[-+][0-9][0-9]?(:[0-9][0-9])?))?$",
    )
    .unwrap()
});

/// Classifies untagged scalars into the YAML core schema's tags.
///
/// Grounded on the pattern-table design used by Python's PyYAML resolver,
/// but trimmed to the core schema's five tags: `!!null`, `!!bool`,
/// `!!int`, `!!float` and `!!timestamp`. Everything else resolves to
/// `!!str`. [`Resolver::legacy`] additionally recognizes the YAML 1.1
/// `yes`/`no`/`on`/`off` boolean spellings.
#[derive(Clone, Copy, Debug)]
pub struct Resolver {
    legacy_bool: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// The YAML 1.2 core schema resolver.
    #[must_use]
    pub fn new() -> Resolver {
        Resolver { legacy_bool: false }
    }

    /// A resolver compatible with YAML 1.1's wider boolean vocabulary
    /// (`y`/`n`/`yes`/`no`/`on`/`off` in addition to `true`/`false`).
    #[must_use]
    pub fn legacy() -> Resolver {
        Resolver { legacy_bool: true }
    }

    /// Resolve the implicit tag for a scalar, or return `!!str` when the
    /// scalar's presentation forbids implicit resolution (quoted and
    /// block scalars are never implicitly anything but strings unless
    /// the plain-implicit flag says otherwise).
    #[must_use]
    pub fn resolve_scalar(&self, value: &str, style: ScalarStyle, implicit: bool) -> &'static str {
        if !implicit || !matches!(style, ScalarStyle::Plain | ScalarStyle::Any) {
            return STR_TAG;
        }
        self.resolve_implicit(value)
    }

    /// Resolve the implicit tag for a bare (unstyled) scalar value, as
    /// used by the composer for plain scalars and by callers classifying
    /// strings outside of a parse.
    #[must_use]
    pub fn resolve_implicit(&self, value: &str) -> &'static str {
        if NULL_RE.is_match(value) {
            return NULL_TAG;
        }
        let bool_re = if self.legacy_bool {
            &*BOOL_RE_LEGACY
        } else {
            &*BOOL_RE_CORE
        };
        if bool_re.is_match(value) {
            return BOOL_TAG;
        }
        if INT_RE.is_match(value) {
            return INT_TAG;
        }
        if FLOAT_RE.is_match(value) {
            return FLOAT_TAG;
        }
        if TIMESTAMP_RE.is_match(value) {
            return TIMESTAMP_TAG;
        }
        STR_TAG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_core_schema_tags() {
        let resolver = Resolver::new();
        assert_eq!(resolver.resolve_implicit("null"), NULL_TAG);
        assert_eq!(resolver.resolve_implicit("~"), NULL_TAG);
        assert_eq!(resolver.resolve_implicit(""), NULL_TAG);
        assert_eq!(resolver.resolve_implicit("true"), BOOL_TAG);
        assert_eq!(resolver.resolve_implicit("false"), BOOL_TAG);
        assert_eq!(resolver.resolve_implicit("42"), INT_TAG);
        assert_eq!(resolver.resolve_implicit("-0x1A"), INT_TAG);
        assert_eq!(resolver.resolve_implicit("0o17"), INT_TAG);
        assert_eq!(resolver.resolve_implicit("3.14"), FLOAT_TAG);
        assert_eq!(resolver.resolve_implicit(".inf"), FLOAT_TAG);
        assert_eq!(resolver.resolve_implicit("2001-12-15"), TIMESTAMP_TAG);
        assert_eq!(resolver.resolve_implicit("hello"), STR_TAG);
    }

    #[test]
    fn core_schema_rejects_yaml11_bools() {
        let resolver = Resolver::new();
        assert_eq!(resolver.resolve_implicit("yes"), STR_TAG);
        assert_eq!(resolver.resolve_implicit("off"), STR_TAG);
    }

    #[test]
    fn legacy_resolver_accepts_yaml11_bools() {
        let resolver = Resolver::legacy();
        assert_eq!(resolver.resolve_implicit("yes"), BOOL_TAG);
        assert_eq!(resolver.resolve_implicit("No"), BOOL_TAG);
        assert_eq!(resolver.resolve_implicit("ON"), BOOL_TAG);
    }

    #[test]
    fn quoted_scalars_never_resolve_implicitly() {
        let resolver = Resolver::new();
        assert_eq!(
            resolver.resolve_scalar("true", ScalarStyle::DoubleQuoted, false),
            STR_TAG
        );
    }
}
