// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Tag resolution tables.
//!
//! A schema is an ordered list of [`ScalarTag`] records plus the collection
//! tags it knows. Plain scalars resolve to the first default record whose
//! test matches their text, so the order of the records is significant.

use regex::Regex;

/// A regular expression compiled on first use.
macro_rules! pattern {
    ($name:ident, $re:literal) => {
        #[allow(clippy::expect_used, reason = "Static regex pattern")]
        pub(super) static $name: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($re).expect("valid static regex"));
    };
}

mod json;
mod yaml11;
mod yaml12;

use crate::options::SchemaKind;
use crate::value::Value;

/// Well-known tag names.
pub mod tags {
    pub const PREFIX: &str = "tag:yaml.org,2002:";
    pub const STR: &str = "tag:yaml.org,2002:str";
    pub const MAP: &str = "tag:yaml.org,2002:map";
    pub const SEQ: &str = "tag:yaml.org,2002:seq";
    pub const NULL: &str = "tag:yaml.org,2002:null";
    pub const BOOL: &str = "tag:yaml.org,2002:bool";
    pub const INT: &str = "tag:yaml.org,2002:int";
    pub const FLOAT: &str = "tag:yaml.org,2002:float";
    pub const BINARY: &str = "tag:yaml.org,2002:binary";
    pub const MERGE: &str = "tag:yaml.org,2002:merge";
    pub const OMAP: &str = "tag:yaml.org,2002:omap";
    pub const PAIRS: &str = "tag:yaml.org,2002:pairs";
    pub const SET: &str = "tag:yaml.org,2002:set";
    pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
}

/// Turns the decoded text of a scalar into a value, or explains why it can't.
pub type Resolve = fn(&str) -> Result<Value, String>;

/// When a record applies to untagged plain scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultTag {
    /// Only with an explicit tag.
    No,
    /// Any plain scalar matching the test.
    Yes,
    /// Plain scalars in mapping key position only.
    Key,
}

#[derive(Debug, Clone, Copy)]
pub struct ScalarTag {
    pub tag: &'static str,
    pub test: Option<&'static Regex>,
    pub default: DefaultTag,
    pub resolve: Resolve,
}

impl ScalarTag {
    #[must_use]
    pub fn test(&self, text: &str) -> bool {
        self.test.is_some_and(|re| re.is_match(text))
    }

    fn applies_to_plain(&self, text: &str, at_key: bool) -> bool {
        let default = match self.default {
            DefaultTag::Yes => true,
            DefaultTag::Key => at_key,
            DefaultTag::No => false,
        };
        default && self.test(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Map,
    Seq,
}

impl CollectionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Seq => "seq",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionTag {
    pub tag: &'static str,
    pub kind: CollectionKind,
}

fn resolve_str(text: &str) -> Result<Value, String> {
    Ok(Value::String(text.to_owned()))
}

/// The fallback record for scalars.
pub const STRING: ScalarTag = ScalarTag {
    tag: tags::STR,
    test: None,
    default: DefaultTag::No,
    resolve: resolve_str,
};

const MAP: CollectionTag = CollectionTag {
    tag: tags::MAP,
    kind: CollectionKind::Map,
};

const SEQ: CollectionTag = CollectionTag {
    tag: tags::SEQ,
    kind: CollectionKind::Seq,
};

const OMAP: CollectionTag = CollectionTag {
    tag: tags::OMAP,
    kind: CollectionKind::Seq,
};

const PAIRS: CollectionTag = CollectionTag {
    tag: tags::PAIRS,
    kind: CollectionKind::Seq,
};

const SET: CollectionTag = CollectionTag {
    tag: tags::SET,
    kind: CollectionKind::Map,
};

/// A tag that resolves when used explicitly, even if the schema lacks it.
#[derive(Debug, Clone, Copy)]
pub enum KnownTag {
    Scalar(ScalarTag),
    Collection(CollectionTag),
}

impl KnownTag {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Collection(coll) => coll.kind.as_str(),
        }
    }

    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Scalar(scalar) => scalar.tag,
            Self::Collection(coll) => coll.tag,
        }
    }
}

/// Look up one of the tags every schema understands when named explicitly.
#[must_use]
pub fn known_tag(name: &str) -> Option<KnownTag> {
    match name {
        tags::BINARY => Some(KnownTag::Scalar(yaml11::BINARY)),
        tags::TIMESTAMP => Some(KnownTag::Scalar(yaml11::TIMESTAMP)),
        tags::OMAP => Some(KnownTag::Collection(OMAP)),
        tags::PAIRS => Some(KnownTag::Collection(PAIRS)),
        tags::SET => Some(KnownTag::Collection(SET)),
        _ => None,
    }
}

fn merge_tag() -> ScalarTag {
    ScalarTag {
        tag: tags::MERGE,
        test: Some(&*yaml11::MERGE_RE),
        default: DefaultTag::Key,
        resolve: resolve_str,
    }
}

/// An ordered tag table.
#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: SchemaKind,
    pub scalars: Vec<ScalarTag>,
    pub collections: Vec<CollectionTag>,
    /// Default records of a second schema, used only to warn about plain
    /// scalars that would resolve differently there.
    pub compat: Option<Vec<ScalarTag>>,
}

impl Schema {
    #[must_use]
    pub fn new(kind: SchemaKind, merge_keys: bool) -> Self {
        let mut scalars = vec![STRING];
        let mut collections = vec![MAP, SEQ];
        match kind {
            SchemaKind::Failsafe => {}
            SchemaKind::Json => scalars.extend(json::records()),
            SchemaKind::Core => scalars.extend(yaml12::records()),
            SchemaKind::Yaml11 => {
                scalars.extend(yaml11::records());
                collections.extend([OMAP, PAIRS, SET]);
            }
        }
        if merge_keys {
            scalars.push(merge_tag());
        }
        log::trace!("Schema {kind:?} with {} scalar tags", scalars.len());
        Self {
            kind,
            scalars,
            collections,
            compat: None,
        }
    }

    /// Warn about plain scalars that `compat` would resolve differently.
    #[must_use]
    pub fn with_compat(mut self, compat: SchemaKind) -> Self {
        self.compat = Some(Self::new(compat, false).scalars);
        self
    }

    /// The record for a plain scalar without an explicit tag.
    #[must_use]
    pub fn find_by_test(&self, text: &str, at_key: bool) -> &ScalarTag {
        self.scalars
            .iter()
            .find(|tag| tag.applies_to_plain(text, at_key))
            .unwrap_or(&STRING)
    }

    /// The tag the compat schema would give `text`, when it differs from `tag`.
    #[must_use]
    pub fn compat_conflict(&self, text: &str, tag: &str) -> Option<&'static str> {
        let compat = self.compat.as_ref()?;
        let other = compat
            .iter()
            .find(|record| record.applies_to_plain(text, false))
            .map_or(tags::STR, |record| record.tag);
        (other != tag).then_some(other)
    }

    /// The record for an explicitly tagged scalar.
    ///
    /// Among several records sharing the tag name, a default one with a test
    /// is only used if its test matches `text`.
    #[must_use]
    pub fn find_by_name(&self, name: &str, text: &str) -> Option<ScalarTag> {
        let mut with_test = Vec::new();
        for record in self.scalars.iter().filter(|record| record.tag == name) {
            if record.default != DefaultTag::No && record.test.is_some() {
                with_test.push(record);
            } else {
                return Some(*record);
            }
        }
        if let Some(record) = with_test.into_iter().find(|record| record.test(text)) {
            return Some(*record);
        }
        match known_tag(name) {
            Some(KnownTag::Scalar(record)) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn find_collection(&self, name: &str, kind: CollectionKind) -> Option<CollectionTag> {
        self.collections
            .iter()
            .find(|coll| coll.tag == name && coll.kind == kind)
            .copied()
            .or_else(|| match known_tag(name) {
                Some(KnownTag::Collection(coll)) if coll.kind == kind => Some(coll),
                _ => None,
            })
    }
}

/// Parse an integer in `radix`, ignoring `_` separators, with an optional sign.
fn parse_int(text: &str, skip: usize, radix: u32) -> Result<Value, String> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits: String = digits
        .get(skip..)
        .unwrap_or_default()
        .chars()
        .filter(|ch| *ch != '_')
        .collect();
    let magnitude = i128::from_str_radix(&digits, radix)
        .map_err(|err| format!("Invalid integer {text}: {err}"))?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed)
        .map(Value::Int)
        .map_err(|_| format!("Integer {text} is out of range"))
}

fn parse_float(text: &str) -> Result<Value, String> {
    let cleaned: String = text.chars().filter(|ch| *ch != '_').collect();
    cleaned
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|err| format!("Invalid float {text}: {err}"))
}

fn resolve_nan_inf(text: &str) -> Result<Value, String> {
    let value = if text.ends_with(['n', 'N']) {
        f64::NAN
    } else if text.starts_with('-') {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    Ok(Value::Float(value))
}

/// A default record for plain scalars matching `test`.
const fn record(tag: &'static str, test: &'static Regex, resolve: Resolve) -> ScalarTag {
    ScalarTag {
        tag,
        test: Some(test),
        default: DefaultTag::Yes,
        resolve,
    }
}

fn resolve_null(_: &str) -> Result<Value, String> {
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(schema: &Schema, text: &str) -> Value {
        let tag = schema.find_by_test(text, false);
        (tag.resolve)(text).unwrap_or_else(|_| Value::from(text))
    }

    #[test]
    fn test_core_plain_scalars() {
        let schema = Schema::new(SchemaKind::Core, true);
        assert_eq!(resolve(&schema, "~"), Value::Null);
        assert_eq!(resolve(&schema, ""), Value::Null);
        assert_eq!(resolve(&schema, "True"), Value::Bool(true));
        assert_eq!(resolve(&schema, "0o17"), Value::Int(15));
        assert_eq!(resolve(&schema, "017"), Value::Int(17));
        assert_eq!(resolve(&schema, "0x1F"), Value::Int(31));
        assert_eq!(resolve(&schema, "-12"), Value::Int(-12));
        assert_eq!(resolve(&schema, "1.5"), Value::Float(1.5));
        assert_eq!(resolve(&schema, "1e3"), Value::Float(1000.0));
        assert_eq!(resolve(&schema, "-.inf"), Value::Float(f64::NEG_INFINITY));
        assert!(matches!(resolve(&schema, ".nan"), Value::Float(f) if f.is_nan()));
        assert_eq!(resolve(&schema, "yes"), Value::from("yes"));
        assert_eq!(resolve(&schema, "1:30"), Value::from("1:30"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let schema = Schema::new(SchemaKind::Core, true);
        for text in ["42", "3.25", "null", "text", "FALSE"] {
            assert_eq!(resolve(&schema, text), resolve(&schema, text));
        }
    }

    #[test]
    fn test_merge_tag_only_at_key() {
        let schema = Schema::new(SchemaKind::Core, true);
        assert_eq!(schema.find_by_test("<<", true).tag, tags::MERGE);
        assert_eq!(schema.find_by_test("<<", false).tag, tags::STR);
        let schema = Schema::new(SchemaKind::Core, false);
        assert_eq!(schema.find_by_test("<<", true).tag, tags::STR);
    }

    #[test]
    fn test_find_by_name_uses_tests_for_shared_tags() {
        let schema = Schema::new(SchemaKind::Core, true);
        let tag = schema.find_by_name(tags::INT, "0x10").unwrap();
        assert_eq!((tag.resolve)("0x10"), Ok(Value::Int(16)));
        assert!(schema.find_by_name(tags::FLOAT, "abc").is_none());
        assert_eq!(schema.find_by_name(tags::STR, "1").unwrap().tag, tags::STR);
        assert_eq!(schema.find_by_name(tags::BINARY, "aGk=").unwrap().tag, tags::BINARY);
    }

    #[test]
    fn test_find_collection() {
        let core = Schema::new(SchemaKind::Core, true);
        assert!(core.find_collection(tags::SET, CollectionKind::Map).is_some());
        assert!(core.find_collection(tags::SET, CollectionKind::Seq).is_none());
        assert!(core.find_collection(tags::OMAP, CollectionKind::Seq).is_some());
    }

    #[test]
    fn test_integer_overflow_fails() {
        let schema = Schema::new(SchemaKind::Core, true);
        let tag = schema.find_by_test("99999999999999999999", false);
        assert_eq!(tag.tag, tags::INT);
        assert!((tag.resolve)("99999999999999999999").is_err());
    }

    #[test]
    fn test_compat_conflict() {
        let schema = Schema::new(SchemaKind::Core, true).with_compat(SchemaKind::Yaml11);
        assert_eq!(schema.compat_conflict("yes", tags::STR), Some(tags::BOOL));
        assert_eq!(schema.compat_conflict("true", tags::BOOL), None);
        assert_eq!(schema.compat_conflict("plain", tags::STR), None);
    }
}
