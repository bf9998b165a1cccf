// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! The YAML 1.1 types: many boolean spellings, `0`-prefixed octals, binary
//! integers, `_` digit separators, base 60 numbers and timestamps.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

use super::{DefaultTag, ScalarTag, parse_float, parse_int, record, resolve_nan_inf, resolve_null, tags};
use crate::value::Value;

pattern!(NULL_RE, r"^(?:~|[Nn]ull|NULL)?$");
pattern!(TRUE_RE, r"^(?:Y|y|[Yy]es|YES|[Tt]rue|TRUE|[Oo]n|ON)$");
pattern!(FALSE_RE, r"^(?:N|n|[Nn]o|NO|[Ff]alse|FALSE|[Oo]ff|OFF)$");
pattern!(INT_BIN_RE, r"^[-+]?0b[0-1_]+$");
pattern!(INT_OCT_RE, r"^[-+]?0[0-7_]+$");
pattern!(INT_RE, r"^[-+]?[0-9][0-9_]*$");
pattern!(INT_HEX_RE, r"^[-+]?0x[0-9a-fA-F_]+$");
pattern!(FLOAT_NAN_RE, r"^(?:[-+]?\.(?:inf|Inf|INF)|\.nan|\.NaN|\.NAN)$");
pattern!(FLOAT_EXP_RE, r"^[-+]?(?:[0-9][0-9_]*)?(?:\.[0-9_]*)?[eE][-+]?[0-9]+$");
pattern!(FLOAT_RE, r"^[-+]?(?:[0-9][0-9_]*)?\.[0-9_]*$");
pattern!(INT_TIME_RE, r"^[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+$");
pattern!(FLOAT_TIME_RE, r"^[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*$");
pattern!(MERGE_RE, r"^<<$");
pattern!(
    TIMESTAMP_RE,
    r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{1,2})-(?P<day>[0-9]{1,2})(?:(?:t|T|[ \t]+)(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{1,2}):(?P<second>[0-9]{1,2})(?:\.[0-9]+)?(?:[ \t]*(?:Z|[-+][012]?[0-9](?::[0-9]{2})?))?)?$"
);

fn resolve_true(_: &str) -> Result<Value, String> {
    Ok(Value::Bool(true))
}

fn resolve_false(_: &str) -> Result<Value, String> {
    Ok(Value::Bool(false))
}

fn resolve_bin(text: &str) -> Result<Value, String> {
    parse_int(text, 2, 2)
}

fn resolve_oct(text: &str) -> Result<Value, String> {
    parse_int(text, 1, 8)
}

fn resolve_int(text: &str) -> Result<Value, String> {
    parse_int(text, 0, 10)
}

fn resolve_hex(text: &str) -> Result<Value, String> {
    parse_int(text, 2, 16)
}

/// Split a base 60 number into its sign and `:` separated parts.
fn sexagesimal_parts(text: &str) -> (bool, Vec<String>) {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let parts = digits.split(':').map(|part| part.replace('_', "")).collect();
    (negative, parts)
}

fn resolve_int_time(text: &str) -> Result<Value, String> {
    let (negative, parts) = sexagesimal_parts(text);
    let mut total: i64 = 0;
    for part in parts {
        let part: i64 = part
            .parse()
            .map_err(|err| format!("Invalid base 60 integer {text}: {err}"))?;
        total = total
            .checked_mul(60)
            .and_then(|total| total.checked_add(part))
            .ok_or_else(|| format!("Integer {text} is out of range"))?;
    }
    Ok(Value::Int(if negative { -total } else { total }))
}

fn resolve_float_time(text: &str) -> Result<Value, String> {
    let (negative, parts) = sexagesimal_parts(text);
    let mut total = 0.0;
    for part in parts {
        let part: f64 = part
            .parse()
            .map_err(|err| format!("Invalid base 60 float {text}: {err}"))?;
        total = total * 60.0 + part;
    }
    Ok(Value::Float(if negative { -total } else { total }))
}

fn resolve_float(text: &str) -> Result<Value, String> {
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return Err(format!("Invalid float {text}"));
    }
    parse_float(text)
}

fn resolve_binary(text: &str) -> Result<Value, String> {
    let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
    B64.decode(compact)
        .map(Value::Binary)
        .map_err(|err| format!("Invalid base64 data: {err}"))
}

/// Timestamps keep their source text once the date and time fields are in
/// range.
fn resolve_timestamp(text: &str) -> Result<Value, String> {
    let caps = TIMESTAMP_RE
        .captures(text)
        .ok_or_else(|| format!("Invalid timestamp {text}"))?;
    for (field, min, max) in [
        ("month", 1, 12),
        ("day", 1, 31),
        ("hour", 0, 23),
        ("minute", 0, 59),
        ("second", 0, 60),
    ] {
        if let Some(found) = caps.name(field) {
            let value: u32 = found
                .as_str()
                .parse()
                .map_err(|err| format!("Invalid timestamp {text}: {err}"))?;
            if !(min..=max).contains(&value) {
                return Err(format!("Invalid timestamp {text}: {field} {value} is out of range"));
            }
        }
    }
    Ok(Value::String(text.to_owned()))
}

/// `!!timestamp` for explicitly tagged scalars.
pub(super) const TIMESTAMP: ScalarTag = ScalarTag {
    tag: tags::TIMESTAMP,
    test: None,
    default: DefaultTag::No,
    resolve: resolve_timestamp,
};

/// `!!binary`: base64 data, line breaks and spaces ignored.
pub(super) const BINARY: ScalarTag = ScalarTag {
    tag: tags::BINARY,
    test: None,
    default: DefaultTag::No,
    resolve: resolve_binary,
};

pub(super) fn records() -> Vec<ScalarTag> {
    vec![
        record(tags::NULL, &NULL_RE, resolve_null),
        record(tags::BOOL, &TRUE_RE, resolve_true),
        record(tags::BOOL, &FALSE_RE, resolve_false),
        record(tags::INT, &INT_BIN_RE, resolve_bin),
        record(tags::INT, &INT_OCT_RE, resolve_oct),
        record(tags::INT, &INT_RE, resolve_int),
        record(tags::INT, &INT_HEX_RE, resolve_hex),
        record(tags::FLOAT, &FLOAT_NAN_RE, resolve_nan_inf),
        record(tags::FLOAT, &FLOAT_EXP_RE, resolve_float),
        record(tags::FLOAT, &FLOAT_RE, resolve_float),
        BINARY,
        record(tags::INT, &INT_TIME_RE, resolve_int_time),
        record(tags::FLOAT, &FLOAT_TIME_RE, resolve_float_time),
        record(tags::TIMESTAMP, &TIMESTAMP_RE, resolve_timestamp),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::Schema;
    use crate::options::SchemaKind;
    use crate::value::Value;

    fn resolve(text: &str) -> Result<Value, String> {
        let schema = Schema::new(SchemaKind::Yaml11, true);
        (schema.find_by_test(text, false).resolve)(text)
    }

    #[test]
    fn test_booleans() {
        for text in ["y", "Yes", "on", "TRUE"] {
            assert_eq!(resolve(text), Ok(Value::Bool(true)), "{text}");
        }
        for text in ["n", "NO", "Off", "false"] {
            assert_eq!(resolve(text), Ok(Value::Bool(false)), "{text}");
        }
    }

    #[test]
    fn test_integers() {
        assert_eq!(resolve("0b101"), Ok(Value::Int(5)));
        assert_eq!(resolve("-0b1_0"), Ok(Value::Int(-2)));
        assert_eq!(resolve("017"), Ok(Value::Int(15)));
        assert_eq!(resolve("1_000"), Ok(Value::Int(1000)));
        assert_eq!(resolve("0x_1F"), Ok(Value::Int(31)));
        assert_eq!(resolve("1:30"), Ok(Value::Int(90)));
        assert_eq!(resolve("-1:00:00"), Ok(Value::Int(-3600)));
        assert_eq!(resolve("0"), Ok(Value::Int(0)));
    }

    #[test]
    fn test_floats() {
        assert_eq!(resolve("1_000.5"), Ok(Value::Float(1000.5)));
        assert_eq!(resolve("1:30.5"), Ok(Value::Float(90.5)));
        assert_eq!(resolve(".5e1"), Ok(Value::Float(5.0)));
        assert!(resolve(".").is_err());
    }

    #[test]
    fn test_timestamps() {
        for text in [
            "2001-12-14",
            "2001-12-14t21:59:43.10-05:00",
            "2001-12-14 21:59:43.10 -5",
            "2001-12-15T02:59:43.1Z",
        ] {
            assert_eq!(resolve(text), Ok(Value::from(text)), "{text}");
        }
        let schema = Schema::new(SchemaKind::Yaml11, true);
        assert_eq!(
            schema.find_by_test("2001-12-14", false).tag,
            super::super::tags::TIMESTAMP
        );
        assert!((super::TIMESTAMP.resolve)("2001-13-14").is_err());
        assert!((super::TIMESTAMP.resolve)("2001-12-14 25:00:00").is_err());
        assert!((super::TIMESTAMP.resolve)("yesterday").is_err());
    }

    #[test]
    fn test_binary() {
        let schema = Schema::new(SchemaKind::Yaml11, true);
        let tag = schema.find_by_name(super::super::tags::BINARY, "").unwrap();
        assert_eq!((tag.resolve)("aGVs\n bG8="), Ok(Value::Binary(b"hello".to_vec())));
        assert!((tag.resolve)("***").is_err());
    }
}
