// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! The JSON schema: only JSON literal spellings resolve, anything else
//! plain is reported.

use super::{ScalarTag, parse_float, parse_int, record, resolve_null, tags};
use crate::value::Value;

pattern!(NULL_RE, r"^null$");
pattern!(BOOL_RE, r"^true$|^false$");
pattern!(INT_RE, r"^-?(?:0|[1-9][0-9]*)$");
pattern!(FLOAT_RE, r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?$");
pattern!(ANY_RE, r"^");

fn resolve_bool(text: &str) -> Result<Value, String> {
    Ok(Value::Bool(text == "true"))
}

fn resolve_int(text: &str) -> Result<Value, String> {
    parse_int(text, 0, 10)
}

fn unresolved(text: &str) -> Result<Value, String> {
    Err(format!("Unresolved plain scalar {text:?}"))
}

pub(super) fn records() -> Vec<ScalarTag> {
    vec![
        record(tags::NULL, &NULL_RE, resolve_null),
        record(tags::BOOL, &BOOL_RE, resolve_bool),
        record(tags::INT, &INT_RE, resolve_int),
        record(tags::FLOAT, &FLOAT_RE, parse_float),
        record(tags::STR, &ANY_RE, unresolved),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::Schema;
    use crate::options::SchemaKind;
    use crate::value::Value;

    #[test]
    fn test_json_literals() {
        let schema = Schema::new(SchemaKind::Json, false);
        let resolve = |text: &str| (schema.find_by_test(text, false).resolve)(text);
        assert_eq!(resolve("null"), Ok(Value::Null));
        assert_eq!(resolve("false"), Ok(Value::Bool(false)));
        assert_eq!(resolve("-0"), Ok(Value::Int(0)));
        assert_eq!(resolve("2.5e1"), Ok(Value::Float(25.0)));
        assert!(resolve("yes").is_err());
        assert!(resolve("Null").is_err());
        assert!(resolve("012").is_err());
        assert!(resolve("").is_err());
    }
}
