// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! The YAML 1.2 core schema.

use super::{ScalarTag, parse_float, parse_int, record, resolve_nan_inf, resolve_null, tags};
use crate::value::Value;

pattern!(NULL_RE, r"^(?:~|[Nn]ull|NULL)?$");
pattern!(BOOL_RE, r"^(?:[Tt]rue|TRUE|[Ff]alse|FALSE)$");
pattern!(INT_OCT_RE, r"^0o[0-7]+$");
pattern!(INT_RE, r"^[-+]?[0-9]+$");
pattern!(INT_HEX_RE, r"^0x[0-9a-fA-F]+$");
pattern!(FLOAT_NAN_RE, r"^(?:[-+]?\.(?:inf|Inf|INF)|\.nan|\.NaN|\.NAN)$");
pattern!(FLOAT_EXP_RE, r"^[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)[eE][-+]?[0-9]+$");
pattern!(FLOAT_RE, r"^[-+]?(?:\.[0-9]+|[0-9]+\.[0-9]*)$");

fn resolve_bool(text: &str) -> Result<Value, String> {
    Ok(Value::Bool(text.starts_with(['t', 'T'])))
}

fn resolve_oct(text: &str) -> Result<Value, String> {
    parse_int(text, 2, 8)
}

fn resolve_int(text: &str) -> Result<Value, String> {
    parse_int(text, 0, 10)
}

fn resolve_hex(text: &str) -> Result<Value, String> {
    parse_int(text, 2, 16)
}

/// Null, bool, int (octal, decimal, hex) and float records, in match order.
pub(super) fn records() -> Vec<ScalarTag> {
    vec![
        record(tags::NULL, &NULL_RE, resolve_null),
        record(tags::BOOL, &BOOL_RE, resolve_bool),
        record(tags::INT, &INT_OCT_RE, resolve_oct),
        record(tags::INT, &INT_RE, resolve_int),
        record(tags::INT, &INT_HEX_RE, resolve_hex),
        record(tags::FLOAT, &FLOAT_NAN_RE, resolve_nan_inf),
        record(tags::FLOAT, &FLOAT_EXP_RE, parse_float),
        record(tags::FLOAT, &FLOAT_RE, parse_float),
    ]
}
