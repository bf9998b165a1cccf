// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Native values materialized from a composed document.

use std::hash::{Hash, Hasher};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use ordermap::OrderMap;
use serde::{Serialize, Serializer};

/// A native YAML value.
///
/// Mappings keep their insertion order. Any value may be used as a mapping
/// key, so `Value` implements `Eq` and `Hash`; floats compare by their bit
/// pattern for that purpose.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// `null`, `~` or an empty node.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Decoded `!!binary` data.
    Binary(Vec<u8>),
    Sequence(Vec<Value>),
    Mapping(OrderMap<Value, Value>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as a float, for integers as well.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "Integers are widened on request")]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_mapping(&self) -> Option<&OrderMap<Self, Self>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a string key in a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_mapping()
            .and_then(|map| map.get(&Self::String(key.to_owned())))
    }

    /// Convert to JSON. Binary data becomes a base64 string, non-finite
    /// floats become `null` and non-string mapping keys are stringified.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Binary(bytes) => serde_json::Value::String(B64.encode(bytes)),
            Self::Sequence(seq) => serde_json::Value::Array(seq.iter().map(Self::to_json).collect()),
            Self::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.json_key(), value.to_json()))
                    .collect(),
            ),
        }
    }

    fn json_key(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            other => other.to_json().to_string(),
        }
    }
}

/// Serializes with the same shape as [`Value::to_json`].
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Binary(bytes) => bytes.hash(state),
            Self::Sequence(seq) => seq.hash(state),
            Self::Mapping(map) => {
                map.len().hash(state);
                for (key, value) in map {
                    key.hash(state);
                    value.hash(state);
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_keys_of_any_type() {
        let mut map = OrderMap::new();
        map.insert(Value::Int(1), Value::from("int"));
        map.insert(Value::Float(1.5), Value::from("float"));
        map.insert(Value::Sequence(vec![Value::Null]), Value::from("seq"));
        let value = Value::Mapping(map);

        let map = value.as_mapping().unwrap();
        assert_eq!(map.get(&Value::Float(1.5)), Some(&Value::from("float")));
        assert_eq!(
            map.get(&Value::Sequence(vec![Value::Null])),
            Some(&Value::from("seq"))
        );
    }

    #[test]
    fn test_to_json() {
        let mut map = OrderMap::new();
        map.insert(Value::from("name"), Value::from("x"));
        map.insert(Value::Int(2), Value::Bool(true));
        map.insert(Value::from("data"), Value::Binary(b"hi".to_vec()));
        map.insert(Value::from("nan"), Value::Float(f64::NAN));
        let json = Value::Mapping(map).to_json();
        assert_eq!(
            json,
            serde_json::json!({"name": "x", "2": true, "data": "aGk=", "nan": null})
        );
    }

    #[test]
    fn test_serialize_matches_to_json() {
        let mut map = OrderMap::new();
        map.insert(Value::Sequence(vec![Value::Int(1)]), Value::Binary(b"hi".to_vec()));
        map.insert(Value::Null, Value::Float(f64::INFINITY));
        let value = Value::Mapping(map);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, value.to_json());
        assert_eq!(json, serde_json::json!({"[1]": "aGk=", "null": null}));
    }

    #[test]
    fn test_mapping_equality_is_ordered() {
        let mut first = OrderMap::new();
        first.insert(Value::from("a"), Value::Int(1));
        first.insert(Value::from("b"), Value::Int(2));
        let mut second = OrderMap::new();
        second.insert(Value::from("b"), Value::Int(2));
        second.insert(Value::from("a"), Value::Int(1));
        assert_ne!(Value::Mapping(first.clone()), Value::Mapping(second));
        assert_eq!(Value::Mapping(first.clone()), Value::Mapping(first));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert!(Value::default().is_null());
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
    }
}
