//! Untyped JSON values.
//!
//! [`Value`] is the tree a document parses into when no destination type is
//! given. Numbers keep their source text so no precision is lost before a
//! caller decides which numeric type it wants.

use std::fmt;

use tinyjson_buffers::Writer;

use crate::encoder::write_str;
use crate::format::{NumberCodec, StdNumberCodec};

/// The six kinds of JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Bool => "bool",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A number literal, kept as its validated source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// Wraps text the tokenizer already validated.
    pub(crate) fn from_literal(text: &str) -> Self {
        Self(text.to_string())
    }

    /// Returns `None` for NaN and infinities, which JSON cannot carry.
    pub fn from_f64(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        let mut writer = Writer::with_alloc_size(32);
        StdNumberCodec.write_f64(&mut writer, v);
        Some(Self(String::from_utf8_lossy(&writer.flush()).into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the literal has no fraction or exponent part.
    pub fn is_integer(&self) -> bool {
        !self.0.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.is_integer().then(|| self.0.parse().ok()).flatten()
    }

    pub fn as_u64(&self) -> Option<u64> {
        let text = if self.0 == "-0" { "0" } else { self.0.as_str() };
        self.is_integer().then(|| text.parse().ok()).flatten()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self(v.to_string())
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed JSON document.
///
/// Object members stay in input order. Duplicate keys are kept as they
/// appeared; [`Value::get`] returns the first one.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn json_type(&self) -> JsonType {
        match self {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Bool,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// First member named `key`, if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Renders the value as compact JSON text.
    pub fn to_json(&self) -> String {
        let mut writer = Writer::new();
        self.write(&mut writer);
        String::from_utf8_lossy(&writer.flush()).into_owned()
    }

    fn write(&self, writer: &mut Writer) {
        match self {
            Value::Null => writer.ascii("null"),
            Value::Bool(true) => writer.ascii("true"),
            Value::Bool(false) => writer.ascii("false"),
            Value::Number(n) => writer.ascii(n.as_str()),
            Value::String(s) => write_str(writer, s),
            Value::Array(items) => {
                writer.u8(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writer.u8(b',');
                    }
                    item.write(writer);
                }
                writer.u8(b']');
            }
            Value::Object(members) => {
                writer.u8(b'{');
                for (i, (key, item)) in members.iter().enumerate() {
                    if i > 0 {
                        writer.u8(b',');
                    }
                    write_str(writer, key);
                    writer.u8(b':');
                    item.write(writer);
                }
                writer.u8(b'}');
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_views_respect_literal_form() {
        let n = Number::from_literal("30");
        assert_eq!(n.as_i64(), Some(30));
        assert_eq!(n.as_u64(), Some(30));
        assert_eq!(n.as_f64(), Some(30.0));

        let n = Number::from_literal("-1.5e3");
        assert!(!n.is_integer());
        assert_eq!(n.as_i64(), None);
        assert_eq!(n.as_f64(), Some(-1500.0));

        assert_eq!(Number::from_literal("-1").as_u64(), None);
        assert_eq!(Number::from_literal("-0").as_u64(), Some(0));
    }

    #[test]
    fn non_finite_floats_have_no_number() {
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
        assert_eq!(Number::from_f64(2.5).map(|n| n.to_string()), Some("2.5".into()));
    }

    #[test]
    fn to_json_keeps_member_order() {
        let value = Value::Object(vec![
            ("b".into(), Value::Number(1i64.into())),
            ("a".into(), Value::Array(vec![Value::Null, Value::Bool(true)])),
            ("s".into(), Value::String("x\"y".into())),
        ]);
        assert_eq!(value.to_json(), r#"{"b":1,"a":[null,true],"s":"x\"y"}"#);
    }

    #[test]
    fn get_returns_first_duplicate() {
        let value = Value::Object(vec![
            ("k".into(), Value::Bool(true)),
            ("k".into(), Value::Bool(false)),
        ]);
        assert_eq!(value.get("k"), Some(&Value::Bool(true)));
        assert_eq!(value.get("missing"), None);
        assert_eq!(value.json_type(), JsonType::Object);
    }
}
