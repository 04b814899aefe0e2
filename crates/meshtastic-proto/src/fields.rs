//! Field mapping rendering.
//!
//! Decoded messages are presented as ordered `name → value` mappings using
//! the protobuf field names. Rendering rules:
//!
//! - enums render by name, or as a number when the value is unknown
//! - `bytes` render as padded standard base64
//! - floats render with the shortest decimal that round-trips as `f32`
//! - nested messages render recursively, repeated fields as lists
//! - absent fields and empty repeated fields are omitted

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value};

use crate::enums::EnumTable;
use crate::Message;

/// An ordered field mapping.
pub type Fields = Map<String, Value>;

/// Render an `f32` the way protobuf JSON does.
pub fn float_value(v: f32) -> Value {
    if v.is_nan() {
        return Value::from("NaN");
    }
    if v.is_infinite() {
        return Value::from(if v > 0.0 { "Infinity" } else { "-Infinity" });
    }
    // f32 Display is the shortest round-trip form; widening first would add noise digits.
    v.to_string()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Builder for a [`Fields`] mapping.
#[derive(Debug, Default)]
pub struct FieldsBuilder {
    map: Fields,
}

impl FieldsBuilder {
    /// Start an empty mapping.
    pub fn new() -> Self {
        FieldsBuilder { map: Map::new() }
    }

    fn put(mut self, key: &str, value: Option<Value>) -> Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), v);
        }
        self
    }

    /// Unsigned integer field.
    pub fn uint(self, key: &str, value: Option<u32>) -> Self {
        self.put(key, value.map(Value::from))
    }

    /// Signed integer field.
    pub fn int(self, key: &str, value: Option<i32>) -> Self {
        self.put(key, value.map(Value::from))
    }

    /// Boolean field.
    pub fn boolean(self, key: &str, value: Option<bool>) -> Self {
        self.put(key, value.map(Value::from))
    }

    /// Float field.
    pub fn float(self, key: &str, value: Option<f32>) -> Self {
        self.put(key, value.map(float_value))
    }

    /// String field.
    pub fn string(self, key: &str, value: Option<&str>) -> Self {
        self.put(key, value.map(Value::from))
    }

    /// Bytes field.
    pub fn bytes(self, key: &str, value: Option<&[u8]>) -> Self {
        self.put(key, value.map(|b| Value::from(STANDARD.encode(b))))
    }

    /// Enum field.
    pub fn enumeration(self, key: &str, value: Option<i32>, table: &EnumTable) -> Self {
        self.put(key, value.map(|v| table.render(v)))
    }

    /// Nested message field.
    pub fn message<M: Message>(self, key: &str, value: Option<&M>) -> Self {
        self.put(key, value.map(|m| Value::Object(m.to_fields())))
    }

    /// Repeated nested message field.
    pub fn messages<M: Message>(self, key: &str, values: &[M]) -> Self {
        let list = (!values.is_empty())
            .then(|| Value::Array(values.iter().map(|m| Value::Object(m.to_fields())).collect()));
        self.put(key, list)
    }

    /// Repeated unsigned integer field.
    pub fn uints(self, key: &str, values: &[u32]) -> Self {
        let list = (!values.is_empty())
            .then(|| Value::Array(values.iter().copied().map(Value::from).collect()));
        self.put(key, list)
    }

    /// Finish the mapping.
    pub fn build(self) -> Fields {
        self.map
    }
}
