//! Coercion of loosely typed JSON request values.
//!
//! - integers: JSON integers, floats (truncated toward zero), booleans and
//!   integer strings
//! - floats: JSON numbers, booleans and numeric strings
//! - booleans: JSON booleans, `0`/`1` and the strings
//!   `true/false/yes/no/on/off/1/0` in any case
//! - `null` is treated as absent everywhere

use serde_json::{Map, Value};

use crate::{UrlError, UrlResult};

/// Look up `key`, treating `null` as absent.
pub fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// Coerce to a 64-bit integer.
pub fn to_i64(name: &str, value: &Value) -> UrlResult<i64> {
    let fail = || UrlError::coercion(name, "integer", value);
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                let truncated = f.trunc();
                if truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                    Ok(truncated as i64)
                } else {
                    Err(fail())
                }
            } else {
                Err(fail())
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| fail()),
        _ => Err(fail()),
    }
}

/// Coerce to `u32`, rejecting negative and oversized values.
pub fn to_u32(name: &str, value: &Value) -> UrlResult<u32> {
    let i = to_i64(name, value)?;
    u32::try_from(i).map_err(|_| UrlError::coercion(name, "unsigned 32-bit integer", value))
}

/// Coerce to `i32`, rejecting oversized values.
pub fn to_i32(name: &str, value: &Value) -> UrlResult<i32> {
    let i = to_i64(name, value)?;
    i32::try_from(i).map_err(|_| UrlError::coercion(name, "32-bit integer", value))
}

/// Coerce to `f32`.
pub fn to_f32(name: &str, value: &Value) -> UrlResult<f32> {
    let fail = || UrlError::coercion(name, "number", value);
    let f = match value {
        Value::Number(n) => n.as_f64().ok_or_else(fail)?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| fail())?,
        _ => return Err(fail()),
    };
    Ok(f as f32)
}

/// Coerce to a boolean.
pub fn to_bool(name: &str, value: &Value) -> UrlResult<bool> {
    let fail = || UrlError::coercion(name, "boolean", value);
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(fail()),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(fail()),
        },
        _ => Err(fail()),
    }
}

/// Require a string.
pub fn to_str<'a>(name: &str, value: &'a Value) -> UrlResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| UrlError::coercion(name, "string", value))
}

/// Optional `u32` field.
pub fn opt_u32(obj: &Map<String, Value>, key: &str) -> UrlResult<Option<u32>> {
    field(obj, key).map(|v| to_u32(key, v)).transpose()
}

/// Optional `i32` field.
pub fn opt_i32(obj: &Map<String, Value>, key: &str) -> UrlResult<Option<i32>> {
    field(obj, key).map(|v| to_i32(key, v)).transpose()
}

/// Optional `f32` field.
pub fn opt_f32(obj: &Map<String, Value>, key: &str) -> UrlResult<Option<f32>> {
    field(obj, key).map(|v| to_f32(key, v)).transpose()
}

/// Optional boolean field.
pub fn opt_bool(obj: &Map<String, Value>, key: &str) -> UrlResult<Option<bool>> {
    field(obj, key).map(|v| to_bool(key, v)).transpose()
}

/// Optional string field.
pub fn opt_string(obj: &Map<String, Value>, key: &str) -> UrlResult<Option<String>> {
    field(obj, key)
        .map(|v| to_str(key, v).map(str::to_string))
        .transpose()
}
