use std::fmt;

use crate::{
    error::DecodeError,
    number::{Numeric, plain_decimal},
};

/// A parsed JSON document.
///
/// Objects keep their entries in file order, duplicates included. Numbers keep
/// their literal text so that NaN, infinities and values wider than `f64`
/// survive a round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(JsonNumber),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            JsonValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, JsonValue)]> {
        match self {
            JsonValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// First entry of an object with the given key.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object()?
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Short human readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            JsonValue::Null => "null".to_string(),
            JsonValue::Bool(b) => format!("boolean {b}"),
            JsonValue::Number(n) => format!("number {n}"),
            JsonValue::String(s) => format!("string {s:?}"),
            JsonValue::Array(items) => format!("array of {} entries", items.len()),
            JsonValue::Object(_) => "object".to_string(),
        }
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<JsonNumber> for JsonValue {
    fn from(value: JsonNumber) -> Self {
        JsonValue::Number(value)
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    JsonValue::Number(JsonNumber(n.to_string()))
                } else {
                    // serde_json may print floats with an exponent
                    JsonValue::Number(JsonNumber::from_f64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                JsonValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl TryFrom<&JsonValue> for serde_json::Value {
    type Error = DecodeError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        Ok(match value {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(*b),
            JsonValue::Number(n) => serde_json::Value::Number(n.to_serde()?),
            JsonValue::String(s) => serde_json::Value::String(s.clone()),
            JsonValue::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            JsonValue::Object(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), serde_json::Value::try_from(value)?);
                }
                serde_json::Value::Object(map)
            }
        })
    }
}

/// The literal text of a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonNumber(String);

impl JsonNumber {
    /// Validates a number literal. Besides the JSON grammar this accepts
    /// `NaN`, `Infinity` and `-Infinity`.
    pub fn parse(literal: &str) -> Option<Self> {
        if is_number_literal(literal) {
            Some(JsonNumber(literal.to_string()))
        } else {
            None
        }
    }

    pub fn from_f64(value: f64) -> Self {
        JsonNumber(float_literal(value, value.to_string()))
    }

    pub fn from_f32(value: f32) -> Self {
        JsonNumber(float_literal(f64::from(value), value.to_string()))
    }

    /// Literal for any numeric value, floats always keeping a fraction part.
    pub fn from_numeric(value: &Numeric) -> Self {
        match value {
            Numeric::F32(v) => Self::from_f32(*v),
            Numeric::F64(v) => Self::from_f64(*v),
            Numeric::Decimal(v) => JsonNumber(plain_decimal(v)),
            other => JsonNumber(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number without any assumption about its width.
    pub fn to_numeric(&self) -> Numeric {
        Numeric::Text(self.0.clone())
    }

    /// Whether the literal has neither fraction nor exponent.
    pub fn is_integer(&self) -> bool {
        !self.0.contains(['.', 'e', 'E']) && !self.is_special()
    }

    pub fn is_special(&self) -> bool {
        matches!(self.0.as_str(), "NaN" | "Infinity" | "-Infinity")
    }

    fn to_serde(&self) -> Result<serde_json::Number, DecodeError> {
        if let Ok(v) = self.0.parse::<i64>() {
            return Ok(v.into());
        }
        if let Ok(v) = self.0.parse::<u64>() {
            return Ok(v.into());
        }
        self.0
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .ok_or_else(|| DecodeError::TypeMismatch {
                expected: "finite number".to_string(),
                found: self.0.clone(),
            })
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! json_number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for JsonNumber {
                fn from(value: $ty) -> Self {
                    JsonNumber(value.to_string())
                }
            }

            impl From<$ty> for JsonValue {
                fn from(value: $ty) -> Self {
                    JsonValue::Number(value.into())
                }
            }
        )*
    };
}

json_number_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

fn float_literal(value: f64, finite: String) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if finite.contains('.') {
        finite
    } else {
        format!("{finite}.0")
    }
}

fn is_number_literal(text: &str) -> bool {
    if matches!(text, "NaN" | "Infinity" | "-Infinity") {
        return true;
    }
    let bytes = text.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            digits(&mut i);
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_literals() {
        for ok in ["0", "-0", "12", "-3.5", "1e9", "2.5E-3", "NaN", "-Infinity"] {
            assert!(JsonNumber::parse(ok).is_some(), "{ok}");
        }
        for bad in ["", "-", "01", "1.", ".5", "1e", "+1", "nan", "1_000"] {
            assert!(JsonNumber::parse(bad).is_none(), "{bad}");
        }
    }

    #[test]
    fn test_float_literals_keep_fraction() {
        assert_eq!(JsonNumber::from_f64(1.0).as_str(), "1.0");
        assert_eq!(JsonNumber::from_f64(0.25).as_str(), "0.25");
        assert_eq!(JsonNumber::from_f32(0.1).as_str(), "0.1");
        assert_eq!(JsonNumber::from_f64(1e21).as_str(), "1000000000000000000000.0");
        assert_eq!(JsonNumber::from_f64(f64::NAN).as_str(), "NaN");
        assert_eq!(JsonNumber::from_f32(f32::INFINITY).as_str(), "Infinity");
    }

    #[test]
    fn test_serde_conversion() {
        let value: JsonValue = serde_json::json!({"a": [1, 2.5, "x"], "b": null}).into();
        assert_eq!(value.get("b"), Some(&JsonValue::Null));
        let back = serde_json::Value::try_from(&value).unwrap();
        assert_eq!(back, serde_json::json!({"a": [1, 2.5, "x"], "b": null}));

        let nan = JsonValue::Number(JsonNumber::from_f64(f64::NAN));
        assert!(serde_json::Value::try_from(&nan).is_err());
    }
}
