//! Types that can be stored in a config field.
//!
//! Every field value implements [`ConfigValue`], which converts it to and from
//! the JSON document model and exposes its [`Shape`]. Adapters look at the
//! shape to decide which property kind a field gets, so no runtime type
//! inspection is needed.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    ops::{Deref, DerefMut},
    str::FromStr,
};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::DecodeError,
    json::{JsonNumber, JsonValue},
    number::{Numeric, exponent_in_bounds},
};

/// Whether a sequence is a fixed native array or a growable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Array,
    Collection,
}

/// Runtime shape of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    Null,
    Bool,
    Char,
    Text(&'a str),
    Number(Numeric),
    Sequence(SequenceKind, Vec<Shape<'a>>),
    /// Maps and any structured value.
    Object,
}

impl Shape<'_> {
    /// Values that map directly onto a JSON primitive: booleans, characters,
    /// strings and fixed-width numbers.
    pub fn is_primitive(&self) -> bool {
        match self {
            Shape::Bool | Shape::Char | Shape::Text(_) => true,
            Shape::Number(n) => n.is_fixed_width(),
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Bool => "boolean",
            Shape::Char => "character",
            Shape::Text(_) => "string",
            Shape::Number(_) => "number",
            Shape::Sequence(SequenceKind::Array, _) => "array",
            Shape::Sequence(SequenceKind::Collection, _) => "collection",
            Shape::Object => "object",
        }
    }
}

/// Conversion between a field value and its JSON form.
pub trait ConfigValue {
    fn encode(&self) -> JsonValue;

    fn decode(json: &JsonValue) -> Result<Self, DecodeError>
    where
        Self: Sized;

    fn shape(&self) -> Shape<'_>;
}

impl ConfigValue for bool {
    fn encode(&self) -> JsonValue {
        JsonValue::Bool(*self)
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        json.as_bool()
            .ok_or_else(|| DecodeError::mismatch("boolean", json))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Bool
    }
}

impl ConfigValue for char {
    fn encode(&self) -> JsonValue {
        JsonValue::String(self.to_string())
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        let mut chars = json
            .as_str()
            .ok_or_else(|| DecodeError::mismatch("character", json))?
            .chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(DecodeError::mismatch("single character string", json)),
        }
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Char
    }
}

impl ConfigValue for String {
    fn encode(&self) -> JsonValue {
        JsonValue::String(self.clone())
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        json.as_str()
            .map(str::to_string)
            .ok_or_else(|| DecodeError::mismatch("string", json))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }
}

/// Digits of `u128::MAX`, the widest fixed-width integer.
const MAX_INTEGER_DIGITS: i64 = 39;

/// Reads a finite number literal as a decimal.
///
/// Exponents far beyond the literal's own length are out of range, see
/// [`MAX_EXTRA_EXPONENT`](crate::number::MAX_EXTRA_EXPONENT).
fn decode_decimal(json: &JsonValue, target: &'static str) -> Result<BigDecimal, DecodeError> {
    let number = json
        .as_number()
        .filter(|n| !n.is_special())
        .ok_or_else(|| DecodeError::mismatch(target, json))?;
    let decimal = BigDecimal::from_str(number.as_str())
        .map_err(|_| DecodeError::mismatch(target, json))?;
    if !exponent_in_bounds(&decimal, number.as_str().len()) {
        return Err(DecodeError::OutOfRange {
            literal: number.to_string(),
            target,
        });
    }
    Ok(decimal)
}

/// Integer literals are parsed directly. Literals with a fraction or an
/// exponent are accepted when they denote a whole number.
fn decode_integer<I>(json: &JsonValue, target: &'static str) -> Result<I, DecodeError>
where
    I: FromStr + for<'a> TryFrom<&'a BigInt>,
{
    let number = json
        .as_number()
        .ok_or_else(|| DecodeError::mismatch(target, json))?;
    if let Ok(value) = number.as_str().parse::<I>() {
        return Ok(value);
    }
    let out_of_range = || DecodeError::OutOfRange {
        literal: number.to_string(),
        target,
    };
    let decimal = decode_decimal(json, target)?;
    let (_, scale) = decimal.as_bigint_and_exponent();
    // whole part wider than any fixed-width integer
    if decimal.digits() as i64 - scale > MAX_INTEGER_DIGITS {
        return Err(out_of_range());
    }
    if !decimal.is_integer() {
        return Err(DecodeError::mismatch(target, json));
    }
    let (integer, _) = decimal.with_scale(0).as_bigint_and_exponent();
    I::try_from(&integer).map_err(|_| out_of_range())
}

macro_rules! integer_value {
    ($($ty:ty => $numeric:ident),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                fn encode(&self) -> JsonValue {
                    JsonValue::Number(JsonNumber::from(*self))
                }

                fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
                    decode_integer(json, stringify!($ty))
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Number(Numeric::$numeric(*self))
                }
            }
        )*
    };
}

integer_value!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
);

impl ConfigValue for usize {
    fn encode(&self) -> JsonValue {
        JsonValue::Number(JsonNumber::from(*self))
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        decode_integer(json, "usize")
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Number(Numeric::U64(*self as u64))
    }
}

impl ConfigValue for isize {
    fn encode(&self) -> JsonValue {
        JsonValue::Number(JsonNumber::from(*self))
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        decode_integer(json, "isize")
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Number(Numeric::I64(*self as i64))
    }
}

macro_rules! float_value {
    ($($ty:ident => $numeric:ident, $from:ident),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                fn encode(&self) -> JsonValue {
                    JsonValue::Number(JsonNumber::$from(*self))
                }

                fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
                    let number = json
                        .as_number()
                        .ok_or_else(|| DecodeError::mismatch(stringify!($ty), json))?;
                    match number.as_str() {
                        "NaN" => Ok($ty::NAN),
                        "Infinity" => Ok($ty::INFINITY),
                        "-Infinity" => Ok($ty::NEG_INFINITY),
                        literal => literal
                            .parse()
                            .map_err(|_| DecodeError::mismatch(stringify!($ty), json)),
                    }
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Number(Numeric::$numeric(*self))
                }
            }
        )*
    };
}

float_value!(f32 => F32, from_f32, f64 => F64, from_f64);

impl ConfigValue for BigInt {
    fn encode(&self) -> JsonValue {
        JsonValue::Number(JsonNumber::from_numeric(&Numeric::BigInt(self.clone())))
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        let decimal = decode_decimal(json, "BigInt")?;
        if !decimal.is_integer() {
            return Err(DecodeError::mismatch("integer", json));
        }
        Ok(decimal.with_scale(0).as_bigint_and_exponent().0)
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Number(Numeric::BigInt(self.clone()))
    }
}

impl ConfigValue for BigDecimal {
    fn encode(&self) -> JsonValue {
        JsonValue::Number(JsonNumber::from_numeric(&Numeric::Decimal(self.clone())))
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        decode_decimal(json, "BigDecimal")
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Number(Numeric::Decimal(self.clone()))
    }
}

/// `None` is written as `null`.
impl<V: ConfigValue> ConfigValue for Option<V> {
    fn encode(&self) -> JsonValue {
        self.as_ref().map_or(JsonValue::Null, ConfigValue::encode)
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        if json.is_null() {
            return Ok(None);
        }
        V::decode(json).map(Some)
    }

    fn shape(&self) -> Shape<'_> {
        self.as_ref().map_or(Shape::Null, ConfigValue::shape)
    }
}

fn decode_items<V: ConfigValue>(json: &JsonValue) -> Result<Vec<V>, DecodeError> {
    json.as_array()
        .ok_or_else(|| DecodeError::mismatch("array", json))?
        .iter()
        .map(V::decode)
        .collect()
}

fn encode_items<'a, V: ConfigValue + 'a>(items: impl IntoIterator<Item = &'a V>) -> JsonValue {
    JsonValue::Array(items.into_iter().map(ConfigValue::encode).collect())
}

fn shape_items<'a, V: ConfigValue + 'a>(
    kind: SequenceKind,
    items: impl IntoIterator<Item = &'a V>,
) -> Shape<'a> {
    Shape::Sequence(kind, items.into_iter().map(ConfigValue::shape).collect())
}

impl<V: ConfigValue> ConfigValue for Vec<V> {
    fn encode(&self) -> JsonValue {
        encode_items(self)
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        decode_items(json)
    }

    fn shape(&self) -> Shape<'_> {
        shape_items(SequenceKind::Collection, self)
    }
}

impl<V: ConfigValue> ConfigValue for VecDeque<V> {
    fn encode(&self) -> JsonValue {
        encode_items(self)
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        decode_items(json).map(VecDeque::from)
    }

    fn shape(&self) -> Shape<'_> {
        shape_items(SequenceKind::Collection, self)
    }
}

impl<V: ConfigValue + Ord> ConfigValue for BTreeSet<V> {
    fn encode(&self) -> JsonValue {
        encode_items(self)
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        decode_items(json).map(|items: Vec<V>| items.into_iter().collect())
    }

    fn shape(&self) -> Shape<'_> {
        shape_items(SequenceKind::Collection, self)
    }
}

impl<V: ConfigValue, const N: usize> ConfigValue for [V; N] {
    fn encode(&self) -> JsonValue {
        encode_items(self)
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        let items: Vec<V> = decode_items(json)?;
        let found = items.len();
        items.try_into().map_err(|_| DecodeError::Length {
            expected: N,
            found,
        })
    }

    fn shape(&self) -> Shape<'_> {
        shape_items(SequenceKind::Array, self)
    }
}

impl<V: ConfigValue> ConfigValue for Box<[V]> {
    fn encode(&self) -> JsonValue {
        encode_items(self.iter())
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        decode_items(json).map(Vec::into_boxed_slice)
    }

    fn shape(&self) -> Shape<'_> {
        shape_items(SequenceKind::Array, self.iter())
    }
}

impl<V: ConfigValue> ConfigValue for BTreeMap<String, V> {
    fn encode(&self) -> JsonValue {
        JsonValue::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.encode()))
                .collect(),
        )
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        json.as_object()
            .ok_or_else(|| DecodeError::mismatch("object", json))?
            .iter()
            .map(|(key, value)| Ok((key.clone(), V::decode(value)?)))
            .collect()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Object
    }
}

/// Stores any serde type in a config field.
///
/// The value goes through [`serde_json::Value`], so it can not hold NaN or
/// infinite floats.
///
/// ```
/// use propconf::value::{ConfigValue, SerdeValue};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Endpoint {
///     host: String,
///     port: u16,
/// }
///
/// let endpoint = SerdeValue(Endpoint { host: "localhost".into(), port: 8080 });
/// let json = endpoint.encode();
/// assert_eq!(SerdeValue::<Endpoint>::decode(&json).unwrap(), endpoint);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeValue<T>(pub T);

impl<T> Deref for SerdeValue<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for SerdeValue<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Serialize + DeserializeOwned> ConfigValue for SerdeValue<T> {
    fn encode(&self) -> JsonValue {
        match serde_json::to_value(&self.0) {
            Ok(value) => value.into(),
            Err(e) => {
                error!("Failed to serialize config value: {e}");
                JsonValue::Null
            }
        }
    }

    fn decode(json: &JsonValue) -> Result<Self, DecodeError> {
        let value = serde_json::Value::try_from(json)?;
        Ok(SerdeValue(serde_json::from_value(value)?))
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    fn json(text: &str) -> JsonValue {
        parse(text).unwrap()
    }

    #[test]
    fn test_integer_decoding() {
        assert_eq!(i32::decode(&json("42")).unwrap(), 42);
        assert_eq!(i64::decode(&json("1.0e3")).unwrap(), 1000);
        assert_eq!(u8::decode(&json("2.00")).unwrap(), 2);
        assert!(matches!(
            u8::decode(&json("256")),
            Err(DecodeError::OutOfRange { target: "u8", .. })
        ));
        assert!(matches!(
            i32::decode(&json("1.5")),
            Err(DecodeError::TypeMismatch { .. })
        ));
        assert!(i32::decode(&json("NaN")).is_err());
        assert!(i32::decode(&json("\"1\"")).is_err());
    }

    #[test]
    fn test_huge_exponents_are_out_of_range() {
        let huge = json("1e100000000");
        assert!(matches!(
            i32::decode(&huge),
            Err(DecodeError::OutOfRange { target: "i32", .. })
        ));
        assert!(matches!(BigInt::decode(&huge), Err(DecodeError::OutOfRange { .. })));
        assert!(matches!(
            BigDecimal::decode(&json("1e-100000000")),
            Err(DecodeError::OutOfRange { .. })
        ));
        assert!(matches!(
            u128::decode(&json("1e40")),
            Err(DecodeError::OutOfRange { .. })
        ));

        assert_eq!(i64::decode(&json("1e18")).unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(BigInt::decode(&json("1e1000")).unwrap(), BigInt::from(10).pow(1000u32));
    }

    #[test]
    fn test_float_values() {
        assert!(f64::decode(&json("NaN")).unwrap().is_nan());
        assert_eq!(f32::decode(&json("-Infinity")).unwrap(), f32::NEG_INFINITY);
        assert_eq!(f64::decode(&json("3")).unwrap(), 3.0);
        assert_eq!(2.0f64.encode(), json("2.0"));
        assert_eq!(f64::INFINITY.encode().as_number().unwrap().as_str(), "Infinity");
    }

    #[test]
    fn test_big_numbers() {
        let big = BigInt::from(u128::MAX) * BigInt::from(10);
        let encoded = big.encode();
        assert_eq!(encoded.as_number().unwrap().as_str(), "3402823669209384634633746074317682114550");
        assert_eq!(BigInt::decode(&encoded).unwrap(), big);

        let decimal = BigDecimal::from_str("12.50").unwrap();
        assert_eq!(decimal.encode().as_number().unwrap().as_str(), "12.50");
        assert_eq!(BigDecimal::decode(&json("1e-3")).unwrap(), BigDecimal::from_str("0.001").unwrap());
        assert!(!decimal.shape().is_primitive());
    }

    #[test]
    fn test_char_and_string() {
        assert_eq!(char::decode(&json("\"x\"")).unwrap(), 'x');
        assert!(char::decode(&json("\"xy\"")).is_err());
        assert!(char::decode(&json("\"\"")).is_err());
        assert_eq!(String::from("a").shape(), Shape::Text("a"));
    }

    #[test]
    fn test_sequences() {
        let list = vec![1i32, 2, 3];
        assert_eq!(list.encode(), json("[1, 2, 3]"));
        assert_eq!(Vec::<i32>::decode(&json("[4, 5]")).unwrap(), [4, 5]);
        assert!(matches!(
            list.shape(),
            Shape::Sequence(SequenceKind::Collection, ref items) if items.len() == 3
        ));

        let array = [1.5f64, 2.5];
        assert!(matches!(array.shape(), Shape::Sequence(SequenceKind::Array, _)));
        assert!(matches!(
            <[i32; 3]>::decode(&json("[1, 2]")),
            Err(DecodeError::Length { expected: 3, found: 2 })
        ));

        let set = BTreeSet::decode(&json(r#"["b", "a", "b"]"#)).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<String>>(), ["a", "b"]);
    }

    #[test]
    fn test_options_and_maps() {
        assert_eq!(Option::<i32>::decode(&JsonValue::Null).unwrap(), None);
        assert_eq!(Some(3i32).encode(), json("3"));
        assert_eq!(None::<String>.shape(), Shape::Null);
        assert!(!Shape::Null.is_primitive());

        let map: BTreeMap<String, bool> = BTreeMap::decode(&json(r#"{"x": true}"#)).unwrap();
        assert_eq!(map.get("x"), Some(&true));
        assert_eq!(map.shape(), Shape::Object);
    }

    #[test]
    fn test_primitive_shapes() {
        assert!(true.shape().is_primitive());
        assert!('c'.shape().is_primitive());
        assert!(5u16.shape().is_primitive());
        assert!(f32::NAN.shape().is_primitive());
        assert!(!BigInt::from(1).shape().is_primitive());
        assert!(!vec![1i32].shape().is_primitive());
    }

    #[test]
    fn test_serde_value() {
        let value: SerdeValue<Vec<(String, u32)>> = SerdeValue(vec![("a".into(), 1)]);
        let encoded = value.encode();
        assert_eq!(encoded, json(r#"[["a", 1]]"#));
        assert_eq!(SerdeValue::decode(&encoded).unwrap(), value);
        assert!(matches!(
            SerdeValue::<u32>::decode(&json("\"x\"")),
            Err(DecodeError::Serde(_))
        ));
    }
}
