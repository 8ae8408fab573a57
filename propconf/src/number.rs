//! Comparison across mixed numeric representations.
//!
//! Values are normalised to [`BigDecimal`] before being compared, so an `i32`
//! can be compared against a [`BigInt`] or an `f32` without losing precision.
//! When either side is NaN or infinite the comparison falls back to the
//! ordering of `f64`, which treats NaN as equal to itself and greater than
//! positive infinity. This lets configs use those values as sentinels.

use std::{cmp::Ordering, fmt, str::FromStr};

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use thiserror::Error;

/// How far the exponent of a decimal literal may exceed the literal's length.
///
/// The exact value of `1e100000000` has a hundred million digits, so literals
/// like it are refused before anything expands them.
pub const MAX_EXTRA_EXPONENT: u64 = 1024;

/// Parses a decimal literal, refusing exponents far beyond its own digits.
///
/// Returns `None` for text that is not a decimal or whose exponent is out of
/// bounds.
pub(crate) fn parse_decimal(literal: &str) -> Option<BigDecimal> {
    let decimal = BigDecimal::from_str(literal.trim()).ok()?;
    exponent_in_bounds(&decimal, literal.len()).then_some(decimal)
}

/// Whether the scale of `value` stays within [`MAX_EXTRA_EXPONENT`] of the
/// length of the literal it was read from. Plain literals always pass.
pub(crate) fn exponent_in_bounds(value: &BigDecimal, literal_len: usize) -> bool {
    let (_, scale) = value.as_bigint_and_exponent();
    scale.unsigned_abs() <= literal_len as u64 + MAX_EXTRA_EXPONENT
}

/// A numeric representation that can not be read as a decimal.
#[derive(Debug, Clone, Error)]
#[error("the number '{text}' of type {type_name} is not supported")]
pub struct NumberError {
    pub text: String,
    pub type_name: &'static str,
}

/// Any number a config value can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    F32(f32),
    F64(f64),
    BigInt(BigInt),
    Decimal(BigDecimal),
    /// A number only known by its textual form.
    Text(String),
}

macro_rules! numeric_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Numeric {
                fn from(value: $ty) -> Self {
                    Numeric::$variant(value)
                }
            }
        )*
    };
}

numeric_from!(
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
    f32 => F32,
    f64 => F64,
    BigInt => BigInt,
    BigDecimal => Decimal,
);

impl Numeric {
    /// NaN or an infinity of either float width.
    pub fn is_special(&self) -> bool {
        match self {
            Numeric::F32(v) => v.is_nan() || v.is_infinite(),
            Numeric::F64(v) => v.is_nan() || v.is_infinite(),
            _ => false,
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Numeric::F32(v) => v.is_nan(),
            Numeric::F64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Whether this is one of the fixed-width integer or float types.
    pub fn is_fixed_width(&self) -> bool {
        !matches!(
            self,
            Numeric::BigInt(_) | Numeric::Decimal(_) | Numeric::Text(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Numeric::I8(_) => "i8",
            Numeric::I16(_) => "i16",
            Numeric::I32(_) => "i32",
            Numeric::I64(_) => "i64",
            Numeric::I128(_) => "i128",
            Numeric::U8(_) => "u8",
            Numeric::U16(_) => "u16",
            Numeric::U32(_) => "u32",
            Numeric::U64(_) => "u64",
            Numeric::U128(_) => "u128",
            Numeric::F32(_) => "f32",
            Numeric::F64(_) => "f64",
            Numeric::BigInt(_) => "BigInt",
            Numeric::Decimal(_) => "BigDecimal",
            Numeric::Text(_) => "number",
        }
    }

    /// Lossy double precision view. Unparsable text becomes NaN.
    pub fn to_f64(&self) -> f64 {
        match self {
            Numeric::I8(v) => f64::from(*v),
            Numeric::I16(v) => f64::from(*v),
            Numeric::I32(v) => f64::from(*v),
            Numeric::I64(v) => *v as f64,
            Numeric::I128(v) => *v as f64,
            Numeric::U8(v) => f64::from(*v),
            Numeric::U16(v) => f64::from(*v),
            Numeric::U32(v) => f64::from(*v),
            Numeric::U64(v) => *v as f64,
            Numeric::U128(v) => *v as f64,
            Numeric::F32(v) => f64::from(*v),
            Numeric::F64(v) => *v,
            Numeric::BigInt(v) => v.to_string().parse().unwrap_or(f64::NAN),
            Numeric::Decimal(v) => v.to_string().parse().unwrap_or(f64::NAN),
            Numeric::Text(v) => v.trim().parse().unwrap_or(f64::NAN),
        }
    }

    /// Exact decimal form of the number.
    ///
    /// # Errors
    ///
    /// Fails for non-finite floats and for text that is not a decimal.
    pub fn to_decimal(&self) -> Result<BigDecimal, NumberError> {
        let exact = |v: BigInt| BigDecimal::new(v, 0);
        let decimal = match self {
            Numeric::I8(v) => exact(BigInt::from(*v)),
            Numeric::I16(v) => exact(BigInt::from(*v)),
            Numeric::I32(v) => exact(BigInt::from(*v)),
            Numeric::I64(v) => exact(BigInt::from(*v)),
            Numeric::I128(v) => exact(BigInt::from(*v)),
            Numeric::U8(v) => exact(BigInt::from(*v)),
            Numeric::U16(v) => exact(BigInt::from(*v)),
            Numeric::U32(v) => exact(BigInt::from(*v)),
            Numeric::U64(v) => exact(BigInt::from(*v)),
            Numeric::U128(v) => exact(BigInt::from(*v)),
            Numeric::BigInt(v) => exact(v.clone()),
            Numeric::Decimal(v) => v.clone(),
            Numeric::F32(_) | Numeric::F64(_) | Numeric::Text(_) => {
                parse_decimal(&self.to_string()).ok_or_else(|| self.unsupported())?
            }
        };
        Ok(decimal)
    }

    fn unsupported(&self) -> NumberError {
        NumberError {
            text: self.to_string(),
            type_name: self.type_name(),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::I8(v) => write!(f, "{v}"),
            Numeric::I16(v) => write!(f, "{v}"),
            Numeric::I32(v) => write!(f, "{v}"),
            Numeric::I64(v) => write!(f, "{v}"),
            Numeric::I128(v) => write!(f, "{v}"),
            Numeric::U8(v) => write!(f, "{v}"),
            Numeric::U16(v) => write!(f, "{v}"),
            Numeric::U32(v) => write!(f, "{v}"),
            Numeric::U64(v) => write!(f, "{v}"),
            Numeric::U128(v) => write!(f, "{v}"),
            Numeric::F32(v) => f.write_str(&float_text(f64::from(*v), v.to_string())),
            Numeric::F64(v) => f.write_str(&float_text(*v, v.to_string())),
            Numeric::BigInt(v) => write!(f, "{v}"),
            Numeric::Decimal(v) => f.write_str(&plain_decimal(v)),
            Numeric::Text(v) => f.write_str(v),
        }
    }
}

/// Text of a float, using the literals JSON readers accept for special values.
fn float_text(value: f64, finite: String) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        finite
    }
}

/// Decimal text without an exponent.
pub(crate) fn plain_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    let mut text = digits.magnitude().to_string();
    if scale <= 0 {
        text.push_str(&"0".repeat(scale.unsigned_abs() as usize));
    } else {
        let scale = scale as usize;
        if text.len() <= scale {
            text = format!("{}{}", "0".repeat(scale - text.len() + 1), text);
        }
        text.insert(text.len() - scale, '.');
    }
    if digits.sign() == Sign::Minus {
        text.insert(0, '-');
    }
    text
}

/// `f64` ordering where NaN equals itself and sorts above positive infinity,
/// and `-0.0` sorts below `0.0`.
fn compare_f64(x: f64, y: f64) -> Ordering {
    if x < y {
        return Ordering::Less;
    }
    if x > y {
        return Ordering::Greater;
    }
    let bits = |v: f64| {
        if v.is_nan() {
            0x7ff8_0000_0000_0000_i64
        } else {
            v.to_bits() as i64
        }
    };
    bits(x).cmp(&bits(y))
}

/// Compares two numbers of any representation.
///
/// # Errors
///
/// Fails when either number can not be read as a decimal.
pub fn compare(x: &Numeric, y: &Numeric) -> Result<Ordering, NumberError> {
    if x.is_special() || y.is_special() {
        return Ok(compare_f64(x.to_f64(), y.to_f64()));
    }
    Ok(x.to_decimal()?.cmp(&y.to_decimal()?))
}

pub fn greater_than(x: &Numeric, y: &Numeric) -> Result<bool, NumberError> {
    Ok(compare(x, y)? == Ordering::Greater)
}

pub fn less_than(x: &Numeric, y: &Numeric) -> Result<bool, NumberError> {
    Ok(compare(x, y)? == Ordering::Less)
}

/// Numeric equality. NaN is never equal to anything, itself included.
pub fn equals(x: &Numeric, y: &Numeric) -> Result<bool, NumberError> {
    if x.is_nan() || y.is_nan() {
        return Ok(false);
    }
    Ok(compare(x, y)? == Ordering::Equal)
}
