use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::BindingError;

/// Runtime subtype of a host number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Integer,
    Float,
}

/// A number as the scripting host stores it: either an integer or a float.
///
/// Arithmetic mirrors Lua 5.4. Integer operations wrap on overflow, mixing in
/// a float promotes the result, and `/` always produces a float. Equality is
/// mathematical, so `Integer(2) == Float(2.0)`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub const ZERO: Number = Number::Integer(0);

    pub fn kind(self) -> NumberKind {
        match self {
            Number::Integer(_) => NumberKind::Integer,
            Number::Float(_) => NumberKind::Float,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    /// Floor division (`//`). Integer operands stay integers and reject a
    /// zero divisor.
    pub fn floor_div(self, rhs: Number) -> Result<Number, BindingError> {
        match (self, rhs) {
            (Number::Integer(_), Number::Integer(0)) => Err(BindingError::DivideByZero),
            (Number::Integer(a), Number::Integer(b)) => {
                let quotient = a.wrapping_div(b);
                if a.wrapping_rem(b) != 0 && (a ^ b) < 0 {
                    Ok(Number::Integer(quotient - 1))
                } else {
                    Ok(Number::Integer(quotient))
                }
            }
            (lhs, rhs) => Ok(Number::Float((lhs.as_f64() / rhs.as_f64()).floor())),
        }
    }

    pub fn to_f32(self) -> f32 {
        self.as_f64() as f32
    }

    pub fn to_i32(self) -> Result<i32, BindingError> {
        let value = self.truncated("i32")?;
        i32::try_from(value).map_err(|_| self.out_of_range("i32"))
    }

    pub fn to_u32(self) -> Result<u32, BindingError> {
        let value = self.truncated("u32")?;
        u32::try_from(value).map_err(|_| self.out_of_range("u32"))
    }

    /// Byte coercion used for color channels: truncate, then wrap modulo 256.
    pub fn to_u8_wrapping(self) -> u8 {
        match self {
            Number::Integer(value) => value as u8,
            Number::Float(value) => (value.trunc() as i64) as u8,
        }
    }

    fn truncated(self, to: &'static str) -> Result<i64, BindingError> {
        match self {
            Number::Integer(value) => Ok(value),
            Number::Float(value) => {
                let value = value.trunc();
                if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
                    Ok(value as i64)
                } else {
                    Err(self.out_of_range(to))
                }
            }
        }
    }

    fn out_of_range(self, to: &'static str) -> BindingError {
        BindingError::OutOfRange {
            value: self.to_string(),
            to,
        }
    }

    fn arith(self, rhs: Number, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Number {
        match (self, rhs) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(int_op(a, b)),
            (lhs, rhs) => Number::Float(float_op(lhs.as_f64(), rhs.as_f64())),
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::ZERO
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<u8> for Number {
    fn from(value: u8) -> Self {
        Number::Integer(value.into())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value.into())
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Integer(i), Number::Float(f)) | (Number::Float(f), Number::Integer(i)) => {
                integer_equals_float(i, f)
            }
        }
    }
}

fn integer_equals_float(integer: i64, float: f64) -> bool {
    float.fract() == 0.0
        && float >= i64::MIN as f64
        && float < i64::MAX as f64
        && float as i64 == integer
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        self.arith(rhs, i64::wrapping_add, |a, b| a + b)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        self.arith(rhs, i64::wrapping_sub, |a, b| a - b)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        self.arith(rhs, i64::wrapping_mul, |a, b| a * b)
    }
}

impl Div for Number {
    type Output = Number;

    fn div(self, rhs: Number) -> Number {
        Number::Float(self.as_f64() / rhs.as_f64())
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Integer(value) => Number::Integer(value.wrapping_neg()),
            Number::Float(value) => Number::Float(-value),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Integer(value) => write!(f, "{value}"),
            Number::Float(value) => f.write_str(&format_float(value)),
        }
    }
}

/// Formats a float the way `tostring` does in Lua 5.4 (`%.14g`, plus `.0`
/// when the digits alone would read as an integer).
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let mut text = format_general(value, 14);
    if text.bytes().all(|byte| byte == b'-' || byte.is_ascii_digit()) {
        text.push_str(".0");
    }
    text
}

fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Integer(value) => serializer.serialize_i64(value),
            Number::Float(value) => serializer.serialize_f64(value),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumberVisitor)
    }
}

struct NumberVisitor;

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = Number;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a float")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Number, E> {
        Ok(Number::Integer(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Number, E> {
        i64::try_from(value)
            .map(Number::Integer)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Number, E> {
        Ok(Number::Float(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integer_and_wraps() {
        let sum = Number::Integer(3) + Number::Integer(4);
        assert_eq!(sum.kind(), NumberKind::Integer);
        assert_eq!(sum, Number::Integer(7));

        let wrapped = Number::Integer(i64::MAX) + Number::Integer(1);
        assert_eq!(wrapped, Number::Integer(i64::MIN));
    }

    #[test]
    fn mixing_in_a_float_promotes_the_result() {
        let product = Number::Integer(2) * Number::Float(1.5);
        assert_eq!(product.kind(), NumberKind::Float);
        assert_eq!(product, Number::Float(3.0));
    }

    #[test]
    fn slash_division_always_produces_a_float() {
        let quotient = Number::Integer(9) / Number::Integer(4);
        assert_eq!(quotient.kind(), NumberKind::Float);
        assert_eq!(quotient, Number::Float(2.25));
        assert!((Number::Integer(1) / Number::Integer(0)).as_f64().is_infinite());
    }

    #[test]
    fn floor_division_matches_lua() {
        assert_eq!(
            Number::Integer(7).floor_div(Number::Integer(2)),
            Ok(Number::Integer(3))
        );
        assert_eq!(
            Number::Integer(-7).floor_div(Number::Integer(2)),
            Ok(Number::Integer(-4))
        );
        assert_eq!(
            Number::Integer(i64::MIN).floor_div(Number::Integer(-1)),
            Ok(Number::Integer(i64::MIN))
        );
        assert_eq!(
            Number::Float(7.5).floor_div(Number::Integer(2)),
            Ok(Number::Float(3.0))
        );
        assert_eq!(
            Number::Integer(1).floor_div(Number::Integer(0)),
            Err(BindingError::DivideByZero)
        );
    }

    #[test]
    fn equality_is_mathematical_across_kinds() {
        assert_eq!(Number::Integer(2), Number::Float(2.0));
        assert_ne!(Number::Integer(2), Number::Float(2.5));
        assert_ne!(Number::Integer(i64::MAX), Number::Float(f64::INFINITY));
    }

    #[test]
    fn display_follows_lua_tostring() {
        assert_eq!(Number::Integer(-12).to_string(), "-12");
        assert_eq!(Number::Float(3.0).to_string(), "3.0");
        assert_eq!(Number::Float(2.4).to_string(), "2.4");
        assert_eq!(Number::Float(0.1 + 0.2).to_string(), "0.3");
        assert_eq!(Number::Float(1e20).to_string(), "1e+20");
        assert_eq!(Number::Float(1.5e-7).to_string(), "1.5e-07");
        assert_eq!(Number::Float(-0.0).to_string(), "-0.0");
        assert_eq!(Number::Float(f64::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn native_coercions_truncate_and_check_range() {
        assert_eq!(Number::Float(3.9).to_i32(), Ok(3));
        assert_eq!(Number::Float(-3.9).to_i32(), Ok(-3));
        assert!(Number::Integer(-1).to_u32().is_err());
        assert!(Number::Float(f64::NAN).to_u32().is_err());
        assert_eq!(Number::Integer(300).to_u8_wrapping(), 44);
        assert_eq!(Number::Integer(-1).to_u8_wrapping(), 255);
        assert_eq!(Number::Float(256.7).to_u8_wrapping(), 0);
    }
}
