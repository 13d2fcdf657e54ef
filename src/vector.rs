//! Host-side 2 and 3 component vectors.
//!
//! Components keep the exact number the script handed over, so a vector
//! built from integers stays an integer vector until it meets a float. The
//! native `glam` types are only produced on demand through the `to_*`
//! conversions.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use glam::{IVec2, IVec3, UVec2, Vec2, Vec3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BindingError;
use crate::number::Number;

/// Applies `op` pairwise to two component arrays.
pub(crate) fn zip_components<const N: usize>(
    lhs: [Number; N],
    rhs: [Number; N],
    op: impl Fn(Number, Number) -> Number,
) -> [Number; N] {
    std::array::from_fn(|index| op(lhs[index], rhs[index]))
}

/// Fallible variant of [`zip_components`], used by floor division.
pub(crate) fn try_zip_components<const N: usize>(
    lhs: [Number; N],
    rhs: [Number; N],
    op: impl Fn(Number, Number) -> Result<Number, BindingError>,
) -> Result<[Number; N], BindingError> {
    let mut out = [Number::ZERO; N];
    for (index, slot) in out.iter_mut().enumerate() {
        *slot = op(lhs[index], rhs[index])?;
    }
    Ok(out)
}

/// True when both arrays hold the same runtime number kind at every index.
pub(crate) fn same_kinds<const N: usize>(lhs: &[Number; N], rhs: &[Number; N]) -> bool {
    lhs.iter().zip(rhs).all(|(a, b)| a.kind() == b.kind())
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: Number,
    pub y: Number,
}

/// Accepted constructor shapes for [`Vector2`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Vector2Init {
    Zero,
    Sequence([Number; 2]),
    Copy(Vector2),
    Components(Number, Number),
}

/// Right-hand side of a [`Vector2`] operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Vector2Operand {
    Vector(Vector2),
    Scalar(Number),
}

impl Vector2Operand {
    pub fn components(self) -> [Number; 2] {
        match self {
            Vector2Operand::Vector(vector) => vector.components(),
            Vector2Operand::Scalar(scalar) => [scalar; 2],
        }
    }
}

impl Vector2 {
    pub const TYPE_NAME: &'static str = "Vector2";
    pub const ZERO: Vector2 = Vector2 {
        x: Number::ZERO,
        y: Number::ZERO,
    };

    pub fn new(x: impl Into<Number>, y: impl Into<Number>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn from_components([x, y]: [Number; 2]) -> Self {
        Self { x, y }
    }

    pub fn components(self) -> [Number; 2] {
        [self.x, self.y]
    }

    /// Equality that also requires every component to share its number kind.
    pub fn strict_eq(&self, other: &Self) -> bool {
        same_kinds(&self.components(), &other.components()) && self == other
    }

    pub fn apply(self, rhs: Vector2Operand, op: impl Fn(Number, Number) -> Number) -> Self {
        Self::from_components(zip_components(self.components(), rhs.components(), op))
    }

    pub fn floor_div(self, rhs: Vector2Operand) -> Result<Self, BindingError> {
        try_zip_components(self.components(), rhs.components(), Number::floor_div)
            .map(Self::from_components)
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_f32(), self.y.to_f32())
    }

    pub fn to_ivec2(self) -> Result<IVec2, BindingError> {
        Ok(IVec2::new(self.x.to_i32()?, self.y.to_i32()?))
    }

    pub fn to_uvec2(self) -> Result<UVec2, BindingError> {
        Ok(UVec2::new(self.x.to_u32()?, self.y.to_u32()?))
    }
}

impl From<Vector2Init> for Vector2 {
    fn from(init: Vector2Init) -> Self {
        match init {
            Vector2Init::Zero => Vector2::ZERO,
            Vector2Init::Sequence(components) => Vector2::from_components(components),
            Vector2Init::Copy(vector) => vector,
            Vector2Init::Components(x, y) => Vector2 { x, y },
        }
    }
}

impl From<Vec2> for Vector2 {
    fn from(value: Vec2) -> Self {
        Vector2::new(value.x, value.y)
    }
}

impl From<IVec2> for Vector2 {
    fn from(value: IVec2) -> Self {
        Vector2::new(value.x, value.y)
    }
}

impl From<UVec2> for Vector2 {
    fn from(value: UVec2) -> Self {
        Vector2::new(value.x, value.y)
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        self.apply(Vector2Operand::Vector(rhs), Number::add)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        self.apply(Vector2Operand::Vector(rhs), Number::sub)
    }
}

impl Mul for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: Vector2) -> Vector2 {
        self.apply(Vector2Operand::Vector(rhs), Number::mul)
    }
}

impl Mul<Number> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: Number) -> Vector2 {
        self.apply(Vector2Operand::Scalar(rhs), Number::mul)
    }
}

impl Div for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: Vector2) -> Vector2 {
        self.apply(Vector2Operand::Vector(rhs), Number::div)
    }
}

impl Div<Number> for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: Number) -> Vector2 {
        self.apply(Vector2Operand::Scalar(rhs), Number::div)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", Self::TYPE_NAME, self.x, self.y)
    }
}

impl Serialize for Vector2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.components().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vector2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[Number; 2]>::deserialize(deserializer).map(Vector2::from_components)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: Number,
    pub y: Number,
    pub z: Number,
}

/// Accepted constructor shapes for [`Vector3`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Vector3Init {
    Zero,
    Sequence([Number; 3]),
    Copy(Vector3),
    Components(Number, Number, Number),
}

impl Vector3 {
    pub const TYPE_NAME: &'static str = "Vector3";
    pub const ZERO: Vector3 = Vector3 {
        x: Number::ZERO,
        y: Number::ZERO,
        z: Number::ZERO,
    };

    pub fn new(x: impl Into<Number>, y: impl Into<Number>, z: impl Into<Number>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    pub fn from_components([x, y, z]: [Number; 3]) -> Self {
        Self { x, y, z }
    }

    pub fn components(self) -> [Number; 3] {
        [self.x, self.y, self.z]
    }

    pub fn strict_eq(&self, other: &Self) -> bool {
        same_kinds(&self.components(), &other.components()) && self == other
    }

    pub fn apply(self, rhs: Vector3, op: impl Fn(Number, Number) -> Number) -> Self {
        Self::from_components(zip_components(self.components(), rhs.components(), op))
    }

    pub fn floor_div(self, rhs: Vector3) -> Result<Self, BindingError> {
        try_zip_components(self.components(), rhs.components(), Number::floor_div)
            .map(Self::from_components)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.to_f32(), self.y.to_f32(), self.z.to_f32())
    }

    pub fn to_ivec3(self) -> Result<IVec3, BindingError> {
        Ok(IVec3::new(
            self.x.to_i32()?,
            self.y.to_i32()?,
            self.z.to_i32()?,
        ))
    }
}

impl From<Vector3Init> for Vector3 {
    fn from(init: Vector3Init) -> Self {
        match init {
            Vector3Init::Zero => Vector3::ZERO,
            Vector3Init::Sequence(components) => Vector3::from_components(components),
            Vector3Init::Copy(vector) => vector,
            Vector3Init::Components(x, y, z) => Vector3 { x, y, z },
        }
    }
}

impl From<Vec3> for Vector3 {
    fn from(value: Vec3) -> Self {
        Vector3::new(value.x, value.y, value.z)
    }
}

impl From<IVec3> for Vector3 {
    fn from(value: IVec3) -> Self {
        Vector3::new(value.x, value.y, value.z)
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        self.apply(rhs, Number::add)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        self.apply(rhs, Number::sub)
    }
}

impl Mul for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.apply(rhs, Number::mul)
    }
}

impl Div for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: Vector3) -> Vector3 {
        self.apply(rhs, Number::div)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {}, {})", Self::TYPE_NAME, self.x, self.y, self.z)
    }
}

impl Serialize for Vector3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.components().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vector3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[Number; 3]>::deserialize(deserializer).map(Vector3::from_components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_shapes_resolve_to_components() {
        assert!(Vector2::from(Vector2Init::Zero).strict_eq(&Vector2::new(0, 0)));
        let seq = Vector2::from(Vector2Init::Sequence([Number::Integer(1), Number::Float(2.0)]));
        assert!(seq.strict_eq(&Vector2::new(1, 2.0)));
        let copy = Vector3::from(Vector3Init::Copy(Vector3::new(1, 2, 3)));
        assert!(copy.strict_eq(&Vector3::new(1, 2, 3)));
    }

    #[test]
    fn same_kind_arithmetic_keeps_integers() {
        let a = Vector3::new(3, 9, 2);
        let b = Vector3::new(7, 4, 5);
        assert!((a + b).strict_eq(&Vector3::new(10, 13, 7)));
        assert!((a - b).strict_eq(&Vector3::new(-4, 5, -3)));
        assert!((a * b).strict_eq(&Vector3::new(21, 36, 10)));
        assert!(a.floor_div(b).unwrap().strict_eq(&Vector3::new(0, 2, 0)));
    }

    #[test]
    fn mixed_kind_arithmetic_promotes_to_float() {
        let a = Vector3::new(10.0, 12.0, 6.0);
        let b = Vector3::new(2, 5, 4);
        assert!((a + b).strict_eq(&Vector3::new(12.0, 17.0, 10.0)));
        assert!((a / b).strict_eq(&Vector3::new(5.0, 2.4, 1.5)));
    }

    #[test]
    fn vector2_broadcasts_scalars() {
        let v = Vector2::new(4, 6);
        assert!((v * Number::Integer(2)).strict_eq(&Vector2::new(8, 12)));
        assert!((v / Number::Integer(2)).strict_eq(&Vector2::new(2.0, 3.0)));
        let shifted = v.apply(Vector2Operand::Scalar(Number::Integer(1)), Number::add);
        assert!(shifted.strict_eq(&Vector2::new(5, 7)));
    }

    #[test]
    fn add_then_subtract_is_identity() {
        let a = Vector2::new(1.25, -3);
        let b = Vector2::new(7, 0.5);
        assert_eq!(a + b - b, a);
    }

    #[test]
    fn strict_equality_checks_kinds() {
        let ints = Vector2::new(1, 2);
        let floats = Vector2::new(1.0, 2.0);
        assert_eq!(ints, floats);
        assert!(!ints.strict_eq(&floats));
        assert!(ints.strict_eq(&Vector2::new(1, 2)));
    }

    #[test]
    fn negation_flips_every_component() {
        assert!((-Vector3::new(1, -2, 3.5)).strict_eq(&Vector3::new(-1, 2, -3.5)));
    }

    #[test]
    fn floor_division_by_zero_vector_fails() {
        let err = Vector2::new(1, 1)
            .floor_div(Vector2Operand::Scalar(Number::Integer(0)))
            .unwrap_err();
        assert_eq!(err, BindingError::DivideByZero);
    }

    #[test]
    fn display_uses_component_text() {
        assert_eq!(Vector2::new(1, 2).to_string(), "Vector2(1, 2)");
        assert_eq!(Vector3::new(1.5, 2, 3.0).to_string(), "Vector3(1.5, 2, 3.0)");
    }

    #[test]
    fn native_conversions_coerce_components() {
        let v = Vector2::new(3.7, -2);
        assert_eq!(v.to_vec2(), Vec2::new(3.7, -2.0));
        assert_eq!(v.to_ivec2().unwrap(), IVec2::new(3, -2));
        assert!(v.to_uvec2().is_err());
        assert_eq!(Vector3::new(1, 2, 3).to_ivec3().unwrap(), IVec3::new(1, 2, 3));
        assert!(Vector2::from(UVec2::new(4, 5)).strict_eq(&Vector2::new(4, 5)));
        assert!(Vector3::from(Vec3::ONE).strict_eq(&Vector3::new(1.0, 1.0, 1.0)));
    }
}
