use std::fmt;
use std::ops::{Add, Mul, Sub};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::number::Number;
use crate::vector::{same_kinds, zip_components};

/// Native 8-bit RGBA color, laid out exactly like the packed integer when
/// read big-endian.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decodes `0xRRGGBBAA`.
    pub fn from_integer(packed: u32) -> Self {
        bytemuck::cast(packed.to_be_bytes())
    }

    /// Encodes `0xRRGGBBAA`.
    pub fn to_integer(self) -> u32 {
        u32::from_be_bytes(bytemuck::cast(self))
    }
}

/// Host-side color. Channels hold whatever number the script supplied; they
/// are only narrowed to bytes when converted to [`Rgba`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: Number,
    pub g: Number,
    pub b: Number,
    pub a: Number,
}

/// Accepted constructor shapes for [`Color`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorInit {
    Default,
    Packed(u32),
    Sequence([Number; 3]),
    SequenceWithAlpha([Number; 4]),
    Copy(Color),
    Channels(Number, Number, Number, Option<Number>),
}

const fn channel(value: i64) -> Number {
    Number::Integer(value)
}

const OPAQUE: Number = channel(255);

impl Color {
    pub const TYPE_NAME: &'static str = "Color";

    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const GREEN: Color = Color::rgba(0, 255, 0, 255);
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    pub const YELLOW: Color = Color::rgba(255, 255, 0, 255);
    pub const MAGENTA: Color = Color::rgba(255, 0, 255, 255);
    pub const CYAN: Color = Color::rgba(0, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Named constants in registration order.
    pub const NAMED: [(&'static str, Color); 9] = [
        ("Black", Color::BLACK),
        ("White", Color::WHITE),
        ("Red", Color::RED),
        ("Green", Color::GREEN),
        ("Blue", Color::BLUE),
        ("Yellow", Color::YELLOW),
        ("Magenta", Color::MAGENTA),
        ("Cyan", Color::CYAN),
        ("Transparent", Color::TRANSPARENT),
    ];

    pub const fn rgba(r: i64, g: i64, b: i64, a: i64) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: channel(a),
        }
    }

    pub fn new(r: impl Into<Number>, g: impl Into<Number>, b: impl Into<Number>) -> Self {
        Self::from_components([r.into(), g.into(), b.into(), OPAQUE])
    }

    pub fn from_components([r, g, b, a]: [Number; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub fn components(self) -> [Number; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_integer(packed: u32) -> Self {
        Rgba::from_integer(packed).into()
    }

    pub fn to_integer(self) -> u32 {
        self.to_rgba().to_integer()
    }

    /// Narrows every channel to a byte, wrapping rather than clamping.
    pub fn to_rgba(self) -> Rgba {
        Rgba::new(
            self.r.to_u8_wrapping(),
            self.g.to_u8_wrapping(),
            self.b.to_u8_wrapping(),
            self.a.to_u8_wrapping(),
        )
    }

    pub fn strict_eq(&self, other: &Self) -> bool {
        same_kinds(&self.components(), &other.components()) && self == other
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<ColorInit> for Color {
    fn from(init: ColorInit) -> Self {
        match init {
            ColorInit::Default => Color::BLACK,
            ColorInit::Packed(packed) => Color::from_integer(packed),
            ColorInit::Sequence([r, g, b]) => Color::from_components([r, g, b, OPAQUE]),
            ColorInit::SequenceWithAlpha(components) => Color::from_components(components),
            ColorInit::Copy(color) => color,
            ColorInit::Channels(r, g, b, a) => Color::from_components([r, g, b, a.unwrap_or(OPAQUE)]),
        }
    }
}

impl From<Rgba> for Color {
    fn from(value: Rgba) -> Self {
        Color::from_components([value.r.into(), value.g.into(), value.b.into(), value.a.into()])
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::from_components(zip_components(self.components(), rhs.components(), Number::add))
    }
}

impl Sub for Color {
    type Output = Color;

    fn sub(self, rhs: Color) -> Color {
        Color::from_components(zip_components(self.components(), rhs.components(), Number::sub))
    }
}

/// Blend-style multiply: `lhs * rhs / 255` per channel.
impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::from_components(zip_components(
            self.components(),
            rhs.components(),
            |lhs, rhs| unit_scale(lhs * rhs),
        ))
    }
}

// Integers floor-divide so in-range channels stay integers.
fn unit_scale(value: Number) -> Number {
    match value {
        Number::Integer(value) => Number::Integer(value.div_euclid(255)),
        Number::Float(value) => Number::Float(value / 255.0),
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}, {}, {})",
            Self::TYPE_NAME,
            self.r,
            self.g,
            self.b,
            self.a
        )
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.components().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[Number; 4]>::deserialize(deserializer).map(Color::from_components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_opaque_black() {
        let color = Color::from(ColorInit::Default);
        assert!(color.strict_eq(&Color::rgba(0, 0, 0, 255)));
        assert_eq!(color.to_string(), "Color(0, 0, 0, 255)");
    }

    #[test]
    fn three_channel_shapes_default_alpha() {
        let seq = Color::from(ColorInit::Sequence([1.into(), 2.into(), 3.into()]));
        let channels = Color::from(ColorInit::Channels(1.into(), 2.into(), 3.into(), None));
        assert!(seq.strict_eq(&Color::rgba(1, 2, 3, 255)));
        assert!(channels.strict_eq(&seq));
    }

    #[test]
    fn packed_integer_round_trips() {
        let color = Color::rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(color.to_integer(), 0x1234_5678);
        assert!(Color::from_integer(color.to_integer()).strict_eq(&color));
        assert_eq!(Color::WHITE.to_integer(), 0xFFFF_FFFF);
        assert_eq!(Color::RED.to_integer(), 0xFF00_00FF);
    }

    #[test]
    fn native_conversion_wraps_instead_of_clamping() {
        let color = Color::new(256, -1, 300.9);
        assert_eq!(color.to_rgba(), Rgba::new(0, 255, 44, 255));
    }

    #[test]
    fn add_and_subtract_do_not_saturate() {
        let sum = Color::rgba(200, 10, 0, 255) + Color::rgba(100, 10, 0, 255);
        assert!(sum.strict_eq(&Color::rgba(300, 20, 0, 510)));
        let difference = Color::rgba(0, 10, 0, 255) - Color::rgba(10, 10, 0, 255);
        assert!(difference.strict_eq(&Color::rgba(-10, 0, 0, 0)));
    }

    #[test]
    fn multiply_blends_per_channel() {
        let color = Color::rgba(10, 128, 200, 255);
        assert!((color * Color::WHITE).strict_eq(&color));
        assert!((color * Color::BLACK).strict_eq(&Color::rgba(0, 0, 0, 255)));
        assert_eq!(
            (Color::rgba(255, 128, 64, 255) * Color::rgba(128, 128, 128, 128)),
            Color::rgba(128, 64, 32, 128)
        );
        let floats = Color::new(255.0, 0.0, 51.0) * Color::WHITE;
        assert!(floats.strict_eq(&Color::from_components([
            Number::Float(255.0),
            Number::Float(0.0),
            Number::Float(51.0),
            Number::Integer(255),
        ])));
    }

    #[test]
    fn strict_equality_checks_kinds() {
        let ints = Color::new(1, 2, 3);
        let floats = Color::new(1.0, 2.0, 3.0);
        assert_eq!(ints, floats);
        assert!(!ints.strict_eq(&floats));
    }
}
