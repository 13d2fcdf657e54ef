//! Reads Lua values into the host value types.
//!
//! Every operation accepts a closed set of input shapes. The readers below
//! classify a Lua value into one of those shapes and report a conversion
//! error when none applies.

use mlua::{FromLua, IntoLua, Lua, Result as LuaResult, Table, Value};

use crate::color::{Color, ColorInit};
use crate::error::BindingError;
use crate::number::Number;
use crate::vector::{Vector2, Vector2Init, Vector2Operand, Vector3, Vector3Init};
use crate::video_mode::VideoMode;

use super::userdata::Hosted;

pub(super) fn conversion_error(value: &Value, to: &'static str) -> mlua::Error {
    mlua::Error::FromLuaConversionError {
        from: value.type_name(),
        to,
        message: Some(format!("expected {to} userdata or table")),
    }
}

pub(super) fn number(value: &Value) -> LuaResult<Number> {
    match value {
        Value::Integer(value) => Ok(Number::Integer(*value)),
        Value::Number(value) => Ok(Number::Float(*value)),
        _ => Err(mlua::Error::FromLuaConversionError {
            from: value.type_name(),
            to: "number",
            message: Some("expected an integer or a float".into()),
        }),
    }
}

impl<'lua> FromLua<'lua> for Number {
    fn from_lua(value: Value<'lua>, _: &'lua Lua) -> LuaResult<Self> {
        number(&value)
    }
}

impl<'lua> IntoLua<'lua> for Number {
    fn into_lua(self, _: &'lua Lua) -> LuaResult<Value<'lua>> {
        Ok(match self {
            Number::Integer(value) => Value::Integer(value),
            Number::Float(value) => Value::Number(value),
        })
    }
}

/// Array part of `table` when it holds exactly `N` entries.
fn sequence<const N: usize>(table: &Table) -> LuaResult<Option<[Number; N]>> {
    if table.raw_len() != N {
        return Ok(None);
    }
    let mut out = [Number::ZERO; N];
    for (index, slot) in out.iter_mut().enumerate() {
        *slot = table.raw_get(index + 1)?;
    }
    Ok(Some(out))
}

/// Named fields of `table`, or `None` when any of them is missing.
fn named<const N: usize>(table: &Table, keys: [&str; N]) -> LuaResult<Option<[Number; N]>> {
    let mut out = [Number::ZERO; N];
    for (slot, key) in out.iter_mut().zip(keys) {
        match table.get::<_, Option<Number>>(key)? {
            Some(value) => *slot = value,
            None => return Ok(None),
        }
    }
    Ok(Some(out))
}

fn is_sequence(table: &Table) -> bool {
    table.raw_len() > 0
}

/// Vector2 userdata, a two element sequence, or a table with `x` and `y`.
pub(super) fn read_vector2(value: &Value) -> LuaResult<Option<Vector2>> {
    match value {
        Value::UserData(ud) => Ok(ud.borrow::<Hosted<Vector2>>().ok().map(|this| this.value)),
        Value::Table(table) if is_sequence(table) => {
            Ok(sequence::<2>(table)?.map(Vector2::from_components))
        }
        Value::Table(table) => Ok(named(table, ["x", "y"])?.map(Vector2::from_components)),
        _ => Ok(None),
    }
}

pub(super) fn read_vector3(value: &Value) -> LuaResult<Option<Vector3>> {
    match value {
        Value::UserData(ud) => Ok(ud.borrow::<Hosted<Vector3>>().ok().map(|this| this.value)),
        Value::Table(table) if is_sequence(table) => {
            Ok(sequence::<3>(table)?.map(Vector3::from_components))
        }
        Value::Table(table) => Ok(named(table, ["x", "y", "z"])?.map(Vector3::from_components)),
        _ => Ok(None),
    }
}

/// Color userdata, a 3 or 4 element sequence, or a table with `r`, `g`,
/// `b` and `a`.
pub(super) fn read_color(value: &Value) -> LuaResult<Option<Color>> {
    match value {
        Value::UserData(ud) => Ok(ud.borrow::<Hosted<Color>>().ok().map(|this| this.value)),
        Value::Table(table) if is_sequence(table) => {
            Ok(color_sequence(table)?.map(Color::from))
        }
        Value::Table(table) => Ok(named(table, ["r", "g", "b", "a"])?.map(Color::from_components)),
        _ => Ok(None),
    }
}

fn color_sequence(table: &Table) -> LuaResult<Option<ColorInit>> {
    if let Some(channels) = sequence::<3>(table)? {
        return Ok(Some(ColorInit::Sequence(channels)));
    }
    Ok(sequence::<4>(table)?.map(ColorInit::SequenceWithAlpha))
}

pub(super) fn read_video_mode(value: &Value) -> LuaResult<Option<VideoMode>> {
    match value {
        Value::UserData(ud) => Ok(ud.borrow::<Hosted<VideoMode>>().ok().map(|this| this.value)),
        Value::Table(table) if is_sequence(table) => match sequence::<3>(table)? {
            Some([width, height, bpp]) => Ok(Some(VideoMode::new(
                width.to_u32()?,
                height.to_u32()?,
                bpp.to_u32()?,
            ))),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

pub(super) fn vector2_init(args: &[Value]) -> LuaResult<Vector2Init> {
    match args {
        [] => Ok(Vector2Init::Zero),
        [Value::Table(table)] if is_sequence(table) => sequence::<2>(table)?
            .map(Vector2Init::Sequence)
            .ok_or_else(|| sequence_length_error(table, Vector2::TYPE_NAME)),
        [value] => read_vector2(value)?
            .map(Vector2Init::Copy)
            .ok_or_else(|| conversion_error(value, Vector2::TYPE_NAME)),
        [x, y] => Ok(Vector2Init::Components(number(x)?, number(y)?)),
        _ => Err(BindingError::arity(Vector2::TYPE_NAME, args.len(), "0..2").into()),
    }
}

pub(super) fn vector3_init(args: &[Value]) -> LuaResult<Vector3Init> {
    match args {
        [] => Ok(Vector3Init::Zero),
        [Value::Table(table)] if is_sequence(table) => sequence::<3>(table)?
            .map(Vector3Init::Sequence)
            .ok_or_else(|| sequence_length_error(table, Vector3::TYPE_NAME)),
        [value] => read_vector3(value)?
            .map(Vector3Init::Copy)
            .ok_or_else(|| conversion_error(value, Vector3::TYPE_NAME)),
        [x, y, z] => Ok(Vector3Init::Components(number(x)?, number(y)?, number(z)?)),
        _ => Err(BindingError::arity(Vector3::TYPE_NAME, args.len(), "0..3").into()),
    }
}

pub(super) fn color_init(args: &[Value]) -> LuaResult<ColorInit> {
    match args {
        [] => Ok(ColorInit::Default),
        [Value::Integer(packed)] => u32::try_from(*packed).map(ColorInit::Packed).map_err(|_| {
            BindingError::OutOfRange {
                value: packed.to_string(),
                to: "packed color",
            }
            .into()
        }),
        [Value::Table(table)] if is_sequence(table) => color_sequence(table)?
            .ok_or_else(|| sequence_length_error(table, Color::TYPE_NAME)),
        [value] => read_color(value)?
            .map(ColorInit::Copy)
            .ok_or_else(|| conversion_error(value, Color::TYPE_NAME)),
        [r, g, b] => Ok(ColorInit::Channels(number(r)?, number(g)?, number(b)?, None)),
        [r, g, b, a] => Ok(ColorInit::Channels(
            number(r)?,
            number(g)?,
            number(b)?,
            Some(number(a)?),
        )),
        _ => Err(BindingError::arity(Color::TYPE_NAME, args.len(), "0, 1, 3 or 4").into()),
    }
}

pub(super) fn video_mode_init(args: &[Value]) -> LuaResult<VideoMode> {
    match args {
        [] => Ok(VideoMode::default()),
        [value] => read_video_mode(value)?
            .ok_or_else(|| conversion_error(value, VideoMode::TYPE_NAME)),
        [width, height] => Ok(VideoMode::with_default_depth(
            number(width)?.to_u32()?,
            number(height)?.to_u32()?,
        )),
        [width, height, bpp] => Ok(VideoMode::new(
            number(width)?.to_u32()?,
            number(height)?.to_u32()?,
            number(bpp)?.to_u32()?,
        )),
        _ => Err(BindingError::arity(VideoMode::TYPE_NAME, args.len(), "0..3").into()),
    }
}

fn sequence_length_error(table: &Table, to: &'static str) -> mlua::Error {
    BindingError::type_error(format!("table of length {}", table.raw_len()), to).into()
}

/// Scalars broadcast to both components; anything else must be vector-like.
pub(super) fn vector2_operand(value: &Value) -> LuaResult<Vector2Operand> {
    match value {
        Value::Integer(_) | Value::Number(_) => Ok(Vector2Operand::Scalar(number(value)?)),
        _ => read_vector2(value)?
            .map(Vector2Operand::Vector)
            .ok_or_else(|| conversion_error(value, Vector2::TYPE_NAME)),
    }
}

pub(super) fn vector3_operand(value: &Value) -> LuaResult<Vector3> {
    read_vector3(value)?.ok_or_else(|| conversion_error(value, Vector3::TYPE_NAME))
}

pub(super) fn color_operand(value: &Value) -> LuaResult<Color> {
    read_color(value)?.ok_or_else(|| conversion_error(value, Color::TYPE_NAME))
}

impl<'lua> FromLua<'lua> for Vector2 {
    fn from_lua(value: Value<'lua>, _: &'lua Lua) -> LuaResult<Self> {
        read_vector2(&value)?.ok_or_else(|| conversion_error(&value, Vector2::TYPE_NAME))
    }
}

impl<'lua> FromLua<'lua> for Vector3 {
    fn from_lua(value: Value<'lua>, _: &'lua Lua) -> LuaResult<Self> {
        vector3_operand(&value)
    }
}

/// Native conversion only accepts a color userdata or a table with all four
/// named channels.
impl<'lua> FromLua<'lua> for Color {
    fn from_lua(value: Value<'lua>, _: &'lua Lua) -> LuaResult<Self> {
        let color = match &value {
            Value::UserData(ud) => ud.borrow::<Hosted<Color>>().ok().map(|this| this.value),
            Value::Table(table) => named(table, ["r", "g", "b", "a"])?.map(Color::from_components),
            _ => None,
        };
        color.ok_or_else(|| conversion_error(&value, Color::TYPE_NAME))
    }
}

impl<'lua> FromLua<'lua> for VideoMode {
    fn from_lua(value: Value<'lua>, _: &'lua Lua) -> LuaResult<Self> {
        read_video_mode(&value)?.ok_or_else(|| conversion_error(&value, VideoMode::TYPE_NAME))
    }
}

impl<'lua> IntoLua<'lua> for Vector2 {
    fn into_lua(self, lua: &'lua Lua) -> LuaResult<Value<'lua>> {
        Hosted::new(self).into_lua(lua)
    }
}

impl<'lua> IntoLua<'lua> for Vector3 {
    fn into_lua(self, lua: &'lua Lua) -> LuaResult<Value<'lua>> {
        Hosted::new(self).into_lua(lua)
    }
}

impl<'lua> IntoLua<'lua> for Color {
    fn into_lua(self, lua: &'lua Lua) -> LuaResult<Value<'lua>> {
        Hosted::new(self).into_lua(lua)
    }
}

impl<'lua> IntoLua<'lua> for VideoMode {
    fn into_lua(self, lua: &'lua Lua) -> LuaResult<Value<'lua>> {
        Hosted::new(self).into_lua(lua)
    }
}
