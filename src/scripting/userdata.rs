use std::fmt;

use mlua::{
    AnyUserData, LuaSerdeExt, MetaMethod, Result as LuaResult, UserData, UserDataFields,
    UserDataMethods, Value,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::color::Color;
use crate::error::BindingError;
use crate::number::Number;
use crate::vector::{zip_components, Vector2, Vector3};
use crate::video_mode::VideoMode;

use super::bindings::script_context;
use super::convert::{
    color_operand, read_color, read_vector2, read_vector3, vector2_operand, vector3_operand,
};

/// Value types that can live inside a Lua userdata.
pub(crate) trait HostValue:
    Copy + fmt::Display + Serialize + DeserializeOwned + 'static
{
    const TYPE_NAME: &'static str;
}

impl HostValue for Vector2 {
    const TYPE_NAME: &'static str = Vector2::TYPE_NAME;
}

impl HostValue for Vector3 {
    const TYPE_NAME: &'static str = Vector3::TYPE_NAME;
}

impl HostValue for Color {
    const TYPE_NAME: &'static str = Color::TYPE_NAME;
}

impl HostValue for VideoMode {
    const TYPE_NAME: &'static str = VideoMode::TYPE_NAME;
}

/// A value owned by the Lua state, plus the host's frozen flag.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hosted<T> {
    pub value: T,
    pub frozen: bool,
}

impl<T: HostValue> Hosted<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            frozen: false,
        }
    }

    pub fn frozen(value: T) -> Self {
        Self {
            value,
            frozen: true,
        }
    }

    fn ensure_mutable(&self) -> LuaResult<()> {
        if self.frozen {
            Err(BindingError::Frozen(T::TYPE_NAME).into())
        } else {
            Ok(())
        }
    }

    /// Assigns through `update` unless the value is frozen.
    fn set(&mut self, update: impl FnOnce(&mut T)) -> LuaResult<()> {
        self.ensure_mutable()?;
        update(&mut self.value);
        Ok(())
    }
}

fn add_common_fields<'lua, T, F>(fields: &mut F)
where
    T: HostValue,
    Hosted<T>: UserData,
    F: UserDataFields<'lua, Hosted<T>>,
{
    fields.add_field_method_get("frozen", |_, this| Ok(this.frozen));
}

/// Copy, freeze, marshal and text methods shared by every value type.
fn add_common_methods<'lua, T, M>(methods: &mut M)
where
    T: HostValue,
    Hosted<T>: UserData,
    M: UserDataMethods<'lua, Hosted<T>>,
{
    methods.add_method("dup", |_, this, ()| Ok(Hosted::new(this.value)));
    methods.add_method("clone", |_, this, ()| Ok(*this));
    methods.add_function("freeze", |_, ud: AnyUserData| {
        ud.borrow_mut::<Hosted<T>>()?.frozen = true;
        Ok(ud)
    });
    methods.add_method("marshal_dump", |lua, this, ()| lua.to_value(&this.value));
    methods.add_method_mut("marshal_load", |lua, this, data: Value| {
        let value: T = lua.from_value(data)?;
        this.set(|slot| *slot = value)
    });
    methods.add_method("inspect", |_, this, ()| Ok(this.value.to_string()));
    methods.add_method("to_s", |_, this, ()| Ok(this.value.to_string()));
    methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
        Ok(this.value.to_string())
    });
}

/// `==` between two userdata of the same type. Lua only consults `__eq`
/// when both operands are userdata, so tables go through `equals`.
fn add_userdata_eq<'lua, T, M>(methods: &mut M)
where
    T: HostValue + PartialEq,
    Hosted<T>: UserData,
    M: UserDataMethods<'lua, Hosted<T>>,
{
    methods.add_meta_function(
        MetaMethod::Eq,
        |_, (lhs, rhs): (AnyUserData, AnyUserData)| {
            let equal = match (lhs.borrow::<Hosted<T>>(), rhs.borrow::<Hosted<T>>()) {
                (Ok(lhs), Ok(rhs)) => lhs.value == rhs.value,
                _ => false,
            };
            Ok(equal)
        },
    );
}

fn strict_other<T>(other: &Value) -> Option<T>
where
    T: HostValue,
    Hosted<T>: UserData,
{
    match other {
        Value::UserData(ud) => ud.borrow::<Hosted<T>>().ok().map(|other| other.value),
        _ => None,
    }
}

fn vector2_arith(
    lhs: &Value,
    rhs: &Value,
    op: fn(Number, Number) -> Number,
) -> LuaResult<Hosted<Vector2>> {
    let lhs = vector2_operand(lhs)?.components();
    let rhs = vector2_operand(rhs)?.components();
    Ok(Hosted::new(Vector2::from_components(zip_components(lhs, rhs, op))))
}

impl UserData for Hosted<Vector2> {
    fn add_fields<'lua, F: UserDataFields<'lua, Self>>(fields: &mut F) {
        add_common_fields::<Vector2, _>(fields);
        for name in ["x", "X"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.x));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|vector| vector.x = value)
            });
        }
        for name in ["y", "Y"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.y));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|vector| vector.y = value)
            });
        }
    }

    fn add_methods<'lua, M: UserDataMethods<'lua, Self>>(methods: &mut M) {
        add_common_methods::<Vector2, _>(methods);
        add_userdata_eq::<Vector2, _>(methods);

        methods.add_method("equals", |_, this, other: Value| {
            let other = read_vector2(&other).ok().flatten();
            Ok(other.map_or(false, |other| this.value == other))
        });
        for name in ["eql", "equal"] {
            methods.add_method(name, |_, this, other: Value| {
                let other = strict_other::<Vector2>(&other);
                Ok(other.map_or(false, |other| this.value.strict_eq(&other)))
            });
        }

        methods.add_meta_function(MetaMethod::Add, |_, (lhs, rhs): (Value, Value)| {
            vector2_arith(&lhs, &rhs, |a, b| a + b)
        });
        methods.add_meta_function(MetaMethod::Sub, |_, (lhs, rhs): (Value, Value)| {
            vector2_arith(&lhs, &rhs, |a, b| a - b)
        });
        methods.add_meta_function(MetaMethod::Mul, |_, (lhs, rhs): (Value, Value)| {
            vector2_arith(&lhs, &rhs, |a, b| a * b)
        });
        methods.add_meta_function(MetaMethod::Div, |_, (lhs, rhs): (Value, Value)| {
            vector2_arith(&lhs, &rhs, |a, b| a / b)
        });
        methods.add_meta_function(MetaMethod::IDiv, |_, (lhs, rhs): (Value, Value)| {
            let lhs = vector2_operand(&lhs)?;
            let rhs = vector2_operand(&rhs)?;
            let lhs = Vector2::from_components(lhs.components());
            Ok(Hosted::new(lhs.floor_div(rhs)?))
        });
        methods.add_meta_method(MetaMethod::Unm, |_, this, ()| Ok(Hosted::new(-this.value)));
    }
}

impl UserData for Hosted<Vector3> {
    fn add_fields<'lua, F: UserDataFields<'lua, Self>>(fields: &mut F) {
        add_common_fields::<Vector3, _>(fields);
        for name in ["x", "X"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.x));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|vector| vector.x = value)
            });
        }
        for name in ["y", "Y"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.y));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|vector| vector.y = value)
            });
        }
        for name in ["z", "Z"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.z));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|vector| vector.z = value)
            });
        }
    }

    fn add_methods<'lua, M: UserDataMethods<'lua, Self>>(methods: &mut M) {
        add_common_methods::<Vector3, _>(methods);
        add_userdata_eq::<Vector3, _>(methods);

        methods.add_method("equals", |_, this, other: Value| {
            let other = read_vector3(&other).ok().flatten();
            Ok(other.map_or(false, |other| this.value == other))
        });
        for name in ["eql", "equal"] {
            methods.add_method(name, |_, this, other: Value| {
                let other = strict_other::<Vector3>(&other);
                Ok(other.map_or(false, |other| this.value.strict_eq(&other)))
            });
        }

        methods.add_meta_function(MetaMethod::Add, |_, (lhs, rhs): (Value, Value)| {
            Ok(Hosted::new(vector3_operand(&lhs)? + vector3_operand(&rhs)?))
        });
        methods.add_meta_function(MetaMethod::Sub, |_, (lhs, rhs): (Value, Value)| {
            Ok(Hosted::new(vector3_operand(&lhs)? - vector3_operand(&rhs)?))
        });
        methods.add_meta_function(MetaMethod::Mul, |_, (lhs, rhs): (Value, Value)| {
            Ok(Hosted::new(vector3_operand(&lhs)? * vector3_operand(&rhs)?))
        });
        methods.add_meta_function(MetaMethod::Div, |_, (lhs, rhs): (Value, Value)| {
            Ok(Hosted::new(vector3_operand(&lhs)? / vector3_operand(&rhs)?))
        });
        methods.add_meta_function(MetaMethod::IDiv, |_, (lhs, rhs): (Value, Value)| {
            let quotient = vector3_operand(&lhs)?.floor_div(vector3_operand(&rhs)?)?;
            Ok(Hosted::new(quotient))
        });
        methods.add_meta_method(MetaMethod::Unm, |_, this, ()| Ok(Hosted::new(-this.value)));
    }
}

impl UserData for Hosted<Color> {
    fn add_fields<'lua, F: UserDataFields<'lua, Self>>(fields: &mut F) {
        add_common_fields::<Color, _>(fields);
        for name in ["r", "R"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.r));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|color| color.r = value)
            });
        }
        for name in ["g", "G"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.g));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|color| color.g = value)
            });
        }
        for name in ["b", "B"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.b));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|color| color.b = value)
            });
        }
        for name in ["a", "A"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.a));
            fields.add_field_method_set(name, |_, this, value: Number| {
                this.set(|color| color.a = value)
            });
        }
    }

    fn add_methods<'lua, M: UserDataMethods<'lua, Self>>(methods: &mut M) {
        add_common_methods::<Color, _>(methods);
        add_userdata_eq::<Color, _>(methods);

        for name in ["to_i", "to_integer"] {
            methods.add_method(name, |_, this, ()| Ok(this.value.to_integer()));
        }
        methods.add_method("equals", |_, this, other: Value| {
            let other = read_color(&other).ok().flatten();
            Ok(other.map_or(false, |other| this.value == other))
        });
        for name in ["eql", "equal"] {
            methods.add_method(name, |_, this, other: Value| {
                let other = strict_other::<Color>(&other);
                Ok(other.map_or(false, |other| this.value.strict_eq(&other)))
            });
        }

        methods.add_meta_function(MetaMethod::Add, |_, (lhs, rhs): (Value, Value)| {
            Ok(Hosted::new(color_operand(&lhs)? + color_operand(&rhs)?))
        });
        methods.add_meta_function(MetaMethod::Sub, |_, (lhs, rhs): (Value, Value)| {
            Ok(Hosted::new(color_operand(&lhs)? - color_operand(&rhs)?))
        });
        methods.add_meta_function(MetaMethod::Mul, |_, (lhs, rhs): (Value, Value)| {
            Ok(Hosted::new(color_operand(&lhs)? * color_operand(&rhs)?))
        });
    }
}

impl UserData for Hosted<VideoMode> {
    fn add_fields<'lua, F: UserDataFields<'lua, Self>>(fields: &mut F) {
        add_common_fields::<VideoMode, _>(fields);
        for name in ["width", "Width"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.width));
            fields.add_field_method_set(name, |_, this, value: Number| {
                let value = value.to_u32()?;
                this.set(|mode| mode.width = value)
            });
        }
        for name in ["height", "Height"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.height));
            fields.add_field_method_set(name, |_, this, value: Number| {
                let value = value.to_u32()?;
                this.set(|mode| mode.height = value)
            });
        }
        for name in ["bpp", "bits_per_pixel", "bits", "BitsPerPixel"] {
            fields.add_field_method_get(name, |_, this| Ok(this.value.bits_per_pixel));
            fields.add_field_method_set(name, |_, this, value: Number| {
                let value = value.to_u32()?;
                this.set(|mode| mode.bits_per_pixel = value)
            });
        }
    }

    fn add_methods<'lua, M: UserDataMethods<'lua, Self>>(methods: &mut M) {
        add_common_methods::<VideoMode, _>(methods);
        add_userdata_eq::<VideoMode, _>(methods);

        for name in ["is_valid", "IsValid"] {
            methods.add_method(name, |lua, this, ()| {
                Ok(script_context(lua)?.display.is_valid(&this.value))
            });
        }
        methods.add_method("compare", |_, this, other: VideoMode| {
            Ok(this.value.compare(&other))
        });
        for name in ["eql", "equal"] {
            methods.add_method(name, |_, this, other: Value| {
                let other = strict_other::<VideoMode>(&other);
                Ok(other.map_or(false, |other| this.value == other))
            });
        }
        methods.add_method("memory_usage", |_, _, ()| Ok(VideoMode::memory_usage()));

        methods.add_meta_function(MetaMethod::Lt, |_, (lhs, rhs): (VideoMode, VideoMode)| {
            Ok(lhs < rhs)
        });
        methods.add_meta_function(MetaMethod::Le, |_, (lhs, rhs): (VideoMode, VideoMode)| {
            Ok(lhs <= rhs)
        });
    }
}
