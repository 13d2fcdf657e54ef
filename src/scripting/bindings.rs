use std::sync::Arc;

use log::debug;
use mlua::{
    AppDataRef, Function, IntoLua, Lua, Result as LuaResult, Table, Value, Variadic,
};

use crate::color::Color;
use crate::vector::{Vector2, Vector3};
use crate::video_mode::{DisplayProvider, VideoMode};

use super::convert::{color_init, vector2_init, vector3_init, video_mode_init};
use super::userdata::Hosted;

pub(crate) struct ScriptContext {
    pub display: Arc<dyn DisplayProvider + Send + Sync>,
}

impl ScriptContext {
    pub fn new(display: Arc<dyn DisplayProvider + Send + Sync>) -> Self {
        Self { display }
    }
}

impl Clone for ScriptContext {
    fn clone(&self) -> Self {
        Self {
            display: Arc::clone(&self.display),
        }
    }
}

pub(super) fn script_context(lua: &Lua) -> LuaResult<AppDataRef<'_, ScriptContext>> {
    lua.app_data_ref::<ScriptContext>()
        .ok_or_else(|| mlua::Error::RuntimeError("SFML bindings are not registered".into()))
}

pub(crate) fn register_globals(lua: &Lua, context: &ScriptContext) -> LuaResult<()> {
    debug!("registering SFML bindings");
    lua.set_app_data(context.clone());
    register_print(lua)?;

    let sfml = lua.create_table()?;
    register_vectors(lua, &sfml)?;
    register_color(lua, &sfml)?;
    register_video_mode(lua, &sfml, context)?;
    lua.globals().set("SFML", sfml)?;
    Ok(())
}

fn register_print(lua: &Lua) -> LuaResult<()> {
    let print = lua.create_function(|lua, values: Variadic<Value>| {
        let tostring: Function = lua.globals().get("tostring")?;
        let mut out = Vec::with_capacity(values.len());
        for value in values.iter() {
            out.push(tostring.call::<_, String>(value.clone())?);
        }
        println!("[Lua] {}", out.join("\t"));
        Ok(())
    })?;
    lua.globals().set("print", print)?;
    Ok(())
}

/// Builds a class table with `new` that can also be called directly.
fn create_class<'lua, R>(
    lua: &'lua Lua,
    constructor: fn(&[Value]) -> LuaResult<R>,
) -> LuaResult<Table<'lua>>
where
    R: for<'a> IntoLua<'a> + 'static,
{
    let class = lua.create_table()?;
    class.set(
        "new",
        lua.create_function(move |_, args: Variadic<Value>| constructor(&args))?,
    )?;

    let metatable = lua.create_table()?;
    metatable.set(
        "__call",
        lua.create_function(move |_, (_class, args): (Value, Variadic<Value>)| {
            constructor(&args)
        })?,
    )?;
    class.set_metatable(Some(metatable));
    Ok(class)
}

fn new_vector2(args: &[Value]) -> LuaResult<Hosted<Vector2>> {
    Ok(Hosted::new(Vector2::from(vector2_init(args)?)))
}

fn new_vector3(args: &[Value]) -> LuaResult<Hosted<Vector3>> {
    Ok(Hosted::new(Vector3::from(vector3_init(args)?)))
}

fn new_color(args: &[Value]) -> LuaResult<Hosted<Color>> {
    Ok(Hosted::new(Color::from(color_init(args)?)))
}

fn new_video_mode(args: &[Value]) -> LuaResult<Hosted<VideoMode>> {
    Ok(Hosted::new(video_mode_init(args)?))
}

fn register_vectors(lua: &Lua, sfml: &Table) -> LuaResult<()> {
    let vector2 = create_class(lua, new_vector2)?;
    vector2.set("Zero", Hosted::frozen(Vector2::ZERO))?;
    sfml.set("Vector2", vector2)?;

    let vector3 = create_class(lua, new_vector3)?;
    vector3.set("Zero", Hosted::frozen(Vector3::ZERO))?;
    sfml.set("Vector3", vector3)?;
    Ok(())
}

fn register_color(lua: &Lua, sfml: &Table) -> LuaResult<()> {
    let color = create_class(lua, new_color)?;
    for (name, value) in Color::NAMED {
        color.set(name, Hosted::frozen(value))?;
    }
    sfml.set("Color", color)?;
    Ok(())
}

fn register_video_mode(lua: &Lua, sfml: &Table, context: &ScriptContext) -> LuaResult<()> {
    let video_mode = create_class(lua, new_video_mode)?;

    let display = Arc::clone(&context.display);
    let desktop_mode = lua.create_function(move |_, ()| Ok(Hosted::new(display.desktop_mode())))?;
    video_mode.set("desktop_mode", desktop_mode.clone())?;
    video_mode.set("GetDesktopMode", desktop_mode)?;

    let display = Arc::clone(&context.display);
    let fullscreen_modes = lua.create_function(move |_, ()| {
        Ok(display
            .fullscreen_modes()
            .into_iter()
            .map(Hosted::new)
            .collect::<Vec<_>>())
    })?;
    video_mode.set("fullscreen_modes", fullscreen_modes.clone())?;
    video_mode.set("GetFullscreenModes", fullscreen_modes)?;

    sfml.set("VideoMode", video_mode)?;
    Ok(())
}
