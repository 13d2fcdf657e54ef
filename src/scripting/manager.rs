use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use mlua::{FromLuaMulti, Lua};

use crate::video_mode::DisplayProvider;

use super::bindings::{register_globals, ScriptContext};

/// A Lua state with the SFML value types registered under the `SFML` global.
pub struct LuaScriptHost {
    lua: Lua,
}

impl LuaScriptHost {
    pub fn new(display: Arc<dyn DisplayProvider + Send + Sync>) -> Result<Self> {
        let lua = Lua::new();
        let context = ScriptContext::new(display);
        register_globals(&lua, &context).context("failed to register SFML bindings")?;
        Ok(Self { lua })
    }

    /// Runs a script file in this host's state.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        self.run_source(&path.display().to_string(), &source)
    }

    pub fn run_source(&self, name: &str, source: &str) -> Result<()> {
        info!("running Lua script {name}");
        self.lua
            .load(source)
            .set_name(name)
            .exec()
            .map_err(anyhow::Error::from)
            .context("Lua runtime error")
    }

    /// Evaluates an expression or chunk and converts its results.
    pub fn eval<'lua, R: FromLuaMulti<'lua>>(&'lua self, source: &str) -> Result<R> {
        self.lua
            .load(source)
            .eval()
            .map_err(anyhow::Error::from)
            .context("Lua evaluation error")
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video_mode::{StaticDisplay, VideoMode};
    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use std::io::Write;

    static DISPLAY: Lazy<StaticDisplay> = Lazy::new(|| {
        StaticDisplay::new(
            VideoMode::new(1024, 768, 32),
            vec![VideoMode::new(1024, 768, 32), VideoMode::new(640, 480, 16)],
        )
    });

    fn host() -> LuaScriptHost {
        LuaScriptHost::new(Arc::new(DISPLAY.clone())).unwrap()
    }

    #[test]
    fn script_file_sees_bindings() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(
            b"position = SFML.Vector2(3, 4) + {1, 1}\nmodes = #SFML.VideoMode.fullscreen_modes()",
        )
        .unwrap();
        let host = host();
        host.run_file(tmp.path()).unwrap();
        let (text, modes): (String, i64) = host.eval("return tostring(position), modes").unwrap();
        assert_eq!(text, "Vector2(4, 5)");
        assert_eq!(modes, 2);
    }

    #[test]
    fn runtime_errors_carry_context() {
        let host = host();
        let err = host
            .run_source("broken.lua", "SFML.Color.new(1, 2)")
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Lua runtime error"), "{message}");
        assert!(message.contains("wrong number of arguments"), "{message}");
    }

    #[test]
    fn missing_script_is_reported() {
        let host = host();
        let err = host.run_file("/nonexistent/script.lua").unwrap_err();
        assert!(err.to_string().contains("failed to read script"));
    }

    #[test]
    fn native_values_flow_back_out() {
        let host = host();
        let mode: VideoMode = host.eval("return SFML.VideoMode.desktop_mode()").unwrap();
        assert_eq!(mode, VideoMode::new(1024, 768, 32));
        let color: crate::color::Color = host.eval("return SFML.Color.Cyan").unwrap();
        assert_eq!(color.to_integer(), 0x00FF_FFFF);
    }
}
