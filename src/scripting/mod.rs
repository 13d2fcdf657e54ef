mod bindings;
mod convert;
mod manager;
mod userdata;

pub use manager::LuaScriptHost;
