//! SFML value types for Lua scripts, rewritten in Rust.
//!
//! The crate models the small value classes a script uses to talk to a
//! multimedia layer: two and three component vectors, RGBA colors and
//! display video modes. Each type keeps the numbers a script gave it,
//! integers stay integers and floats stay floats, and converts to the
//! native `glam`/byte representation only at the boundary. The
//! [`scripting`] module exposes them to Lua under the `SFML` global.

pub mod color;
pub mod error;
pub mod number;
pub mod scripting;
pub mod vector;
pub mod video_mode;

pub use color::{Color, ColorInit, Rgba};
pub use error::BindingError;
pub use number::{Number, NumberKind};
pub use scripting::LuaScriptHost;
pub use vector::{Vector2, Vector2Init, Vector2Operand, Vector3, Vector3Init};
pub use video_mode::{DisplayProvider, StaticDisplay, VideoMode};
