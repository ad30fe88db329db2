//! Shell commands module
//!
//! - `ConfigCommand` - `target`, `info` and the startup hook
//! - `repl` - line dispatch and the interactive loop
//! - `render` - status tables

mod config_command;
mod render;
pub mod repl;

pub use config_command::*;
pub use render::render_info;
pub use repl::{Dispatch, ShellCommand};
