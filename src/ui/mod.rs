//! Terminal user interface.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop over key presses and write outcomes
//! - `commands` - Command grammar
//! - `input` - Key and command handling against the session
//! - `events` - Write outcome messages
//! - `render` - Profile card, link list and command line widgets

mod commands;
mod events;
mod input;
mod loop_runner;
mod render;

pub use commands::{parse_command, Command, CommandError};
pub use events::describe_sync_event;
pub use input::{handle_key, handle_line, InputState, Reply};
pub use loop_runner::{run, Action};
pub use render::{color_label, render, token_color};
