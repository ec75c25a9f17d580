//! Keyboard dispatch and the modal handler stack
//!
//! The input system uses a stack-based handler architecture where
//! handlers can be pushed and popped to create modal interfaces
//! (voice menu, settings menu, text prompt, help screen).

pub mod default_handler;
pub mod handler;
pub mod help_handler;
pub mod keymap;
pub mod prompt_handler;
pub mod settings_handler;
pub mod voice_handler;

pub use default_handler::DefaultHandler;
pub use handler::{HandlerAction, HandlerStack, KeyHandler};
pub use keymap::{create_default_keymap, KeyAction};
pub use prompt_handler::PromptHandler;
