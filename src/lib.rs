//! Speakpad - console text-to-speech panel
//!
//! An interactive terminal panel for driving the platform's speech
//! synthesis: type or pick text, choose a language and voice, adjust
//! rate/pitch/volume, and control playback from the keyboard.

pub mod clipboard;
pub mod error;
pub mod input;
pub mod panel;
pub mod platform;
pub mod playback;
pub mod presets;
pub mod speech;
pub mod state;
pub mod term;
pub mod voices;

pub use error::{Result, SpeakpadError};

/// Crate version, reported at startup in debug mode
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "speakpad";

/// Maximum length of the text buffer, in characters.
///
/// The editor refuses input past this point and the request builder
/// never sees longer text.
pub const MAX_TEXT_LEN: usize = 5000;
