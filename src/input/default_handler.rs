//! Default key handler for the panel
//!
//! Processes the top-level bindings when no menu or prompt is open.
//! Unrecognized keys are ignored; there is nowhere to pass them on to.

use super::help_handler::HelpHandler;
use super::settings_handler::SettingsHandler;
use super::voice_handler::VoiceMenuHandler;
use super::{HandlerAction, KeyAction, KeyHandler};
use crate::state::State;
use crate::Result;
use std::collections::HashMap;
use log::{debug, trace};

/// Handles keys while the panel itself has focus
pub struct DefaultHandler {
    /// Byte sequence to action table
    keymap: HashMap<Vec<u8>, KeyAction>,
}

impl DefaultHandler {
    pub fn new(keymap: HashMap<Vec<u8>, KeyAction>) -> Self {
        debug!("creating default key handler with {} bindings", keymap.len());
        Self { keymap }
    }

    /// Process a key with the panel's bindings
    pub fn process_key(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        let action = match self.keymap.get(key).cloned() {
            Some(action) => action,
            None => {
                trace!("unbound key: {:?}", key);
                return Ok(HandlerAction::Handled);
            }
        };

        debug!("key action: {:?}", action);
        match action {
            KeyAction::Play => state.play()?,
            KeyAction::PauseToggle => state.toggle_pause()?,
            KeyAction::Stop => state.stop()?,

            KeyAction::EditText => state.open_text_editor()?,
            KeyAction::PasteClipboard => state.paste_clipboard()?,
            KeyAction::Preset(index) => state.load_preset(index)?,

            KeyAction::CycleLanguage => state.cycle_language()?,
            KeyAction::VoiceMenu => {
                let handler = VoiceMenuHandler::new();
                handler.redraw(state)?;
                state.handlers.push(Box::new(handler));
            }

            KeyAction::SettingsMenu => {
                let handler = SettingsHandler::new();
                handler.redraw(state)?;
                state.handlers.push(Box::new(handler));
            }
            KeyAction::ToggleTheme => state.toggle_theme()?,
            KeyAction::Status => state.announce_settings()?,
            KeyAction::Help => {
                let handler = HelpHandler;
                handler.redraw(state)?;
                state.handlers.push(Box::new(handler));
            }

            KeyAction::Suspend => state.suspend_requested = true,
            KeyAction::Quit => state.quit(),
        }

        Ok(HandlerAction::Handled)
    }
}
