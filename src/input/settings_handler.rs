//! Settings menu handler
//!
//! Modal handler for the speech settings menu (o). Rate, pitch and
//! volume each open a numeric prompt; the value is validated, saved
//! and used for the next utterance.

use super::prompt_handler::PromptHandler;
use super::{HandlerAction, KeyHandler};
use crate::speech::{PITCH_RANGE, RATE_RANGE, VOLUME_RANGE};
use crate::state::State;
use crate::Result;
use log::debug;
use std::io::Write;

/// Settings menu key handler
///
/// - r: set speaking rate
/// - p: set pitch
/// - v: set playback volume
/// - Enter or Escape: back to the panel
pub struct SettingsHandler;

impl Default for SettingsHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsHandler {
    pub fn new() -> Self {
        Self
    }

    /// Set speaking rate from user input
    fn apply_rate(input: String, state: &mut State) -> Result<()> {
        match input.trim().parse::<f32>() {
            Ok(rate) if (RATE_RANGE.0..=RATE_RANGE.1).contains(&rate) => state.set_rate(rate),
            _ => {
                debug!("invalid rate value: {}", input);
                state.announce("invalid");
                Ok(())
            }
        }
    }

    /// Set pitch from user input
    fn apply_pitch(input: String, state: &mut State) -> Result<()> {
        match input.trim().parse::<f32>() {
            Ok(pitch) if (PITCH_RANGE.0..=PITCH_RANGE.1).contains(&pitch) => {
                state.set_pitch(pitch)
            }
            _ => {
                debug!("invalid pitch value: {}", input);
                state.announce("invalid");
                Ok(())
            }
        }
    }

    /// Set volume from user input
    fn apply_volume(input: String, state: &mut State) -> Result<()> {
        match input.trim().parse::<f32>() {
            Ok(volume) if (VOLUME_RANGE.0..=VOLUME_RANGE.1).contains(&volume) => {
                state.set_volume(volume)
            }
            _ => {
                debug!("invalid volume value: {}", input);
                state.announce("invalid");
                Ok(())
            }
        }
    }
}

impl KeyHandler for SettingsHandler {
    fn process(&mut self, key: &[u8], _state: &mut State) -> Result<HandlerAction> {
        match key {
            b"r" => {
                debug!("settings: rate");
                Ok(HandlerAction::Push(Box::new(PromptHandler::new(
                    "Rate",
                    String::new(),
                    Box::new(Self::apply_rate),
                ))))
            }

            b"p" => {
                debug!("settings: pitch");
                Ok(HandlerAction::Push(Box::new(PromptHandler::new(
                    "Pitch",
                    String::new(),
                    Box::new(Self::apply_pitch),
                ))))
            }

            b"v" => {
                debug!("settings: volume");
                Ok(HandlerAction::Push(Box::new(PromptHandler::new(
                    "Volume",
                    String::new(),
                    Box::new(Self::apply_volume),
                ))))
            }

            // Enter or Escape leaves the menu
            b"\r" | b"\n" | b"\x1b" | b"q" => {
                debug!("settings: exit");
                Ok(HandlerAction::Remove)
            }

            _ => {
                debug!("settings: unknown key");
                Ok(HandlerAction::Handled)
            }
        }
    }

    fn redraw(&self, state: &State) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        write!(out, "\x1b[2J\x1b[H")?;
        write!(out, "Speech settings\r\n\r\n")?;
        write!(
            out,
            "  r  rate    {:.1}  ({} to {})\r\n",
            state.prefs.rate(),
            RATE_RANGE.0,
            RATE_RANGE.1
        )?;
        write!(
            out,
            "  p  pitch   {:.1}  ({} to {})\r\n",
            state.prefs.pitch(),
            PITCH_RANGE.0,
            PITCH_RANGE.1
        )?;
        write!(
            out,
            "  v  volume  {:.1}  ({} to {})\r\n",
            state.prefs.volume(),
            VOLUME_RANGE.0,
            VOLUME_RANGE.1
        )?;
        write!(out, "\r\nEnter or Esc to go back\r\n")?;
        out.flush()?;
        Ok(())
    }
}
