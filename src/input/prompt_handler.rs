//! Prompt handler for collecting a line of input
//!
//! Used for the text editor and for numeric entry in the settings
//! menu. Collects keystrokes until Enter accepts or Escape cancels,
//! then hands the text to a callback.

use super::{HandlerAction, KeyHandler};
use crate::panel::truncate_display;
use crate::state::State;
use crate::{Result, MAX_TEXT_LEN};
use log::debug;
use std::io::Write;

/// Runs with the submitted line when the prompt is accepted
type OnAcceptFn = Box<dyn FnOnce(String, &mut State) -> Result<()> + Send>;

/// Handler that collects text until Enter is pressed
pub struct PromptHandler {
    /// Prompt shown before the input
    label: &'static str,

    /// Text typed so far
    buffer: String,

    /// Show a live character counter next to the label
    show_count: bool,

    /// Consumed on Enter
    on_accept: Option<OnAcceptFn>,
}

impl PromptHandler {
    /// Create a prompt, prefilled with `initial`
    ///
    /// The callback is invoked with the collected text when the user
    /// presses Enter. Escape discards the buffer and the callback.
    pub fn new(label: &'static str, initial: String, on_accept: OnAcceptFn) -> Self {
        Self {
            label,
            buffer: initial,
            show_count: false,
            on_accept: Some(on_accept),
        }
    }

    /// The text editor: prefilled with the current buffer, with a live
    /// character counter against the buffer limit
    pub fn text_editor(initial: String) -> Self {
        Self {
            label: "Text",
            buffer: initial,
            show_count: true,
            on_accept: Some(Box::new(|text, state| state.set_text(text))),
        }
    }
}

impl KeyHandler for PromptHandler {
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        match key {
            // Enter accepts and invokes the callback
            b"\r" | b"\n" => {
                debug!(
                    "prompt '{}' accepted with {} chars",
                    self.label,
                    self.buffer.chars().count()
                );
                if let Some(callback) = self.on_accept.take() {
                    callback(std::mem::take(&mut self.buffer), state)?;
                }
                Ok(HandlerAction::Remove)
            }

            // Escape cancels, leaving whatever the prompt was editing alone
            b"\x1b" => {
                debug!("prompt '{}' cancelled", self.label);
                state.announce("Cancelled");
                Ok(HandlerAction::Remove)
            }

            // Backspace removes the last character
            b"\x08" | b"\x7f" => {
                self.buffer.pop();
                Ok(HandlerAction::Handled)
            }

            // Anything printable goes into the buffer, up to the text
            // limit. Escape sequences and control bytes are dropped.
            _ => {
                if let Ok(s) = std::str::from_utf8(key) {
                    if s.chars().all(|c| !c.is_control())
                        && self.buffer.chars().count() + s.chars().count() <= MAX_TEXT_LEN
                    {
                        self.buffer.push_str(s);
                    }
                }
                Ok(HandlerAction::Handled)
            }
        }
    }

    fn redraw(&self, state: &State) -> Result<()> {
        let prefix = if self.show_count {
            format!(
                "{} [{}/{}]",
                self.label,
                self.buffer.chars().count(),
                MAX_TEXT_LEN
            )
        } else {
            self.label.to_string()
        };

        // Rewrite the current line in place, raw mode style
        let width = state.panel.width() as usize;
        let room = width.saturating_sub(prefix.len() + 4);
        let shown = truncate_display(&self.buffer.replace('\n', " "), room);

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        write!(out, "\r\x1b[K{}: {}", prefix, shown)?;
        out.flush()?;
        Ok(())
    }
}
