//! Voice menu handler
//!
//! Modal list of the voices matching the current language. Digits pick
//! a voice from the visible page, n and p move between pages when the
//! host offers more than ten.

use super::{HandlerAction, KeyHandler};
use crate::state::State;
use crate::Result;
use std::io::Write;

const PAGE_SIZE: usize = 10;

pub struct VoiceMenuHandler {
    page: usize,
}

impl VoiceMenuHandler {
    pub fn new() -> Self {
        Self { page: 0 }
    }

    fn page_count(state: &State) -> usize {
        let len = state.voices.voices().len();
        ((len + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
    }
}

impl Default for VoiceMenuHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHandler for VoiceMenuHandler {
    fn process(&mut self, key: &[u8], state: &mut State) -> Result<HandlerAction> {
        match key {
            b"\x1b" | b"q" | b"\r" | b"\n" => Ok(HandlerAction::Remove),

            b"n" => {
                self.page = (self.page + 1) % Self::page_count(state);
                Ok(HandlerAction::Handled)
            }
            b"p" => {
                let pages = Self::page_count(state);
                self.page = (self.page + pages - 1) % pages;
                Ok(HandlerAction::Handled)
            }

            [digit @ b'0'..=b'9'] => {
                // Keys 1-9 pick rows one through nine, 0 picks the tenth
                let offset = match digit {
                    b'0' => 9,
                    d => (d - b'1') as usize,
                };
                state.select_voice(self.page * PAGE_SIZE + offset)?;
                Ok(HandlerAction::Remove)
            }

            _ => Ok(HandlerAction::Handled),
        }
    }

    fn redraw(&self, state: &State) -> Result<()> {
        let voices = state.voices.voices();
        let selected = state.voices.selected_index();
        let pages = Self::page_count(state);

        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        write!(out, "\x1b[2J\x1b[H")?;
        write!(
            out,
            "Voices for '{}'  (page {} of {})\r\n\r\n",
            state.prefs.language(),
            self.page + 1,
            pages
        )?;

        if voices.is_empty() {
            write!(out, "  No voices available for selected language\r\n")?;
        } else {
            let start = self.page * PAGE_SIZE;
            for (row, voice) in voices.iter().skip(start).take(PAGE_SIZE).enumerate() {
                let index = start + row;
                let key = if row == 9 { 0 } else { row + 1 };
                let marker = if selected == Some(index) { ">" } else { " " };
                let default = if voice.default { "  (default)" } else { "" };
                write!(
                    out,
                    " {}{}  {} [{}]{}\r\n",
                    marker, key, voice.name, voice.language, default
                )?;
            }
        }

        write!(out, "\r\ndigits select, n/p page, Esc to go back\r\n")?;
        out.flush()?;
        Ok(())
    }
}
