//! Panel rendering
//!
//! Draws the whole control panel with plain ANSI escapes: text preview
//! with a character counter, language and voice lines, the sliders,
//! playback state and the status line where announcements land. The
//! terminal is in raw mode, so every line ends in \r\n and the screen
//! is redrawn after each action rather than patched.

use crate::playback::PlaybackState;
use crate::{Result, MAX_TEXT_LEN, VERSION};
use std::io::Write;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const CLEAR: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn from_name(name: &str) -> Theme {
        match name {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    fn accent(&self) -> &'static str {
        match self {
            Theme::Dark => "\x1b[96m",
            Theme::Light => "\x1b[34m",
        }
    }

    fn dim(&self) -> &'static str {
        match self {
            Theme::Dark => "\x1b[90m",
            Theme::Light => "\x1b[37m",
        }
    }

    fn warn(&self) -> &'static str {
        "\x1b[33m"
    }

    fn critical(&self) -> &'static str {
        "\x1b[31m"
    }
}

/// How full the text buffer is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    /// At 70% of the limit
    Warn,
    /// At 90% of the limit
    Critical,
}

/// Classify a character count against the buffer limit
pub fn counter_level(len: usize, max: usize) -> CounterLevel {
    if len * 10 >= max * 9 {
        CounterLevel::Critical
    } else if len * 10 >= max * 7 {
        CounterLevel::Warn
    } else {
        CounterLevel::Normal
    }
}

/// Everything the panel shows, borrowed from the app state for one draw
pub struct PanelView<'a> {
    pub text: &'a str,
    pub language: &'a str,
    /// Resolved voice name, None while loading or when nothing matches
    pub voice_name: Option<&'a str>,
    pub voice_count: usize,
    pub voices_loaded: bool,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub playback: PlaybackState,
    /// Active host name, None when speech is unavailable
    pub host_name: Option<&'a str>,
}

pub struct Panel {
    theme: Theme,
    width: u16,
    status: String,
}

impl Panel {
    pub fn new(theme: Theme, width: u16) -> Self {
        Panel {
            theme,
            width,
            status: String::new(),
        }
    }

    /// Flip between dark and light, returning the new theme
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Terminal width changed
    pub fn set_width(&mut self, width: u16) {
        self.width = width.max(20);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Put a message on the status line for the next draw
    pub fn announce(&mut self, message: &str) {
        self.status = message.to_string();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Redraw the whole panel
    pub fn draw(&self, view: &PanelView) -> Result<()> {
        let theme = self.theme;
        let width = self.width as usize;
        let divider = "-".repeat(width.min(64));

        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        write!(out, "{}", CLEAR)?;
        write!(
            out,
            "{}{}speakpad {}{}  {}[{}]{}\r\n",
            BOLD,
            theme.accent(),
            VERSION,
            RESET,
            theme.dim(),
            theme.name(),
            RESET
        )?;
        write!(out, "{}{}{}\r\n", theme.dim(), divider, RESET)?;

        let preview = truncate_display(&view.text.replace('\n', " "), width.saturating_sub(8));
        write!(out, "Text: {}\r\n", preview)?;

        let count = view.text.chars().count();
        let level = counter_level(count, MAX_TEXT_LEN);
        let color = match level {
            CounterLevel::Normal => theme.dim(),
            CounterLevel::Warn => theme.warn(),
            CounterLevel::Critical => theme.critical(),
        };
        write!(
            out,
            "      {}{}/{} characters{}\r\n",
            color, count, MAX_TEXT_LEN, RESET
        )?;

        let voice_line = if view.host_name.is_none() {
            "(speech unavailable)".to_string()
        } else if !view.voices_loaded {
            "loading...".to_string()
        } else if view.voice_count == 0 {
            "none for this language".to_string()
        } else {
            format!(
                "{} ({} available)",
                view.voice_name.unwrap_or("host default"),
                view.voice_count
            )
        };
        write!(
            out,
            "Language: {}{}{}   Voice: {}\r\n",
            theme.accent(),
            view.language,
            RESET,
            voice_line
        )?;

        write!(
            out,
            "Rate: {:.1}   Pitch: {:.1}   Volume: {:.1}\r\n",
            view.rate, view.pitch, view.volume
        )?;

        let state_name = match view.playback {
            PlaybackState::Idle => "Idle",
            PlaybackState::Speaking => "Speaking",
            PlaybackState::Paused => "Paused",
        };
        let host_line = match view.host_name {
            Some(name) => format!("Host: {}", name),
            None => "Host: unavailable".to_string(),
        };
        write!(
            out,
            "State: {}{}{}   {}{}{}\r\n",
            theme.accent(),
            state_name,
            RESET,
            theme.dim(),
            host_line,
            RESET
        )?;

        write!(out, "{}{}{}\r\n", theme.dim(), divider, RESET)?;
        write!(out, "Status: {}\r\n", self.status)?;
        write!(
            out,
            "{}Enter=play  Space=pause  s=stop  t=edit  v=voices  h=help  q=quit{}\r\n",
            theme.dim(),
            RESET
        )?;

        out.flush()?;
        Ok(())
    }

    /// Full-screen key reference, shown until the next keypress
    pub fn draw_help(&self) -> Result<()> {
        let theme = self.theme;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        write!(out, "{}", CLEAR)?;
        write!(out, "{}{}speakpad keys{}\r\n\r\n", BOLD, theme.accent(), RESET)?;

        let entries: &[(&str, &str)] = &[
            ("Enter", "speak the text, or resume when paused"),
            ("Space", "pause / resume"),
            ("s or Esc", "stop"),
            ("t", "edit the text"),
            ("1-4", "load a preset"),
            ("l", "cycle language"),
            ("v", "pick a voice"),
            ("o", "rate, pitch and volume"),
            ("y", "paste from clipboard"),
            ("d", "toggle dark and light theme"),
            ("i", "read out the current settings"),
            ("h or ?", "this screen"),
            ("q or Ctrl+C", "quit"),
        ];
        for (key, what) in entries {
            write!(out, "  {}{:<12}{}{}\r\n", theme.accent(), key, RESET, what)?;
        }

        write!(out, "\r\n{}press any key to go back{}\r\n", theme.dim(), RESET)?;
        out.flush()?;
        Ok(())
    }
}

/// Cut a string to a display width, appending "..." when shortened
///
/// Width is measured in terminal columns, so CJK and other wide
/// characters count double.
pub fn truncate_display(text: &str, max_cols: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_cols {
        return text.to_string();
    }

    let budget = max_cols.saturating_sub(3);
    let mut used = 0;
    let mut result = String::new();
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(ch);
    }
    result.push_str("...");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_levels_switch_at_seventy_and_ninety_percent() {
        assert_eq!(counter_level(0, 5000), CounterLevel::Normal);
        assert_eq!(counter_level(3499, 5000), CounterLevel::Normal);
        assert_eq!(counter_level(3500, 5000), CounterLevel::Warn);
        assert_eq!(counter_level(4499, 5000), CounterLevel::Warn);
        assert_eq!(counter_level(4500, 5000), CounterLevel::Critical);
        assert_eq!(counter_level(5000, 5000), CounterLevel::Critical);
    }

    #[test]
    fn short_text_is_left_alone() {
        assert_eq!(truncate_display("hello", 10), "hello");
        assert_eq!(truncate_display("hello", 5), "hello");
    }

    #[test]
    fn long_text_is_cut_with_an_ellipsis() {
        assert_eq!(truncate_display("hello world", 8), "hello...");
    }

    #[test]
    fn wide_characters_count_double() {
        // Each ideograph takes two columns
        assert_eq!(truncate_display("日本語テスト", 12), "日本語テスト");
        assert_eq!(truncate_display("日本語テスト", 9), "日本語...");
    }

    #[test]
    fn theme_names_round_trip() {
        assert_eq!(Theme::from_name("light"), Theme::Light);
        assert_eq!(Theme::from_name("dark"), Theme::Dark);
        assert_eq!(Theme::from_name("plaid"), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().name(), "dark");
    }

    #[test]
    fn announcements_land_on_the_status_line() {
        let mut panel = Panel::new(Theme::Dark, 80);
        assert_eq!(panel.status(), "");
        panel.announce("Speech started");
        assert_eq!(panel.status(), "Speech started");
    }
}
