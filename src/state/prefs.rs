//! Preference persistence

use crate::error::SpeakpadError;
use crate::speech::{PITCH_RANGE, RATE_RANGE, VOLUME_RANGE};
use crate::Result;
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Text shown on a first run before the user has typed anything
pub const DEFAULT_TEXT: &str = "Hello! Welcome to the speech panel.";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_THEME: &str = "dark";

/// Persistent panel settings
///
/// Everything the user last had on screen: the text buffer, language,
/// voice choice, sliders and theme, kept in an INI file so the next
/// session picks up where this one ended.
pub struct Prefs {
    /// INI storage
    ini: Ini,

    /// Preference file path (~/.speakpad.cfg)
    path: PathBuf,
}

impl Prefs {
    /// Load preferences from the home directory, creating defaults on
    /// a first run
    pub fn load() -> Result<Self> {
        Self::load_from(Self::prefs_path())
    }

    /// Load preferences from an explicit path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("Loading preferences from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| SpeakpadError::IniParse(format!("Failed to load preferences: {}", e)))?
        } else {
            info!("Preference file not found, creating defaults");
            let default = Self::default_prefs();
            default
                .write_to_file(&path)
                .map_err(|e| SpeakpadError::IniParse(format!("Failed to write preferences: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save preferences to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving preferences to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| SpeakpadError::Config(format!("Failed to save preferences: {}", e)))
    }

    /// Get preference file path (~/.speakpad.cfg)
    fn prefs_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".speakpad.cfg")
    }

    /// Expose the preference file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_prefs() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("text", DEFAULT_TEXT)
            .set("language", DEFAULT_LANGUAGE)
            .set("rate", "1")
            .set("pitch", "1")
            .set("volume", "1");

        ini.with_section(Some("ui")).set("theme", DEFAULT_THEME);

        ini
    }

    /// Get a string value
    fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value
    fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value
    fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Panel-specific getters and setters. Numeric values are clamped
    // on the way out, so a hand-edited file cannot push the sliders
    // outside what the hosts accept.

    /// The text buffer as of the last session
    pub fn text(&self) -> String {
        self.get_string("speech", "text", DEFAULT_TEXT)
    }

    pub fn set_text(&mut self, text: &str) {
        self.set("speech", "text", text);
    }

    /// Selected language tag
    pub fn language(&self) -> String {
        self.get_string("speech", "language", DEFAULT_LANGUAGE)
    }

    pub fn set_language(&mut self, language: &str) {
        self.set("speech", "language", language);
    }

    /// Position of the chosen voice within the language's voice list
    pub fn voice_index(&self) -> Option<usize> {
        self.get_int("speech", "voice", -1).try_into().ok()
    }

    pub fn set_voice_index(&mut self, index: Option<usize>) {
        match index {
            Some(i) => self.set("speech", "voice", &i.to_string()),
            None => {
                let _ = self.ini.delete_from(Some("speech"), "voice");
            }
        }
    }

    /// Speaking rate multiplier
    pub fn rate(&self) -> f32 {
        self.get_float("speech", "rate", 1.0)
            .clamp(RATE_RANGE.0, RATE_RANGE.1)
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.set("speech", "rate", &rate.to_string());
    }

    /// Pitch multiplier
    pub fn pitch(&self) -> f32 {
        self.get_float("speech", "pitch", 1.0)
            .clamp(PITCH_RANGE.0, PITCH_RANGE.1)
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.set("speech", "pitch", &pitch.to_string());
    }

    /// Volume, 0.0 to 1.0
    pub fn volume(&self) -> f32 {
        self.get_float("speech", "volume", 1.0)
            .clamp(VOLUME_RANGE.0, VOLUME_RANGE.1)
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.set("speech", "volume", &volume.to_string());
    }

    /// Panel theme name, "dark" or "light"
    pub fn theme(&self) -> String {
        self.get_string("ui", "theme", DEFAULT_THEME)
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.set("ui", "theme", theme);
    }
}
