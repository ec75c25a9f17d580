//! Text presets
//!
//! The number keys load canned sentences into the text buffer, handy
//! for trying out voices without typing. Four samples ship built in,
//! one per stock language; users can replace them by dropping a JSON
//! array of presets at ~/.speakpad/presets.json.

use crate::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Shown when the preset is loaded
    pub name: String,
    pub text: String,
    /// Language the text is written in, switching to the preset also
    /// switches the panel language when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Built-in samples used when no preset file exists
pub static BUILTIN_PRESETS: Lazy<Vec<Preset>> = Lazy::new(|| {
    vec![
        Preset {
            name: "English sample".to_string(),
            text: "Hello! Welcome to the speech panel. Adjust the rate, pitch and volume \
                   until it sounds right to you."
                .to_string(),
            language: Some("en".to_string()),
        },
        Preset {
            name: "Spanish sample".to_string(),
            text: "¡Hola! Bienvenido al panel de voz. Ajusta la velocidad, el tono y el \
                   volumen a tu gusto."
                .to_string(),
            language: Some("es".to_string()),
        },
        Preset {
            name: "French sample".to_string(),
            text: "Bonjour ! Bienvenue sur le panneau vocal. Réglez la vitesse, la hauteur \
                   et le volume selon vos préférences."
                .to_string(),
            language: Some("fr".to_string()),
        },
        Preset {
            name: "German sample".to_string(),
            text: "Hallo! Willkommen im Sprachpanel. Passen Sie Geschwindigkeit, Tonhöhe \
                   und Lautstärke nach Belieben an."
                .to_string(),
            language: Some("de".to_string()),
        },
    ]
});

/// Where user presets live
pub fn presets_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".speakpad").join("presets.json"))
}

/// Load user presets, falling back to the built-ins
///
/// A missing file is normal. A broken or empty one is logged and
/// ignored so a stray edit never leaves the number keys dead.
pub fn load_presets() -> Vec<Preset> {
    let path = match presets_path() {
        Some(path) if path.exists() => path,
        _ => {
            debug!("no preset file, using built-ins");
            return BUILTIN_PRESETS.clone();
        }
    };

    match load_from(&path) {
        Ok(presets) if !presets.is_empty() => {
            debug!("loaded {} presets from {}", presets.len(), path.display());
            presets
        }
        Ok(_) => {
            warn!("{} holds no presets, using built-ins", path.display());
            BUILTIN_PRESETS.clone()
        }
        Err(e) => {
            warn!("could not read {}: {}", path.display(), e);
            BUILTIN_PRESETS.clone()
        }
    }
}

/// Read a preset file
pub fn load_from(path: &Path) -> Result<Vec<Preset>> {
    let raw = std::fs::read_to_string(path)?;
    let presets: Vec<Preset> = serde_json::from_str(&raw)?;
    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_the_stock_languages() {
        let languages: Vec<&str> = BUILTIN_PRESETS
            .iter()
            .filter_map(|p| p.language.as_deref())
            .collect();
        assert_eq!(languages, vec!["en", "es", "fr", "de"]);
        assert!(BUILTIN_PRESETS.iter().all(|p| !p.text.is_empty()));
    }

    #[test]
    fn reads_a_preset_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Greeting", "text": "Good morning"},
                {"name": "Weather", "text": "Es regnet", "language": "de"}
            ]"#,
        )
        .unwrap();

        let presets = load_from(&path).unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].name, "Greeting");
        assert_eq!(presets[0].language, None);
        assert_eq!(presets[1].language.as_deref(), Some("de"));
    }

    #[test]
    fn rejects_a_malformed_preset_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_from(&path).is_err());
    }

    #[test]
    fn preset_round_trips_through_json() {
        let preset = Preset {
            name: "Test".to_string(),
            text: "Some text".to_string(),
            language: None,
        };
        let json = serde_json::to_string(&preset).unwrap();
        // No language key when unset, so hand-written files stay terse
        assert!(!json.contains("language"));
        let back: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset);
    }
}
