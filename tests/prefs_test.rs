//! Preference persistence tests
//!
//! Tests that panel preferences are created with sensible defaults,
//! survive a save and reload, and sanitize hand-edited values

use speakpad::state::prefs::Prefs;
use tempfile::tempdir;

#[test]
fn test_prefs_created_on_first_run() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("speakpad.cfg");

    let prefs = Prefs::load_from(path.clone()).expect("Failed to load prefs");

    // The file exists now so the next session can find it
    assert!(path.exists());

    // Defaults
    assert!(!prefs.text().is_empty());
    assert_eq!(prefs.language(), "en");
    assert_eq!(prefs.voice_index(), None);
    assert_eq!(prefs.rate(), 1.0);
    assert_eq!(prefs.pitch(), 1.0);
    assert_eq!(prefs.volume(), 1.0);
    assert_eq!(prefs.theme(), "dark");
}

#[test]
fn test_prefs_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("speakpad.cfg");

    let mut prefs = Prefs::load_from(path.clone()).expect("Failed to load prefs");
    prefs.set_text("One line.\nAnd a second line.");
    prefs.set_language("fr");
    prefs.set_voice_index(Some(2));
    prefs.set_rate(1.5);
    prefs.set_pitch(0.75);
    prefs.set_volume(0.5);
    prefs.set_theme("light");
    prefs.save().expect("Failed to save prefs");

    let reloaded = Prefs::load_from(path).expect("Failed to reload prefs");

    // Newlines in the text buffer must survive the INI encoding
    assert_eq!(reloaded.text(), "One line.\nAnd a second line.");
    assert_eq!(reloaded.language(), "fr");
    assert_eq!(reloaded.voice_index(), Some(2));
    assert_eq!(reloaded.rate(), 1.5);
    assert_eq!(reloaded.pitch(), 0.75);
    assert_eq!(reloaded.volume(), 0.5);
    assert_eq!(reloaded.theme(), "light");
}

#[test]
fn test_prefs_clamp_hand_edited_values() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("speakpad.cfg");

    std::fs::write(
        &path,
        "[speech]\ntext=hi\nrate=99\npitch=-3\nvolume=2\nvoice=borked\n",
    )
    .expect("Failed to write prefs file");

    let prefs = Prefs::load_from(path).expect("Failed to load prefs");

    // Out-of-range sliders come back clamped to what hosts accept
    assert_eq!(prefs.rate(), 10.0);
    assert_eq!(prefs.pitch(), 0.0);
    assert_eq!(prefs.volume(), 1.0);

    // A voice index that is not a number reads as no selection
    assert_eq!(prefs.voice_index(), None);
}

#[test]
fn test_prefs_unparseable_numbers_fall_back() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("speakpad.cfg");

    std::fs::write(&path, "[speech]\nrate=fast\npitch=\n").expect("Failed to write prefs file");

    let prefs = Prefs::load_from(path).expect("Failed to load prefs");
    assert_eq!(prefs.rate(), 1.0);
    assert_eq!(prefs.pitch(), 1.0);
}

#[test]
fn test_voice_index_cleared_on_unset() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("speakpad.cfg");

    let mut prefs = Prefs::load_from(path.clone()).expect("Failed to load prefs");
    prefs.set_voice_index(Some(1));
    assert_eq!(prefs.voice_index(), Some(1));

    prefs.set_voice_index(None);
    assert_eq!(prefs.voice_index(), None);
    prefs.save().expect("Failed to save prefs");

    let reloaded = Prefs::load_from(path).expect("Failed to reload prefs");
    assert_eq!(reloaded.voice_index(), None);
}
