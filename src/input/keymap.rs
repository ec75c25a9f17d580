//! Default key bindings for the panel

use std::collections::HashMap;

/// Raw bytes of one keystroke
pub type KeySequence = Vec<u8>;

/// Panel operation a key can be bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // Playback
    Play,
    PauseToggle,
    Stop,

    // Text
    EditText,
    PasteClipboard,
    /// Load the numbered preset (zero-based)
    Preset(usize),

    // Voice and language
    CycleLanguage,
    VoiceMenu,

    // Panel
    SettingsMenu,
    ToggleTheme,
    Status,
    Help,

    // Session
    Suspend,
    Quit,
}

/// Build the stock binding table
pub fn create_default_keymap() -> HashMap<KeySequence, KeyAction> {
    let mut map = HashMap::new();

    // Playback controls
    map.insert(b"\r".to_vec(), KeyAction::Play);
    map.insert(b"\n".to_vec(), KeyAction::Play);
    map.insert(b" ".to_vec(), KeyAction::PauseToggle);
    map.insert(b"\x00".to_vec(), KeyAction::PauseToggle); // ctrl+space
    map.insert(b"s".to_vec(), KeyAction::Stop);
    map.insert(b"\x1b".to_vec(), KeyAction::Stop); // lone escape

    // Text entry
    map.insert(b"t".to_vec(), KeyAction::EditText);
    map.insert(b"y".to_vec(), KeyAction::PasteClipboard);
    map.insert(b"1".to_vec(), KeyAction::Preset(0));
    map.insert(b"2".to_vec(), KeyAction::Preset(1));
    map.insert(b"3".to_vec(), KeyAction::Preset(2));
    map.insert(b"4".to_vec(), KeyAction::Preset(3));

    // Voice and language
    map.insert(b"l".to_vec(), KeyAction::CycleLanguage);
    map.insert(b"v".to_vec(), KeyAction::VoiceMenu);

    // Panel
    map.insert(b"o".to_vec(), KeyAction::SettingsMenu);
    map.insert(b"d".to_vec(), KeyAction::ToggleTheme);
    map.insert(b"i".to_vec(), KeyAction::Status);
    map.insert(b"h".to_vec(), KeyAction::Help);
    map.insert(b"?".to_vec(), KeyAction::Help);

    // Session. Raw mode turns ctrl+z into a plain byte, so job
    // control suspends go through the keymap as well.
    map.insert(b"\x1a".to_vec(), KeyAction::Suspend);
    map.insert(b"q".to_vec(), KeyAction::Quit);
    map.insert(b"\x03".to_vec(), KeyAction::Quit); // ctrl+c

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_enter_variants_play() {
        let map = create_default_keymap();
        assert_eq!(map.get(b"\r".as_slice()), Some(&KeyAction::Play));
        assert_eq!(map.get(b"\n".as_slice()), Some(&KeyAction::Play));
    }

    #[test]
    fn presets_are_zero_based() {
        let map = create_default_keymap();
        assert_eq!(map.get(b"1".as_slice()), Some(&KeyAction::Preset(0)));
        assert_eq!(map.get(b"4".as_slice()), Some(&KeyAction::Preset(3)));
    }

    #[test]
    fn arrow_sequences_are_not_bound_as_stop() {
        // Arrow keys arrive as full escape sequences and must not hit
        // the lone-escape stop binding
        let map = create_default_keymap();
        assert_eq!(map.get(b"\x1b".as_slice()), Some(&KeyAction::Stop));
        assert_eq!(map.get(b"\x1b[A".as_slice()), None);
    }
}
