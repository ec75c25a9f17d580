//! System clipboard access
//!
//! The panel can pull the system clipboard into the text buffer, the
//! console counterpart of pasting into the input field.

use crate::{Result, SpeakpadError};
use arboard::Clipboard;
use log::debug;

/// Read text from the system clipboard
pub fn paste_text() -> Result<String> {
    let mut clipboard = Clipboard::new()
        .map_err(|e| SpeakpadError::Clipboard(format!("Failed to open clipboard: {}", e)))?;

    let text = clipboard
        .get_text()
        .map_err(|e| SpeakpadError::Clipboard(format!("Failed to read clipboard: {}", e)))?;

    debug!("Pasted {} chars from clipboard", text.len());
    Ok(text)
}
