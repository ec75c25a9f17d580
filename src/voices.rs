//! Voice directory
//!
//! Keeps the list of voices offered for the current language, the
//! user's selection within it, and the debounce timer that coalesces
//! bursts of change notifications from the host into a single refresh.

use log::debug;
use std::time::{Duration, Instant};

/// How long to wait after the last change notification before
/// re-reading the voice list. Hosts tend to announce changes several
/// times in quick succession while they enumerate.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(100);

/// A single voice as reported by the speech host
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    /// Host-specific identifier, stable across refreshes
    pub id: String,
    /// Human-readable name shown in the voice menu
    pub name: String,
    /// BCP-47 style language tag, e.g. "en-US" or "de"
    pub language: String,
    /// Whether the host considers this the preferred voice for its language
    pub default: bool,
}

/// Result of applying a refresh to the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The directory now holds this many voices for the language filter
    Voices(usize),
    /// Nothing matched the language filter
    NoVoices,
}

/// Voices filtered for one language, plus selection and refresh state
#[derive(Debug)]
pub struct VoiceDirectory {
    voices: Vec<VoiceInfo>,
    loaded: bool,
    selected: Option<usize>,
    refresh_deadline: Option<Instant>,
}

impl VoiceDirectory {
    pub fn new() -> Self {
        VoiceDirectory {
            voices: Vec::new(),
            loaded: false,
            selected: None,
            refresh_deadline: None,
        }
    }

    /// Voices matching the current language filter, in host order
    pub fn voices(&self) -> &[VoiceInfo] {
        &self.voices
    }

    /// True once at least one refresh has been applied
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Select a voice by position in the filtered list
    ///
    /// Out-of-range indices leave the selection untouched.
    pub fn select(&mut self, index: usize) -> Option<&VoiceInfo> {
        if index < self.voices.len() {
            self.selected = Some(index);
            self.voices.get(index)
        } else {
            None
        }
    }

    /// Record a change notification from the host
    ///
    /// Arms the refresh timer, or pushes it back if already armed, so
    /// a burst of notifications ends in exactly one refresh.
    pub fn notify_changed(&mut self, now: Instant) {
        self.refresh_deadline = Some(now + REFRESH_DEBOUNCE);
        debug!("voice change noted, refresh in {:?}", REFRESH_DEBOUNCE);
    }

    /// Whether the debounce window has elapsed and a refresh is owed
    pub fn refresh_due(&self, now: Instant) -> bool {
        match self.refresh_deadline {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    /// Time remaining until the pending refresh, if one is armed
    ///
    /// Feeds the event loop timeout so the refresh fires promptly
    /// instead of waiting for the next keypress.
    pub fn time_until_refresh(&self, now: Instant) -> Option<Duration> {
        self.refresh_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Replace the directory contents from a fresh host enumeration
    ///
    /// Filters `all` down to voices whose language tag starts with
    /// `language` (case-insensitive), then restores the saved selection
    /// if it still points inside the filtered list. A stale index is
    /// dropped so resolution falls back to the language default.
    pub fn refresh(
        &mut self,
        all: Vec<VoiceInfo>,
        language: &str,
        saved_index: Option<usize>,
    ) -> RefreshOutcome {
        self.refresh_deadline = None;
        self.loaded = true;

        let want = language.to_ascii_lowercase();
        self.voices = all
            .into_iter()
            .filter(|v| v.language.to_ascii_lowercase().starts_with(&want))
            .collect();

        self.selected = match saved_index {
            Some(i) if i < self.voices.len() => Some(i),
            _ => None,
        };

        debug!(
            "voice directory refreshed: {} voices for '{}', selection {:?}",
            self.voices.len(),
            language,
            self.selected
        );

        if self.voices.is_empty() {
            RefreshOutcome::NoVoices
        } else {
            RefreshOutcome::Voices(self.voices.len())
        }
    }

    /// The voice an utterance should use right now
    ///
    /// Explicit selection wins. Otherwise the host's default for the
    /// language, otherwise the first voice in the list, otherwise
    /// nothing and the host picks.
    pub fn resolve(&self) -> Option<&VoiceInfo> {
        if let Some(i) = self.selected {
            if let Some(v) = self.voices.get(i) {
                return Some(v);
            }
        }
        self.voices
            .iter()
            .find(|v| v.default)
            .or_else(|| self.voices.first())
    }
}

impl Default for VoiceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, name: &str, language: &str, default: bool) -> VoiceInfo {
        VoiceInfo {
            id: id.to_string(),
            name: name.to_string(),
            language: language.to_string(),
            default,
        }
    }

    fn sample() -> Vec<VoiceInfo> {
        vec![
            voice("en1", "Alice", "en-US", false),
            voice("en2", "Brian", "en-GB", true),
            voice("es1", "Carmen", "es-ES", true),
            voice("de1", "Dieter", "de", false),
        ]
    }

    #[test]
    fn debounce_waits_for_the_full_window() {
        let mut dir = VoiceDirectory::new();
        let t0 = Instant::now();
        dir.notify_changed(t0);

        assert!(!dir.refresh_due(t0));
        assert!(!dir.refresh_due(t0 + Duration::from_millis(99)));
        assert!(dir.refresh_due(t0 + REFRESH_DEBOUNCE));
    }

    #[test]
    fn repeated_notifications_extend_the_window() {
        let mut dir = VoiceDirectory::new();
        let t0 = Instant::now();
        dir.notify_changed(t0);
        dir.notify_changed(t0 + Duration::from_millis(60));

        // The first deadline has passed but the second supersedes it
        assert!(!dir.refresh_due(t0 + Duration::from_millis(110)));
        assert!(dir.refresh_due(t0 + Duration::from_millis(160)));
    }

    #[test]
    fn refresh_disarms_the_timer() {
        let mut dir = VoiceDirectory::new();
        let t0 = Instant::now();
        dir.notify_changed(t0);
        dir.refresh(sample(), "en", None);

        assert!(!dir.refresh_due(t0 + Duration::from_secs(5)));
        assert_eq!(dir.time_until_refresh(t0), None);
    }

    #[test]
    fn time_until_refresh_saturates_at_zero() {
        let mut dir = VoiceDirectory::new();
        let t0 = Instant::now();
        assert_eq!(dir.time_until_refresh(t0), None);

        dir.notify_changed(t0);
        assert_eq!(
            dir.time_until_refresh(t0 + Duration::from_millis(40)),
            Some(Duration::from_millis(60))
        );
        assert_eq!(
            dir.time_until_refresh(t0 + Duration::from_millis(500)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn filter_is_a_case_insensitive_prefix_match() {
        let mut dir = VoiceDirectory::new();
        let outcome = dir.refresh(sample(), "en", None);

        assert_eq!(outcome, RefreshOutcome::Voices(2));
        assert_eq!(dir.voices()[0].name, "Alice");
        assert_eq!(dir.voices()[1].name, "Brian");

        dir.refresh(sample(), "EN-gb", None);
        assert_eq!(dir.voices().len(), 1);
        assert_eq!(dir.voices()[0].name, "Brian");
    }

    #[test]
    fn refresh_reports_when_nothing_matches() {
        let mut dir = VoiceDirectory::new();
        let outcome = dir.refresh(sample(), "ja", None);

        assert_eq!(outcome, RefreshOutcome::NoVoices);
        assert!(dir.is_loaded());
        assert!(dir.voices().is_empty());
        assert_eq!(dir.resolve(), None);
    }

    #[test]
    fn saved_selection_survives_a_refresh_when_still_valid() {
        let mut dir = VoiceDirectory::new();
        dir.refresh(sample(), "en", Some(1));

        assert_eq!(dir.selected_index(), Some(1));
        assert_eq!(dir.resolve().unwrap().name, "Brian");
    }

    #[test]
    fn stale_saved_selection_falls_back_to_the_default() {
        let mut dir = VoiceDirectory::new();
        dir.refresh(sample(), "en", Some(7));

        assert_eq!(dir.selected_index(), None);
        // Brian carries the default flag for English
        assert_eq!(dir.resolve().unwrap().name, "Brian");
    }

    #[test]
    fn resolution_prefers_selection_then_default_then_first() {
        let mut dir = VoiceDirectory::new();
        dir.refresh(sample(), "en", None);
        assert_eq!(dir.resolve().unwrap().name, "Brian");

        dir.select(0);
        assert_eq!(dir.resolve().unwrap().name, "Alice");

        // No default flag among German voices, first entry wins
        dir.refresh(sample(), "de", None);
        assert_eq!(dir.resolve().unwrap().name, "Dieter");
    }

    #[test]
    fn select_rejects_out_of_range_indices() {
        let mut dir = VoiceDirectory::new();
        dir.refresh(sample(), "en", Some(0));

        assert!(dir.select(9).is_none());
        assert_eq!(dir.selected_index(), Some(0));

        let picked = dir.select(1).cloned();
        assert_eq!(picked.unwrap().name, "Brian");
    }

    #[test]
    fn directory_starts_unloaded() {
        let dir = VoiceDirectory::new();
        assert!(!dir.is_loaded());
        assert!(dir.voices().is_empty());
        assert_eq!(dir.resolve(), None);
    }
}
