//! Central panel state and the operations keys invoke
//!
//! The State struct is the central data structure for the panel,
//! holding preferences, the playback controller, the voice directory
//! and the rendering surface. The operations here are what key
//! bindings call into; every one leaves the screen redrawn.

pub mod prefs;

use crate::input::{HandlerStack, KeyHandler, PromptHandler};
use crate::panel::{Panel, Theme};
use crate::playback::{PauseOutcome, PlaybackChange, PlaybackController, PlaybackState};
use crate::presets::{load_presets, Preset};
use crate::speech::{HostEvent, SpeechHost, UtteranceRequest};
use crate::voices::{RefreshOutcome, VoiceDirectory};
use crate::{Result, MAX_TEXT_LEN};
use log::{debug, info, warn};
use prefs::Prefs;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// Languages the l key cycles through
pub const LANGUAGES: &[&str] = &["en", "es", "fr", "de"];

/// Main application state for the panel
pub struct State {
    /// Preferences loaded from ~/.speakpad.cfg
    pub prefs: Prefs,

    /// Playback state machine, one utterance at a time
    pub playback: PlaybackController,

    /// Voices for the current language, with selection and the
    /// debounced refresh timer
    pub voices: VoiceDirectory,

    /// Rendering surface and status line
    pub panel: Panel,

    /// Menus and prompts stacked over the panel
    pub handlers: HandlerStack,

    /// Presets reachable from the number keys
    pub presets: Vec<Preset>,

    /// Event loop keeps running while this is set
    pub running: bool,

    /// A suspend was requested by key or signal, the main loop acts on it
    pub suspend_requested: bool,

    /// Speech host, None when no backend came up
    host: Option<Box<dyn SpeechHost>>,

    /// Host events drained once per tick
    events: Receiver<HostEvent>,
}

impl State {
    pub fn new(
        prefs: Prefs,
        host: Option<Box<dyn SpeechHost>>,
        events: Receiver<HostEvent>,
        width: u16,
    ) -> Self {
        let theme = Theme::from_name(&prefs.theme());
        let presets = load_presets();
        info!(
            "State initialized, theme {}, {} presets, host {}",
            theme.name(),
            presets.len(),
            host.as_deref().map(|h| h.name()).unwrap_or("none")
        );

        State {
            prefs,
            playback: PlaybackController::new(),
            voices: VoiceDirectory::new(),
            panel: Panel::new(theme, width),
            handlers: HandlerStack::new(),
            presets,
            running: true,
            suspend_requested: false,
            host,
            events,
        }
    }

    /// Whether a speech host came up at startup
    pub fn host_available(&self) -> bool {
        self.host.is_some()
    }

    /// Put a message on the status line
    pub fn announce(&mut self, message: &str) {
        debug!("announce: {}", message);
        self.panel.announce(message);
    }

    /// Repaint the panel from current state
    pub fn redraw(&self) -> Result<()> {
        let text = self.prefs.text();
        let language = self.prefs.language();
        let view = crate::panel::PanelView {
            text: &text,
            language: &language,
            voice_name: self.voices.resolve().map(|v| v.name.as_str()),
            voice_count: self.voices.voices().len(),
            voices_loaded: self.voices.is_loaded(),
            rate: self.prefs.rate(),
            pitch: self.prefs.pitch(),
            volume: self.prefs.volume(),
            playback: self.playback.state(),
            host_name: self.host.as_deref().map(|h| h.name()),
        };
        self.panel.draw(&view)
    }

    /// Stop the event loop after the current iteration
    pub fn quit(&mut self) {
        info!("quit requested");
        self.running = false;
    }

    /// Save preferences, complaining in the log rather than the panel
    ///
    /// A full disk should not take the speech controls down with it.
    pub fn save_prefs(&self) {
        if let Err(e) = self.prefs.save() {
            warn!("could not save preferences: {}", e);
        }
    }

    // Playback operations

    /// Speak the text buffer, or resume paused speech
    pub fn play(&mut self) -> Result<()> {
        let request = UtteranceRequest {
            text: self.prefs.text(),
            voice_id: self.voices.resolve().map(|v| v.id.clone()),
            language: self.prefs.language(),
            rate: self.prefs.rate(),
            pitch: self.prefs.pitch(),
            volume: self.prefs.volume(),
        };

        let host = match self.host.as_deref_mut() {
            Some(host) => host,
            None => {
                self.panel.announce("Speech is not available");
                return self.redraw();
            }
        };

        match self.playback.play(host, request) {
            // Confirmation events will announce start or resume
            Ok(_) => {}
            Err(crate::SpeakpadError::EmptyText) => {
                self.panel.announce("Please enter some text to speak");
                self.redraw()?;
                // Hand the keyboard straight to the editor
                return self.open_text_editor();
            }
            Err(e) => {
                warn!("play failed: {}", e);
                self.panel.announce(&format!("Speech error: {}", e));
            }
        }
        self.redraw()
    }

    /// Open the modal text editor over the panel
    pub fn open_text_editor(&mut self) -> Result<()> {
        let editor = PromptHandler::text_editor(self.prefs.text());
        editor.redraw(self)?;
        self.handlers.push(Box::new(editor));
        Ok(())
    }

    /// Pause when speaking, resume when paused
    pub fn toggle_pause(&mut self) -> Result<()> {
        let host = match self.host.as_deref_mut() {
            Some(host) => host,
            None => {
                self.panel.announce("Speech is not available");
                return self.redraw();
            }
        };

        if self.playback.state() == PlaybackState::Speaking && !host.supports_pause() {
            self.panel.announce("Pause is not supported by this host");
            return self.redraw();
        }

        match self.playback.toggle_pause(host) {
            Ok(PauseOutcome::NoActive) => self.panel.announce("Nothing is playing"),
            Ok(_) => {}
            Err(e) => {
                warn!("pause toggle failed: {}", e);
                self.panel.announce(&format!("Speech error: {}", e));
            }
        }
        self.redraw()
    }

    /// Cancel playback
    pub fn stop(&mut self) -> Result<()> {
        let host = match self.host.as_deref_mut() {
            Some(host) => host,
            None => return self.redraw(),
        };

        match self.playback.stop(host) {
            Ok(true) => self.panel.announce("Speech stopped"),
            // Stopping silence is not worth an announcement
            Ok(false) => {}
            Err(e) => {
                warn!("stop failed: {}", e);
                self.panel.announce(&format!("Speech error: {}", e));
            }
        }
        self.redraw()
    }

    /// Pause playback because the app is going into the background
    pub fn pause_for_suspend(&mut self) -> Result<bool> {
        match self.host.as_deref_mut() {
            Some(host) => self.playback.pause_for_suspend(host),
            None => Ok(false),
        }
    }

    // Host plumbing, called from the event loop

    /// Let the host observe progress, then apply everything it reported
    pub fn tick(&mut self) -> Result<()> {
        if let Some(host) = self.host.as_deref_mut() {
            if let Err(e) = host.pump() {
                warn!("host pump failed: {}", e);
            }
        }
        self.handle_host_events()?;

        if self.voices.refresh_due(Instant::now()) {
            self.refresh_voices_now()?;
        }
        Ok(())
    }

    /// How long the event loop may sleep before something is due
    pub fn time_until_deadline(&self) -> Option<Duration> {
        self.voices.time_until_refresh(Instant::now())
    }

    /// Drain the host event channel
    pub fn handle_host_events(&mut self) -> Result<()> {
        let mut need_redraw = false;

        while let Ok(event) = self.events.try_recv() {
            debug!("host event: {:?}", event);
            if event == HostEvent::VoicesChanged {
                self.voices.notify_changed(Instant::now());
                continue;
            }

            if let Some(change) = self.playback.handle_event(&event) {
                let message = match change {
                    PlaybackChange::Started => "Speech started".to_string(),
                    PlaybackChange::Ended => "Speech completed".to_string(),
                    PlaybackChange::Paused => "Speech paused".to_string(),
                    PlaybackChange::Resumed => "Speech resumed".to_string(),
                    PlaybackChange::Failed(reason) => format!("Speech error: {}", reason),
                };
                self.panel.announce(&message);
                need_redraw = true;
            }
        }

        if need_redraw {
            self.redraw()?;
        }
        Ok(())
    }

    /// Re-read the voice list from the host right now
    ///
    /// Applies the language filter and revalidates the saved selection.
    /// Host trouble during enumeration keeps the previous list.
    pub fn refresh_voices_now(&mut self) -> Result<()> {
        let host = match self.host.as_deref_mut() {
            Some(host) => host,
            None => return Ok(()),
        };

        let all = match host.list_voices() {
            Ok(all) => all,
            Err(e) => {
                warn!("voice refresh failed: {}", e);
                return Ok(());
            }
        };

        let language = self.prefs.language();
        let outcome = self
            .voices
            .refresh(all, &language, self.prefs.voice_index());
        if outcome == RefreshOutcome::NoVoices {
            self.panel.announce("No voices available for selected language");
        }
        self.redraw()
    }

    // Text operations

    fn store_text(&mut self, text: String) -> usize {
        let text: String = text.chars().take(MAX_TEXT_LEN).collect();
        let count = text.chars().count();
        self.prefs.set_text(&text);
        count
    }

    /// Replace the text buffer, from the text prompt
    pub fn set_text(&mut self, text: String) -> Result<()> {
        let count = self.store_text(text);
        self.save_prefs();
        self.panel
            .announce(&format!("Text updated, {} characters", count));
        self.redraw()
    }

    /// Replace the text buffer with the clipboard contents
    pub fn paste_clipboard(&mut self) -> Result<()> {
        match crate::clipboard::paste_text() {
            Ok(text) if !text.trim().is_empty() => {
                let count = self.store_text(text);
                self.save_prefs();
                self.panel.announce(&format!("Pasted {} characters", count));
            }
            Ok(_) => self.panel.announce("Clipboard is empty"),
            Err(e) => {
                warn!("clipboard read failed: {}", e);
                self.panel.announce(&format!("Clipboard error: {}", e));
            }
        }
        self.redraw()
    }

    /// Load a preset into the text buffer
    ///
    /// A preset that names a language also switches the panel to it.
    pub fn load_preset(&mut self, index: usize) -> Result<()> {
        let preset = match self.presets.get(index) {
            Some(preset) => preset.clone(),
            None => {
                self.panel.announce("No such preset");
                return self.redraw();
            }
        };

        debug!("loading preset '{}'", preset.name);
        self.store_text(preset.text);

        let language_changed = match &preset.language {
            Some(language) if *language != self.prefs.language() => {
                self.prefs.set_language(language);
                true
            }
            _ => false,
        };

        self.save_prefs();
        self.panel.announce("Sample text loaded");
        if language_changed {
            self.refresh_voices_now()?;
        }
        self.redraw()
    }

    // Voice and language operations

    /// Move to the next stock language
    pub fn cycle_language(&mut self) -> Result<()> {
        let current = self.prefs.language();
        let next = match LANGUAGES.iter().position(|l| *l == current) {
            Some(i) => LANGUAGES[(i + 1) % LANGUAGES.len()],
            None => LANGUAGES[0],
        };

        self.prefs.set_language(next);
        self.save_prefs();
        self.panel.announce(&format!("Language: {}", next));
        self.refresh_voices_now()?;
        self.redraw()
    }

    /// Pick a voice from the directory by position
    pub fn select_voice(&mut self, index: usize) -> Result<()> {
        match self.voices.select(index) {
            Some(voice) => {
                let name = voice.name.clone();
                self.prefs.set_voice_index(Some(index));
                self.save_prefs();
                self.panel.announce(&format!("Selected voice: {}", name));
            }
            None => self.panel.announce("No such voice"),
        }
        self.redraw()
    }

    // Settings operations, called from the settings menu prompts

    pub fn set_rate(&mut self, rate: f32) -> Result<()> {
        self.prefs.set_rate(rate);
        self.save_prefs();
        self.panel.announce("confirmed");
        self.redraw()
    }

    pub fn set_pitch(&mut self, pitch: f32) -> Result<()> {
        self.prefs.set_pitch(pitch);
        self.save_prefs();
        self.panel.announce("confirmed");
        self.redraw()
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.prefs.set_volume(volume);
        self.save_prefs();
        self.panel.announce("confirmed");
        self.redraw()
    }

    /// Flip the theme and persist the choice
    pub fn toggle_theme(&mut self) -> Result<()> {
        let theme = self.panel.toggle_theme();
        self.prefs.set_theme(theme.name());
        self.save_prefs();
        self.panel.announce(&format!("Theme: {}", theme.name()));
        self.redraw()
    }

    /// Summarize the current settings on the status line
    pub fn announce_settings(&mut self) -> Result<()> {
        let voice = self
            .voices
            .resolve()
            .map(|v| v.name.clone())
            .unwrap_or_else(|| "host default".to_string());
        let host = self
            .host
            .as_deref()
            .map(|h| h.name().to_string())
            .unwrap_or_else(|| "unavailable".to_string());

        let message = format!(
            "Voice {}, language {}, rate {:.1}, pitch {:.1}, volume {:.1}, host {}",
            voice,
            self.prefs.language(),
            self.prefs.rate(),
            self.prefs.pitch(),
            self.prefs.volume(),
            host
        );
        self.panel.announce(&message);
        self.redraw()
    }

    // Modal input

    /// Give the key to the top modal handler, if one is open
    ///
    /// Returns false when the stack is empty and the default bindings
    /// should have it instead. The handler is popped for the duration
    /// of the call so it can reach everything on the state.
    pub fn dispatch_modal(&mut self, key: &[u8]) -> Result<bool> {
        let mut handler = match self.handlers.pop() {
            Some(handler) => handler,
            None => return Ok(false),
        };

        match handler.process(key, self)? {
            crate::input::HandlerAction::Handled => self.handlers.push(handler),
            crate::input::HandlerAction::Remove => {}
            crate::input::HandlerAction::Push(top) => {
                self.handlers.push(handler);
                self.handlers.push(top);
            }
        }

        // Repaint whichever screen now has focus
        match self.handlers.last() {
            Some(top) => top.redraw(self)?,
            None => self.redraw()?,
        }
        Ok(true)
    }
}
