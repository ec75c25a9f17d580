//! Playback state machine
//!
//! Tracks one utterance through Idle, Speaking and Paused. Requests go
//! down to the [`SpeechHost`]; every forward transition waits for the
//! host to confirm with an event, so the panel never claims the host is
//! speaking before audio actually starts. Stop is the one exception: it
//! drops to Idle immediately, because a cancelled utterance produces no
//! further events to wait for.

use crate::error::SpeakpadError;
use crate::speech::{HostEvent, SpeechHost, UtteranceRequest};
use crate::Result;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing in flight, or an utterance submitted and not yet started
    Idle,
    Speaking,
    Paused,
}

/// What a play request turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A new utterance went to the host
    Submitted,
    /// Playback was paused, so the host was asked to pick it back up
    ResumeRequested,
}

/// What a pause toggle turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    PauseRequested,
    ResumeRequested,
    /// Nothing was playing
    NoActive,
}

/// A confirmed state change, ready to announce
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackChange {
    Started,
    Ended,
    Paused,
    Resumed,
    Failed(String),
}

pub struct PlaybackController {
    state: PlaybackState,
    /// The utterance the host is working on, set from submission until
    /// it ends, fails, or is stopped
    current: Option<UtteranceRequest>,
    /// A suspend pause was requested and not yet confirmed
    suspend_pause_pending: bool,
}

impl PlaybackController {
    pub fn new() -> Self {
        PlaybackController {
            state: PlaybackState::Idle,
            current: None,
            suspend_pause_pending: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current(&self) -> Option<&UtteranceRequest> {
        self.current.as_ref()
    }

    /// Whether an utterance is speaking, paused, or submitted and
    /// waiting to start
    pub fn is_active(&self) -> bool {
        self.state != PlaybackState::Idle || self.current.is_some()
    }

    /// Start speaking, or resume if playback is paused
    ///
    /// Empty and whitespace-only text is rejected before the host sees
    /// it. A request while something else is in flight cancels the old
    /// utterance first, then submits the new one.
    pub fn play(
        &mut self,
        host: &mut dyn SpeechHost,
        mut request: UtteranceRequest,
    ) -> Result<PlayOutcome> {
        let trimmed = request.text.trim();
        if trimmed.is_empty() {
            return Err(SpeakpadError::EmptyText);
        }

        if self.state == PlaybackState::Paused {
            debug!("play while paused, resuming instead");
            host.resume()?;
            return Ok(PlayOutcome::ResumeRequested);
        }

        if trimmed.len() != request.text.len() {
            request.text = trimmed.to_string();
        }

        if self.is_active() {
            debug!("replacing utterance in flight");
            host.cancel()?;
        }
        host.speak(&request)?;

        self.state = PlaybackState::Idle;
        self.current = Some(request);
        self.suspend_pause_pending = false;
        Ok(PlayOutcome::Submitted)
    }

    /// Pause when speaking, resume when paused
    pub fn toggle_pause(&mut self, host: &mut dyn SpeechHost) -> Result<PauseOutcome> {
        match self.state {
            PlaybackState::Speaking => {
                host.pause()?;
                Ok(PauseOutcome::PauseRequested)
            }
            PlaybackState::Paused => {
                host.resume()?;
                Ok(PauseOutcome::ResumeRequested)
            }
            PlaybackState::Idle => Ok(PauseOutcome::NoActive),
        }
    }

    /// Cancel whatever is in flight and return to Idle now
    ///
    /// Returns true if there was anything to stop, so the caller knows
    /// whether an announcement is warranted. The host cancel itself is
    /// unconditional and harmless when idle.
    pub fn stop(&mut self, host: &mut dyn SpeechHost) -> Result<bool> {
        let was_active = self.is_active();
        host.cancel()?;
        self.state = PlaybackState::Idle;
        self.current = None;
        self.suspend_pause_pending = false;
        Ok(was_active)
    }

    /// Pause because the app is being put in the background
    ///
    /// Only acts while actually speaking, and only once per utterance
    /// until the host confirms, so repeated suspend signals do not pile
    /// up pause requests. Nothing resumes automatically afterwards.
    pub fn pause_for_suspend(&mut self, host: &mut dyn SpeechHost) -> Result<bool> {
        if self.state == PlaybackState::Speaking && !self.suspend_pause_pending {
            self.suspend_pause_pending = true;
            host.pause()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Apply a host event, returning the confirmed change if any
    ///
    /// Events that do not fit the current state are from utterances
    /// already stopped or replaced, and are dropped.
    pub fn handle_event(&mut self, event: &HostEvent) -> Option<PlaybackChange> {
        match event {
            HostEvent::Started => {
                if self.current.is_some() {
                    self.state = PlaybackState::Speaking;
                    self.suspend_pause_pending = false;
                    Some(PlaybackChange::Started)
                } else {
                    debug!("ignoring start for an abandoned utterance");
                    None
                }
            }
            HostEvent::Ended => {
                if self.is_active() {
                    self.state = PlaybackState::Idle;
                    self.current = None;
                    self.suspend_pause_pending = false;
                    Some(PlaybackChange::Ended)
                } else {
                    debug!("ignoring end for an abandoned utterance");
                    None
                }
            }
            HostEvent::Paused => {
                if self.state == PlaybackState::Speaking {
                    self.state = PlaybackState::Paused;
                    self.suspend_pause_pending = false;
                    Some(PlaybackChange::Paused)
                } else {
                    None
                }
            }
            HostEvent::Resumed => {
                if self.state == PlaybackState::Paused {
                    self.state = PlaybackState::Speaking;
                    Some(PlaybackChange::Resumed)
                } else {
                    None
                }
            }
            HostEvent::Failed(reason) => {
                if self.is_active() {
                    self.state = PlaybackState::Idle;
                    self.current = None;
                    self.suspend_pause_pending = false;
                    Some(PlaybackChange::Failed(reason.clone()))
                } else {
                    None
                }
            }
            // Voice changes are the directory's business
            HostEvent::VoicesChanged => None,
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices::VoiceInfo;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Speak(String),
        Pause,
        Resume,
        Cancel,
    }

    #[derive(Default)]
    struct MockHost {
        calls: Vec<Call>,
    }

    impl SpeechHost for MockHost {
        fn name(&self) -> &str {
            "mock"
        }
        fn list_voices(&mut self) -> crate::Result<Vec<VoiceInfo>> {
            Ok(Vec::new())
        }
        fn speak(&mut self, request: &UtteranceRequest) -> crate::Result<()> {
            self.calls.push(Call::Speak(request.text.clone()));
            Ok(())
        }
        fn pause(&mut self) -> crate::Result<()> {
            self.calls.push(Call::Pause);
            Ok(())
        }
        fn resume(&mut self) -> crate::Result<()> {
            self.calls.push(Call::Resume);
            Ok(())
        }
        fn cancel(&mut self) -> crate::Result<()> {
            self.calls.push(Call::Cancel);
            Ok(())
        }
        fn supports_pause(&self) -> bool {
            true
        }
        fn pump(&mut self) -> crate::Result<()> {
            Ok(())
        }
    }

    fn request(text: &str) -> UtteranceRequest {
        UtteranceRequest {
            text: text.to_string(),
            voice_id: None,
            language: "en".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }

    fn speaking(host: &mut MockHost) -> PlaybackController {
        let mut pb = PlaybackController::new();
        pb.play(host, request("hello")).unwrap();
        pb.handle_event(&HostEvent::Started);
        assert_eq!(pb.state(), PlaybackState::Speaking);
        pb
    }

    #[test]
    fn empty_text_is_rejected_before_reaching_the_host() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();

        for text in ["", "   ", "\t\n  "] {
            let err = pb.play(&mut host, request(text)).unwrap_err();
            assert!(matches!(err, SpeakpadError::EmptyText));
        }
        assert!(host.calls.is_empty());
        assert_eq!(pb.state(), PlaybackState::Idle);
        assert!(!pb.is_active());
    }

    #[test]
    fn play_trims_surrounding_whitespace() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();

        pb.play(&mut host, request("  hello  ")).unwrap();
        assert_eq!(host.calls, vec![Call::Speak("hello".to_string())]);
        assert_eq!(pb.current().unwrap().text, "hello");
    }

    #[test]
    fn play_waits_for_the_host_to_confirm_a_start() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();

        let outcome = pb.play(&mut host, request("hello")).unwrap();
        assert_eq!(outcome, PlayOutcome::Submitted);
        assert_eq!(pb.state(), PlaybackState::Idle);
        assert!(pb.is_active());

        let change = pb.handle_event(&HostEvent::Started);
        assert_eq!(change, Some(PlaybackChange::Started));
        assert_eq!(pb.state(), PlaybackState::Speaking);
    }

    #[test]
    fn play_while_speaking_cancels_before_submitting() {
        let mut host = MockHost::default();
        let mut pb = speaking(&mut host);
        host.calls.clear();

        pb.play(&mut host, request("newer")).unwrap();
        assert_eq!(
            host.calls,
            vec![Call::Cancel, Call::Speak("newer".to_string())]
        );
        // Back to waiting for the replacement to start
        assert_eq!(pb.state(), PlaybackState::Idle);
        assert_eq!(pb.current().unwrap().text, "newer");
    }

    #[test]
    fn play_while_paused_resumes_and_keeps_the_utterance() {
        let mut host = MockHost::default();
        let mut pb = speaking(&mut host);
        pb.toggle_pause(&mut host).unwrap();
        pb.handle_event(&HostEvent::Paused);
        host.calls.clear();

        let outcome = pb.play(&mut host, request("different text")).unwrap();
        assert_eq!(outcome, PlayOutcome::ResumeRequested);
        assert_eq!(host.calls, vec![Call::Resume]);
        assert_eq!(pb.current().unwrap().text, "hello");

        let change = pb.handle_event(&HostEvent::Resumed);
        assert_eq!(change, Some(PlaybackChange::Resumed));
        assert_eq!(pb.state(), PlaybackState::Speaking);
    }

    #[test]
    fn stop_reports_whether_anything_was_playing() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();

        assert!(!pb.stop(&mut host).unwrap());

        pb.play(&mut host, request("hello")).unwrap();
        assert!(pb.stop(&mut host).unwrap());
        assert_eq!(pb.state(), PlaybackState::Idle);
        assert_eq!(pb.current(), None);
    }

    #[test]
    fn stop_takes_effect_without_waiting_for_the_host() {
        let mut host = MockHost::default();
        let mut pb = speaking(&mut host);

        pb.stop(&mut host).unwrap();
        assert_eq!(pb.state(), PlaybackState::Idle);
        assert!(!pb.is_active());
    }

    #[test]
    fn pause_toggle_follows_the_confirmed_state() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();

        assert_eq!(pb.toggle_pause(&mut host).unwrap(), PauseOutcome::NoActive);
        assert!(host.calls.is_empty());

        pb = speaking(&mut host);
        host.calls.clear();

        assert_eq!(
            pb.toggle_pause(&mut host).unwrap(),
            PauseOutcome::PauseRequested
        );
        // Still speaking until the host confirms
        assert_eq!(pb.state(), PlaybackState::Speaking);
        assert_eq!(pb.handle_event(&HostEvent::Paused), Some(PlaybackChange::Paused));
        assert_eq!(pb.state(), PlaybackState::Paused);

        assert_eq!(
            pb.toggle_pause(&mut host).unwrap(),
            PauseOutcome::ResumeRequested
        );
        assert_eq!(host.calls, vec![Call::Pause, Call::Resume]);
    }

    #[test]
    fn events_for_abandoned_utterances_are_dropped() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();

        assert_eq!(pb.handle_event(&HostEvent::Started), None);
        assert_eq!(pb.handle_event(&HostEvent::Ended), None);
        assert_eq!(pb.handle_event(&HostEvent::Paused), None);
        assert_eq!(pb.handle_event(&HostEvent::Resumed), None);
        assert_eq!(
            pb.handle_event(&HostEvent::Failed("late".to_string())),
            None
        );
        assert_eq!(pb.state(), PlaybackState::Idle);

        // Resumed cannot fire while speaking, only from Paused
        pb = speaking(&mut host);
        assert_eq!(pb.handle_event(&HostEvent::Resumed), None);
        assert_eq!(pb.state(), PlaybackState::Speaking);
    }

    #[test]
    fn an_utterance_can_end_before_it_was_seen_starting() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();
        pb.play(&mut host, request("tiny")).unwrap();

        let change = pb.handle_event(&HostEvent::Ended);
        assert_eq!(change, Some(PlaybackChange::Ended));
        assert_eq!(pb.state(), PlaybackState::Idle);
        assert_eq!(pb.current(), None);
    }

    #[test]
    fn failure_clears_the_utterance_and_reports_the_reason() {
        let mut host = MockHost::default();
        let mut pb = speaking(&mut host);

        let change = pb.handle_event(&HostEvent::Failed("engine gone".to_string()));
        assert_eq!(change, Some(PlaybackChange::Failed("engine gone".to_string())));
        assert_eq!(pb.state(), PlaybackState::Idle);
        assert!(!pb.is_active());
    }

    #[test]
    fn suspend_pauses_once_and_never_resumes_by_itself() {
        let mut host = MockHost::default();
        let mut pb = speaking(&mut host);
        host.calls.clear();

        assert!(pb.pause_for_suspend(&mut host).unwrap());
        assert!(!pb.pause_for_suspend(&mut host).unwrap());
        assert_eq!(host.calls, vec![Call::Pause]);

        pb.handle_event(&HostEvent::Paused);
        assert_eq!(pb.state(), PlaybackState::Paused);

        // Coming back to the foreground leaves playback paused
        assert!(!pb.pause_for_suspend(&mut host).unwrap());
        assert_eq!(host.calls, vec![Call::Pause]);
    }

    #[test]
    fn suspend_does_nothing_when_idle_or_paused() {
        let mut host = MockHost::default();
        let mut pb = PlaybackController::new();

        assert!(!pb.pause_for_suspend(&mut host).unwrap());
        assert!(host.calls.is_empty());
    }
}
