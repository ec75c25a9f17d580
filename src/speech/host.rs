//! Speech host trait and boundary types
//!
//! A [`SpeechHost`] wraps one platform synthesizer. Hosts report
//! progress by sending [`HostEvent`]s over a channel handed to them at
//! construction time; the main loop drains that channel every tick and
//! feeds the events to the playback controller.

use crate::voices::VoiceInfo;
use crate::Result;

/// Accepted speaking rate multipliers, 1.0 is normal speed
pub const RATE_RANGE: (f32, f32) = (0.1, 10.0);
/// Accepted pitch multipliers, 1.0 is unmodified
pub const PITCH_RANGE: (f32, f32) = (0.0, 2.0);
/// Accepted volume values, 1.0 is full volume
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

/// Everything needed to render one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub text: String,
    /// Host voice id, or None to let the host resolve from the language
    pub voice_id: Option<String>,
    /// Language tag used when no voice is pinned
    pub language: String,
    /// Speaking rate multiplier, 1.0 is the host's normal speed
    pub rate: f32,
    /// Pitch multiplier, 1.0 is unmodified
    pub pitch: f32,
    /// Volume in 0.0..=1.0
    pub volume: f32,
}

/// Asynchronous notification from a speech host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The set of available voices may have changed
    VoicesChanged,
    /// The current utterance began producing audio
    Started,
    /// The current utterance finished on its own
    Ended,
    /// The host honored a pause request
    Paused,
    /// The host honored a resume request
    Resumed,
    /// The utterance was abandoned by the host
    Failed(String),
}

/// One platform speech engine
///
/// Hosts never emit events for an utterance after [`cancel`] has been
/// called on it; a cancelled utterance simply disappears. Hosts that
/// cannot pause return false from [`supports_pause`] and treat
/// [`pause`]/[`resume`] as logged no-ops rather than errors.
///
/// [`cancel`]: SpeechHost::cancel
/// [`pause`]: SpeechHost::pause
/// [`resume`]: SpeechHost::resume
/// [`supports_pause`]: SpeechHost::supports_pause
pub trait SpeechHost {
    /// Short name for logs and the status line
    fn name(&self) -> &str;

    /// Enumerate every voice the host offers, unfiltered
    fn list_voices(&mut self) -> Result<Vec<VoiceInfo>>;

    /// Begin rendering an utterance
    ///
    /// Any utterance still in flight must be cancelled by the caller
    /// first. Success means the request was accepted, not that audio
    /// has started; wait for [`HostEvent::Started`].
    fn speak(&mut self, request: &UtteranceRequest) -> Result<()>;

    /// Ask the host to pause the current utterance
    fn pause(&mut self) -> Result<()>;

    /// Ask the host to resume a paused utterance
    fn resume(&mut self) -> Result<()>;

    /// Discard the current utterance, if any
    ///
    /// Harmless when nothing is in flight.
    fn cancel(&mut self) -> Result<()>;

    /// Whether pause and resume actually do anything on this host
    fn supports_pause(&self) -> bool;

    /// Give the host a chance to observe progress and emit events
    ///
    /// Called once per main-loop tick. Hosts with real callbacks can
    /// leave this empty; polling hosts check their utterance here.
    fn pump(&mut self) -> Result<()>;
}
