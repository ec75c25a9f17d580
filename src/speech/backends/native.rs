//! Native speech host backed by the `tts` crate
//!
//! Uses the platform engine: speech-dispatcher on Linux, AppKit or
//! AVFoundation on macOS. Utterance progress arrives through engine
//! callbacks where the engine has them; otherwise [`pump`] watches
//! `is_speaking` once per tick. The `tts` crate exposes no pause, so
//! pause requests are logged and dropped.
//!
//! [`pump`]: NativeHost::pump

use crate::error::SpeakpadError;
use crate::speech::{HostEvent, SpeechHost, UtteranceRequest};
use crate::speech::{PITCH_RANGE, RATE_RANGE, VOLUME_RANGE};
use crate::voices::VoiceInfo;
use crate::Result;
use log::{debug, warn};
use std::sync::mpsc::Sender;
use tts::Tts;

/// Pumps to wait for a queued utterance to reach the audio device
/// before concluding it ended unheard. Ticks are at most 100ms apart.
const START_GRACE_PUMPS: u32 = 20;

pub struct NativeHost {
    tts: Tts,
    events: Sender<HostEvent>,
    callbacks: bool,
    default_voice: Option<String>,
    // Polling state, used only when the engine lacks callbacks
    active: bool,
    heard: bool,
    quiet_pumps: u32,
}

impl NativeHost {
    pub fn new(events: Sender<HostEvent>) -> Result<Self> {
        let tts = Tts::default()
            .map_err(|e| SpeakpadError::Host(format!("native engine init failed: {e}")))?;

        let features = tts.supported_features();
        debug!("native engine features: {:?}", features);

        let callbacks = features.utterance_callbacks;
        if callbacks {
            let sender = events.clone();
            tts.on_utterance_begin(Some(Box::new(move |_| {
                let _ = sender.send(HostEvent::Started);
            })))
            .map_err(|e| SpeakpadError::Host(format!("callback registration failed: {e}")))?;

            let sender = events.clone();
            tts.on_utterance_end(Some(Box::new(move |_| {
                let _ = sender.send(HostEvent::Ended);
            })))
            .map_err(|e| SpeakpadError::Host(format!("callback registration failed: {e}")))?;

            // A stopped utterance was cancelled on purpose; stay silent
            tts.on_utterance_stop(Some(Box::new(|_| {})))
                .map_err(|e| SpeakpadError::Host(format!("callback registration failed: {e}")))?;
        }

        // The voice the engine comes up with is the closest thing it
        // has to a default
        let default_voice = if features.get_voice {
            match tts.voice() {
                Ok(current) => current.map(|v| v.id()),
                Err(e) => {
                    warn!("could not read current voice: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let _ = events.send(HostEvent::VoicesChanged);

        Ok(NativeHost {
            tts,
            events,
            callbacks,
            default_voice,
            active: false,
            heard: false,
            quiet_pumps: 0,
        })
    }

    /// Best-effort application of voice, rate, pitch and volume
    ///
    /// Engines differ in what they honor; a parameter the engine
    /// rejects is logged and skipped rather than failing the utterance.
    fn apply_parameters(&mut self, request: &UtteranceRequest) {
        let features = self.tts.supported_features();

        if features.voice {
            if let Some(wanted) = &request.voice_id {
                match self.tts.voices() {
                    Ok(voices) => match voices.iter().find(|v| v.id() == *wanted) {
                        Some(voice) => {
                            if let Err(e) = self.tts.set_voice(voice) {
                                warn!("set_voice failed: {}", e);
                            }
                        }
                        None => warn!("voice '{}' is no longer offered", wanted),
                    },
                    Err(e) => warn!("voice lookup failed: {}", e),
                }
            }
        }

        if features.rate {
            let rate = span(
                request.rate,
                RATE_RANGE.0,
                1.0,
                RATE_RANGE.1,
                self.tts.min_rate(),
                self.tts.normal_rate(),
                self.tts.max_rate(),
            );
            if let Err(e) = self.tts.set_rate(rate) {
                warn!("set_rate failed: {}", e);
            }
        }

        if features.pitch {
            let pitch = span(
                request.pitch,
                PITCH_RANGE.0,
                1.0,
                PITCH_RANGE.1,
                self.tts.min_pitch(),
                self.tts.normal_pitch(),
                self.tts.max_pitch(),
            );
            if let Err(e) = self.tts.set_pitch(pitch) {
                warn!("set_pitch failed: {}", e);
            }
        }

        if features.volume {
            let volume = span(
                request.volume,
                VOLUME_RANGE.0,
                1.0,
                VOLUME_RANGE.1,
                self.tts.min_volume(),
                self.tts.normal_volume(),
                self.tts.max_volume(),
            );
            if let Err(e) = self.tts.set_volume(volume) {
                warn!("set_volume failed: {}", e);
            }
        }
    }
}

impl SpeechHost for NativeHost {
    fn name(&self) -> &str {
        "native"
    }

    fn list_voices(&mut self) -> Result<Vec<VoiceInfo>> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| SpeakpadError::Host(format!("voice enumeration failed: {e}")))?;

        Ok(voices
            .iter()
            .map(|v| VoiceInfo {
                id: v.id(),
                name: v.name(),
                language: v.language().to_string(),
                default: self.default_voice.as_deref() == Some(v.id().as_str()),
            })
            .collect())
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<()> {
        self.apply_parameters(request);
        self.tts
            .speak(request.text.clone(), true)
            .map_err(|e| SpeakpadError::Host(format!("speak failed: {e}")))?;

        if !self.callbacks {
            self.active = true;
            self.heard = false;
            self.quiet_pumps = 0;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        warn!("native engine cannot pause, request ignored");
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        warn!("native engine cannot resume, request ignored");
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        self.active = false;
        self.heard = false;
        self.quiet_pumps = 0;
        self.tts
            .stop()
            .map(|_| ())
            .map_err(|e| SpeakpadError::Host(format!("stop failed: {e}")))
    }

    fn supports_pause(&self) -> bool {
        false
    }

    fn pump(&mut self) -> Result<()> {
        if self.callbacks || !self.active {
            return Ok(());
        }

        // An engine that cannot report progress reads as never speaking
        // and falls out through the grace period below
        let speaking = match self.tts.is_speaking() {
            Ok(speaking) => speaking,
            Err(e) => {
                debug!("is_speaking failed: {}", e);
                false
            }
        };

        if speaking {
            if !self.heard {
                self.heard = true;
                let _ = self.events.send(HostEvent::Started);
            }
        } else if self.heard {
            self.active = false;
            self.heard = false;
            let _ = self.events.send(HostEvent::Ended);
        } else {
            self.quiet_pumps += 1;
            if self.quiet_pumps > START_GRACE_PUMPS {
                // The engine never picked the utterance up
                self.active = false;
                let _ = self.events.send(HostEvent::Ended);
            }
        }
        Ok(())
    }
}

/// Piecewise-linear map from a user scale onto an engine scale
///
/// `(lo, mid, hi)` describe the user scale with `mid` as the neutral
/// value; the output scale is described the same way. Input is clamped
/// into `[lo, hi]` first.
fn span(value: f32, lo: f32, mid: f32, hi: f32, out_lo: f32, out_mid: f32, out_hi: f32) -> f32 {
    let v = value.clamp(lo, hi);
    if v >= mid {
        if hi - mid <= f32::EPSILON {
            out_mid
        } else {
            out_mid + (out_hi - out_mid) * ((v - mid) / (hi - mid))
        }
    } else {
        out_lo + (out_mid - out_lo) * ((v - lo) / (mid - lo))
    }
}

#[cfg(test)]
mod tests {
    use super::span;

    #[test]
    fn span_maps_the_three_anchor_points() {
        assert_eq!(span(0.1, 0.1, 1.0, 10.0, -100.0, 0.0, 100.0), -100.0);
        assert_eq!(span(1.0, 0.1, 1.0, 10.0, -100.0, 0.0, 100.0), 0.0);
        assert_eq!(span(10.0, 0.1, 1.0, 10.0, -100.0, 0.0, 100.0), 100.0);
    }

    #[test]
    fn span_clamps_out_of_range_input() {
        assert_eq!(span(50.0, 0.1, 1.0, 10.0, 0.0, 50.0, 100.0), 100.0);
        assert_eq!(span(-3.0, 0.1, 1.0, 10.0, 0.0, 50.0, 100.0), 0.0);
    }

    #[test]
    fn span_handles_a_degenerate_upper_half() {
        // Volume style scale where neutral and maximum coincide
        assert_eq!(span(1.0, 0.0, 1.0, 1.0, 0.0, 80.0, 100.0), 80.0);
        assert_eq!(span(0.5, 0.0, 1.0, 1.0, 0.0, 80.0, 100.0), 40.0);
    }
}
