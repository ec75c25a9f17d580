//! Platform speech backends
//!
//! Two hosts are provided. The native host goes through the platform
//! engine (speech-dispatcher on Linux, AppKit/AVFoundation on macOS)
//! and covers voices, rate, pitch and volume, but cannot pause. The
//! espeak host drives an `espeak-ng` subprocess per utterance and can
//! pause by stopping the process, which also makes it the dependable
//! choice under WSL where speech-dispatcher is rarely set up.

#[cfg(unix)]
mod espeak;
mod native;

#[cfg(unix)]
pub use espeak::EspeakHost;
pub use native::NativeHost;

use crate::error::SpeakpadError;
use crate::speech::{HostEvent, SpeechHost};
use crate::Result;
use log::{info, warn};
use std::sync::mpsc::Sender;

/// Pick a speech host for this machine
///
/// Tries backends in platform order and returns the first that comes
/// up. `events` is cloned into the winner; progress arrives there.
pub fn create_host(events: Sender<HostEvent>) -> Result<Box<dyn SpeechHost>> {
    #[cfg(unix)]
    if crate::platform::is_wsl() {
        info!("WSL detected, preferring the espeak host");
        match EspeakHost::new(events.clone()) {
            Ok(host) => {
                info!("using espeak speech host");
                return Ok(Box::new(host));
            }
            Err(e) => warn!("espeak host failed on WSL: {}", e),
        }
    }

    match NativeHost::new(events.clone()) {
        Ok(host) => {
            info!("using native speech host");
            return Ok(Box::new(host));
        }
        Err(e) => warn!("native host failed: {}", e),
    }

    #[cfg(unix)]
    match EspeakHost::new(events) {
        Ok(host) => {
            info!("using espeak speech host");
            return Ok(Box::new(host));
        }
        Err(e) => warn!("espeak host failed: {}", e),
    }

    Err(SpeakpadError::Host(
        "no speech host available on this system".to_string(),
    ))
}
