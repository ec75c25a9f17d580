//! Speech host boundary
//!
//! Everything that touches a real synthesizer lives behind the
//! [`SpeechHost`] trait so the playback state machine, the voice
//! directory, and the panel can all be exercised without audio
//! hardware. `backends` holds the per-platform implementations and the
//! fallback chain that picks one at startup.

pub mod backends;
mod host;

pub use backends::create_host;
pub use host::{HostEvent, SpeechHost, UtteranceRequest};
pub use host::{PITCH_RANGE, RATE_RANGE, VOLUME_RANGE};
