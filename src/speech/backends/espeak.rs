//! Speech host driving an espeak-ng subprocess
//!
//! One process per utterance. Pause and resume are real here: the
//! process is stopped with SIGSTOP and continued with SIGCONT, which
//! the native engines cannot offer. Designed with WSL in mind, where
//! audio reaches Windows through the WSLg PulseAudio socket, but it
//! works on any system with espeak-ng installed.
//!
//! Needs espeak-ng on the PATH (apt install espeak-ng) and a
//! PulseAudio client, which WSLg ships with.

use crate::error::SpeakpadError;
use crate::platform::is_wsl;
use crate::speech::{HostEvent, SpeechHost, UtteranceRequest};
use crate::voices::VoiceInfo;
use crate::Result;
use log::{debug, error, info, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::Sender;

/// espeak-ng defaults: 175 words per minute, pitch 50 of 0-99,
/// amplitude 100 of 0-200
const NORMAL_WPM: f32 = 175.0;
const NORMAL_PITCH: f32 = 50.0;
const NORMAL_AMPLITUDE: f32 = 100.0;

/// One row of `espeak-ng --voices`: priority, language tag, age/gender,
/// voice name (spaces shown as underscores)
static VOICE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s+(\S+)\s+\S+\s+(\S+)").unwrap());

pub struct EspeakHost {
    events: Sender<HostEvent>,
    program: String,
    voices: Vec<VoiceInfo>,
    child: Option<Child>,
    paused: bool,
}

impl EspeakHost {
    /// Point espeak-ng's audio at a PulseAudio server
    ///
    /// Auto-detects the WSLg socket and exports PULSE_SERVER for the
    /// subprocesses to inherit. On native Linux the default PulseAudio
    /// configuration is left alone.
    fn setup_pulseaudio() -> Result<()> {
        const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

        if std::env::var("PULSE_SERVER").is_ok() {
            debug!("PULSE_SERVER already set, leaving it alone");
            return Ok(());
        }

        if std::path::Path::new(WSLG_PULSE_PATH).exists() {
            info!("auto-detected WSLg PulseAudio server at {}", WSLG_PULSE_PATH);
            std::env::set_var("PULSE_SERVER", WSLG_PULSE_PATH);
            return Ok(());
        }

        if is_wsl() {
            warn!("WSLg PulseAudio server not found at {}", WSLG_PULSE_PATH);
            warn!("make sure WSLg is installed, or set PULSE_SERVER yourself");
            return Err(SpeakpadError::Host(
                "PulseAudio server not found, install WSLg or set PULSE_SERVER".to_string(),
            ));
        }

        debug!("native Linux, leaving PulseAudio configuration alone");
        Ok(())
    }

    /// Find a working espeak-ng executable
    fn find_program() -> Result<String> {
        let candidates = ["espeak-ng", "/usr/bin/espeak-ng", "espeak"];

        for path in candidates {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(SpeakpadError::Host(
            "espeak-ng not found, install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    pub fn new(events: Sender<HostEvent>) -> Result<Self> {
        debug!("creating espeak host");

        Self::setup_pulseaudio()?;

        let program = Self::find_program()?;
        debug!("found espeak-ng at: {}", program);

        let listing = Command::new(&program)
            .arg("--voices")
            .output()
            .map_err(|e| SpeakpadError::Host(format!("voice listing failed: {e}")))?;
        let voices = parse_voices(&String::from_utf8_lossy(&listing.stdout));
        debug!("espeak offers {} voices", voices.len());

        let _ = events.send(HostEvent::VoicesChanged);

        Ok(EspeakHost {
            events,
            program,
            voices,
            child: None,
            paused: false,
        })
    }

    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("killing espeak-ng process");
            match child.kill() {
                Ok(_) => {
                    let _ = child.wait();
                }
                Err(e) => debug!("failed to kill espeak-ng process: {}", e),
            }
        }
        self.paused = false;
    }

    fn signal_child(child: &Child, signal: Signal) -> nix::Result<()> {
        kill(Pid::from_raw(child.id() as i32), signal)
    }
}

impl SpeechHost for EspeakHost {
    fn name(&self) -> &str {
        "espeak"
    }

    fn list_voices(&mut self) -> Result<Vec<VoiceInfo>> {
        Ok(self.voices.clone())
    }

    fn speak(&mut self, request: &UtteranceRequest) -> Result<()> {
        self.kill_child();

        let voice = request
            .voice_id
            .clone()
            .unwrap_or_else(|| request.language.clone());

        let mut cmd = Command::new(&self.program);
        cmd.arg("-v").arg(&voice);
        cmd.arg("-s").arg(rate_to_speed(request.rate).to_string());
        cmd.arg("-p").arg(pitch_to_espeak(request.pitch).to_string());
        cmd.arg("-a")
            .arg(volume_to_amplitude(request.volume).to_string());
        // Text goes over stdin so leading dashes cannot be taken for options
        cmd.arg("--stdin");
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("failed to spawn espeak-ng: {}", e);
                return Err(SpeakpadError::Host(format!(
                    "failed to start espeak-ng: {e}"
                )));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request.text.as_bytes())
                .map_err(|e| SpeakpadError::Host(format!("failed to send text: {e}")))?;
        }

        debug!("espeak-ng process started for {} chars", request.text.len());
        self.child = Some(child);
        self.paused = false;
        let _ = self.events.send(HostEvent::Started);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        match &self.child {
            Some(child) if !self.paused => {
                if let Err(e) = Self::signal_child(child, Signal::SIGSTOP) {
                    warn!("could not stop espeak-ng process: {}", e);
                } else {
                    self.paused = true;
                    let _ = self.events.send(HostEvent::Paused);
                }
            }
            _ => debug!("pause requested with no running utterance"),
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        match &self.child {
            Some(child) if self.paused => {
                if let Err(e) = Self::signal_child(child, Signal::SIGCONT) {
                    warn!("could not continue espeak-ng process: {}", e);
                } else {
                    self.paused = false;
                    let _ = self.events.send(HostEvent::Resumed);
                }
            }
            _ => debug!("resume requested with nothing paused"),
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        self.kill_child();
        Ok(())
    }

    fn supports_pause(&self) -> bool {
        true
    }

    fn pump(&mut self) -> Result<()> {
        let finished = match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(done) => done,
                Err(e) => {
                    warn!("could not poll espeak-ng process: {}", e);
                    None
                }
            },
            None => None,
        };

        if let Some(status) = finished {
            self.child = None;
            self.paused = false;
            if status.success() {
                let _ = self.events.send(HostEvent::Ended);
            } else {
                let _ = self
                    .events
                    .send(HostEvent::Failed(format!("espeak-ng exited with {status}")));
            }
        }
        Ok(())
    }
}

impl Drop for EspeakHost {
    fn drop(&mut self) {
        debug!("shutting down espeak host");
        self.kill_child();
    }
}

/// Convert a rate multiplier to espeak words per minute (80-450)
fn rate_to_speed(rate: f32) -> u32 {
    ((NORMAL_WPM * rate).round() as i32).clamp(80, 450) as u32
}

/// Convert a pitch multiplier to espeak pitch (0-99)
fn pitch_to_espeak(pitch: f32) -> u32 {
    ((NORMAL_PITCH * pitch).round() as i32).clamp(0, 99) as u32
}

/// Convert a 0.0-1.0 volume to espeak amplitude (0-200)
fn volume_to_amplitude(volume: f32) -> u32 {
    ((NORMAL_AMPLITUDE * volume).round() as i32).clamp(0, 200) as u32
}

/// Parse `espeak-ng --voices` output
///
/// Each language's lowest-priority row is flagged as its default, which
/// is how espeak itself breaks ties when given a bare language code.
fn parse_voices(listing: &str) -> Vec<VoiceInfo> {
    let mut rows: Vec<(u32, VoiceInfo)> = Vec::new();

    for line in listing.lines().skip(1) {
        if let Some(caps) = VOICE_LINE.captures(line) {
            let priority: u32 = caps[1].parse().unwrap_or(u32::MAX);
            let language = caps[2].to_string();
            let name = caps[3].replace('_', " ");
            rows.push((
                priority,
                VoiceInfo {
                    id: language.clone(),
                    name,
                    language,
                    default: false,
                },
            ));
        }
    }

    // Best priority per base language wins the default flag
    let mut best: HashMap<String, (u32, usize)> = HashMap::new();
    for (i, (priority, voice)) in rows.iter().enumerate() {
        let base = voice
            .language
            .split('-')
            .next()
            .unwrap_or(&voice.language)
            .to_string();
        match best.get(&base) {
            Some((seen, _)) if *seen <= *priority => {}
            _ => {
                best.insert(base, (*priority, i));
            }
        }
    }
    for (_, index) in best.values() {
        rows[*index].1.default = true;
    }

    rows.into_iter().map(|(_, voice)| voice).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-gb           --/M      English_(Great_Britain) gmw/en         (en 2)
 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
 5  de              --/M      German             gmw/de
";

    #[test]
    fn parses_voice_rows() {
        let voices = parse_voices(LISTING);
        assert_eq!(voices.len(), 4);
        assert_eq!(voices[1].id, "en-gb");
        assert_eq!(voices[1].name, "English (Great Britain)");
        assert_eq!(voices[1].language, "en-gb");
    }

    #[test]
    fn lowest_priority_row_becomes_the_language_default() {
        let voices = parse_voices(LISTING);
        assert!(voices[1].default, "en-gb at priority 2 beats en-us at 5");
        assert!(!voices[2].default);
        assert!(voices[0].default, "sole voice for its language");
        assert!(voices[3].default);
    }

    #[test]
    fn rate_conversion_pins_the_espeak_defaults() {
        assert_eq!(rate_to_speed(1.0), 175);
        assert_eq!(rate_to_speed(0.1), 80);
        assert_eq!(rate_to_speed(10.0), 450);
    }

    #[test]
    fn pitch_and_volume_conversion() {
        assert_eq!(pitch_to_espeak(1.0), 50);
        assert_eq!(pitch_to_espeak(0.0), 0);
        assert_eq!(pitch_to_espeak(2.0), 99);
        assert_eq!(volume_to_amplitude(1.0), 100);
        assert_eq!(volume_to_amplitude(0.0), 0);
    }

    #[test]
    fn create_espeak_host() {
        let (tx, _rx) = std::sync::mpsc::channel();
        match EspeakHost::new(tx) {
            Ok(host) => println!("espeak host available with {} voices", host.voices.len()),
            Err(e) => println!("espeak host not available: {}", e),
        }
    }
}
