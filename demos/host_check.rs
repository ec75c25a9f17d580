//! Quick speech host check
//!
//! Run with: cargo run --example host_check
//!
//! Brings up whichever host `create_host` picks for this machine,
//! lists its voices and speaks a few lines at different settings.

use anyhow::Context;
use speakpad::speech::{create_host, HostEvent, SpeechHost, UtteranceRequest};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

fn request(text: &str, rate: f32, volume: f32) -> UtteranceRequest {
    UtteranceRequest {
        text: text.to_string(),
        voice_id: None,
        language: "en".to_string(),
        rate,
        pitch: 1.0,
        volume,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Checking speech hosts...");

    let (tx, rx) = mpsc::channel();
    let mut host = create_host(tx).context("no speech host came up")?;
    println!("✓ Speech host ready: {}", host.name());

    match host.list_voices() {
        Ok(voices) => {
            println!("✓ {} voices available", voices.len());
            for voice in voices.iter().take(10) {
                let default = if voice.default { " (default)" } else { "" };
                println!(
                    "  {} [{}] {}{}",
                    voice.id, voice.language, voice.name, default
                );
            }
        }
        Err(e) => eprintln!("✗ Voice listing failed: {}", e),
    }

    println!("\nSpeaking at normal settings...");
    say(host.as_mut(), &rx, request("Hello from the speech panel.", 1.0, 1.0));

    println!("Speaking slower and quieter...");
    say(host.as_mut(), &rx, request("This is slow, quiet speech.", 0.7, 0.5));

    println!("Speaking faster...");
    say(host.as_mut(), &rx, request("And this is fast speech.", 1.6, 1.0));

    println!("\n✓ Host check finished");
    println!("If you heard three utterances, speech output is working.");
    Ok(())
}

/// Speak one utterance and pump until the host reports it finished
fn say(host: &mut dyn SpeechHost, events: &Receiver<HostEvent>, request: UtteranceRequest) {
    if let Err(e) = host.speak(&request) {
        eprintln!("  ✗ speak failed: {}", e);
        return;
    }

    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        host.pump().ok();

        for event in events.try_iter() {
            match event {
                HostEvent::Ended => {
                    println!("  ✓ done");
                    return;
                }
                HostEvent::Failed(reason) => {
                    eprintln!("  ✗ failed: {}", reason);
                    return;
                }
                _ => {}
            }
        }

        if Instant::now() >= deadline {
            eprintln!("  ✗ timed out waiting for the utterance to finish");
            host.cancel().ok();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
