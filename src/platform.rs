//! Host platform quirks the panel adapts to

use std::fs;

/// True inside WSL (Windows Subsystem for Linux)
///
/// WSL needs two departures from native Linux: epoll on TTY file
/// descriptors is unreliable there (the event loop falls back to
/// select), and speech-dispatcher is usually absent (the espeak-ng
/// backend over the WSLG PulseAudio server is preferred).
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok() || std::env::var("WSL_INTEROP").is_ok()
}
