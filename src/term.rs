//! Terminal setup utilities
//!
//! The panel runs in raw mode so single keypresses (space, escape,
//! digits) act immediately without waiting for a newline. These
//! helpers wrap the termios calls and the window-size ioctl.

use crate::Result;
use nix::libc;
use std::os::unix::io::RawFd;

/// Ask the terminal driver for the current window size
///
/// The panel only needs the width for truncating previews, but the
/// full size is returned for symmetry with the resize handler.
pub fn get_terminal_size(fd: RawFd) -> Result<(u16, u16)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };

    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 {
        Ok((ws.ws_col, ws.ws_row))
    } else {
        // Sensible default when the ioctl is unavailable (e.g. some
        // terminal multiplexers during detach)
        Ok((80, 24))
    }
}

/// Put the terminal into raw mode
///
/// Returns the original attributes so they can be restored on exit.
pub fn set_raw_mode(fd: RawFd) -> Result<libc::termios> {
    let original_termios = unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios
    };

    let mut raw_termios = original_termios;

    unsafe {
        libc::cfmakeraw(&mut raw_termios);
        libc::tcsetattr(fd, libc::TCSANOW, &raw_termios);
    }

    Ok(original_termios)
}

/// Put the saved attributes back on the terminal
///
/// Called on exit, and around job-control suspension, to hand the
/// terminal back in its original state.
pub fn restore_termios(fd: RawFd, termios: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, termios);
    }
}
