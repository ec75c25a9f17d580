//! Speakpad main entry point
//!
//! The panel's main loop monitors two sources:
//! 1. stdin (keystrokes) - dispatched to the handler stack
//! 2. Signals (SIGWINCH for resize, SIGTSTP for suspend) - set flags
//!
//! plus a timer deadline so the debounced voice refresh and the host
//! pump run even when no key arrives.

use log::{debug, error, info, warn};
use mio::{Events, Interest, Poll, Token};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use speakpad::input::{create_default_keymap, DefaultHandler};
use speakpad::platform::is_wsl;
use speakpad::speech::create_host;
use speakpad::state::prefs::Prefs;
use speakpad::state::State;
use speakpad::term::{get_terminal_size, restore_termios, set_raw_mode};
use speakpad::{Result, SpeakpadError};
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

/// mio registration token for stdin
const STDIN: Token = Token(0);

/// The loop wakes at least this often to pump the host and check flags
const TICK: Duration = Duration::from_millis(100);

/// Set from the SIGWINCH handler, drained by the main loop
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// Set from the SIGTSTP handler, drained by the main loop
static SUSPEND_PENDING: AtomicBool = AtomicBool::new(false);

/// Signal handlers only flip flags; the loop does the actual work
extern "C" fn handle_sigwinch(_: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// SIGTSTP handler - sets flag so playback pauses before stopping
extern "C" fn handle_sigtstp(_: libc::c_int) {
    SUSPEND_PENDING.store(true, Ordering::Relaxed);
}

fn main() {
    // The only command line surface is the debug flag
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    if debug_mode {
        // Debug mode: write to speakpad.log file, stderr would tear
        // up the panel
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("speakpad.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not open speakpad.log for debug logging: {}",
                    e
                );
                eprintln!("Continuing with stderr logging only");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "speakpad version {} starting (debug mode, logging to speakpad.log)",
            speakpad::VERSION
        );
    } else {
        // Without --debug only errors reach stderr
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run() {
        error!("fatal: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    debug!("Initializing speakpad");

    // The panel needs an interactive terminal for raw keyboard input,
    // so refuse pipes and redirects up front
    let stdin_fd = io::stdin().as_raw_fd();
    if unsafe { libc::isatty(stdin_fd) } == 0 {
        eprintln!("Error: speakpad requires an interactive terminal (stdin is not a TTY)");
        eprintln!("Usage: run speakpad directly in a terminal, not through pipes or redirects");
        eprintln!("Example: speakpad");
        process::exit(1);
    }

    // Raw mode so space, escape and digits act without waiting for
    // a newline
    let original_termios = set_raw_mode(stdin_fd)?;

    // Cooked mode comes back whichever way run() exits
    let _guard = TermiosGuard {
        fd: stdin_fd,
        termios: original_termios,
    };

    // The status line and counter lay out against the current width
    let (cols, rows) = get_terminal_size(stdin_fd)?;
    info!("terminal is {}x{}", cols, rows);

    // Load preferences and initialize state
    let prefs = Prefs::load()?;
    info!("Preferences loaded from {:?}", prefs.path());

    // Bring up speech. The panel stays usable without a host, it just
    // cannot speak; every speech key says so instead.
    let (event_tx, event_rx) = mpsc::channel();
    let host = match create_host(event_tx) {
        Ok(host) => Some(host),
        Err(e) => {
            error!("no speech host: {}", e);
            None
        }
    };

    let mut state = State::new(prefs, host, event_rx, cols);

    // Create default key handler for the panel bindings
    let keymap = create_default_keymap();
    info!("keymap loaded, {} bindings", keymap.len());
    let mut default_handler = DefaultHandler::new(keymap);

    // Window resize and job-control suspend both arrive as signals
    unsafe {
        signal::signal(Signal::SIGWINCH, SigHandler::Handler(handle_sigwinch)).map_err(|e| {
            SpeakpadError::Terminal(format!("Failed to set SIGWINCH handler: {}", e))
        })?;
        signal::signal(Signal::SIGTSTP, SigHandler::Handler(handle_sigtstp)).map_err(|e| {
            SpeakpadError::Terminal(format!("Failed to set SIGTSTP handler: {}", e))
        })?;
    }

    // epoll rejects TTY descriptors under WSL, so that platform polls
    // with select() instead
    let use_select = is_wsl();

    let mut mio_poll = if !use_select {
        debug!("polling stdin through mio");
        let poll = Poll::new()?;

        // Keystrokes are the only readiness source
        let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
        poll.registry()
            .register(&mut stdin_source, STDIN, Interest::READABLE)?;

        Some((poll, Events::with_capacity(16)))
    } else {
        debug!("polling stdin through select(), WSL detected");
        None
    };

    // First paint. Enumerate voices right away rather than waiting for
    // the host's startup change notification to come due.
    state.refresh_voices_now()?;
    state.announce("Ready");
    state.redraw()?;

    info!("speakpad up, entering the main loop");

    // The loop watches three things:
    // - User input (panel bindings and modal handlers)
    // - Host events (playback progress, voice list changes)
    // - Window resize and suspend signals
    loop {
        // Check for pending suspend. The flag comes from Ctrl+Z in raw
        // mode (via the keymap) or from a SIGTSTP sent from outside.
        let signal_suspend = SUSPEND_PENDING.swap(false, Ordering::Relaxed);
        let key_suspend = std::mem::take(&mut state.suspend_requested);
        if signal_suspend || key_suspend {
            suspend(&mut state, stdin_fd, &original_termios)?;
        }

        // Apply a resize noted by the SIGWINCH handler
        if RESIZE_PENDING.swap(false, Ordering::Relaxed) {
            let (new_cols, new_rows) = get_terminal_size(stdin_fd)?;
            info!("terminal resized to {}x{}", new_cols, new_rows);

            state.panel.set_width(new_cols);
            state.redraw()?;
        }

        // Pump the host, drain its events, run a due voice refresh
        state.tick()?;

        if !state.running {
            break;
        }

        // Sleep until the next refresh deadline, capped so signal
        // flags and the host pump stay responsive
        let timeout = state.time_until_deadline().map_or(TICK, |d| d.min(TICK));

        if use_select {
            use nix::sys::select::{select, FdSet};
            use nix::sys::time::{TimeVal, TimeValLike};
            use std::os::unix::io::BorrowedFd;

            let stdin_borrowed = unsafe { BorrowedFd::borrow_raw(stdin_fd) };

            // select() mutates the set, so it is rebuilt every pass
            let mut read_fds = FdSet::new();
            read_fds.insert(stdin_borrowed);

            let mut tv = TimeVal::milliseconds(timeout.as_millis() as i64);

            match select(None, Some(&mut read_fds), None, None, Some(&mut tv)) {
                Ok(_n) => {
                    if read_fds.contains(stdin_borrowed) {
                        if let Err(e) = handle_stdin(&mut state, &mut default_handler) {
                            error!("reading stdin failed: {}", e);
                            return Ok(());
                        }
                    }
                }
                Err(nix::errno::Errno::EINTR) => {
                    debug!("select() interrupted, rechecking signal flags");
                }
                Err(e) => {
                    error!("select() failed: {:?}", e);
                    return Err(SpeakpadError::Io(io::Error::from_raw_os_error(e as i32)));
                }
            }
        } else if let Some((ref mut poll, ref mut events)) = mio_poll {
            match poll.poll(events, Some(timeout)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    debug!("poll interrupted, rechecking signal flags");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            for event in events.iter() {
                if event.token() == STDIN {
                    if let Err(e) = handle_stdin(&mut state, &mut default_handler) {
                        error!("reading stdin failed: {}", e);
                        return Ok(());
                    }
                }
            }
        }

        if !state.running {
            break;
        }
    }

    state.save_prefs();
    print!("\r\nGoodbye.\r\n");
    io::stdout().flush()?;
    Ok(())
}

/// Read one chunk of stdin and route it to a handler
///
/// One read is one keystroke in raw mode; escape sequences arrive as a
/// single multi-byte read, which is how the keymap tells a lone escape
/// from an arrow key.
fn handle_stdin(state: &mut State, default_handler: &mut DefaultHandler) -> Result<()> {
    let mut buf = [0u8; 4096];

    let n = io::stdin().read(&mut buf)?;
    if n == 0 {
        return Ok(());
    }

    let key = &buf[..n];

    // Modal handlers (menus, prompts) shadow the default bindings
    if state.dispatch_modal(key)? {
        return Ok(());
    }

    default_handler.process_key(key, state)?;
    Ok(())
}

/// Put the process into the background for Ctrl+Z or SIGTSTP
///
/// Playback pauses (once per utterance, no auto-resume) and the
/// terminal goes back to cooked mode before the process stops itself.
/// Execution picks up after the stop when SIGCONT arrives.
fn suspend(state: &mut State, stdin_fd: RawFd, original: &libc::termios) -> Result<()> {
    info!("suspending");
    if let Err(e) = state.pause_for_suspend() {
        warn!("pause before suspend failed: {}", e);
    }

    restore_termios(stdin_fd, original);
    print!("\r\n");
    io::stdout().flush()?;

    if let Err(e) = signal::raise(Signal::SIGSTOP) {
        warn!("could not stop the process: {}", e);
    }

    // Continued; back to raw mode and a fresh paint
    set_raw_mode(stdin_fd)?;
    info!("resumed from suspend");
    state.tick()?;
    state.redraw()?;
    Ok(())
}

/// Restores the saved termios when dropped
///
/// Covers early returns and panics, not just the clean exit path
struct TermiosGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        restore_termios(self.fd, &self.termios);
        debug!("termios restored");
    }
}
