#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! RAII management of the terminal modes the framework needs: raw mode,
//! the alternate screen, cursor visibility, and SGR mouse tracking. All
//! mode changes are tracked so that [`Drop`] restores the previous state in
//! reverse order, and a panic hook performs the same best-effort cleanup
//! when unwinding — the terminal is never left raw on any exit path.
//!
//! When stdin or stdout is not a TTY the session degrades gracefully: raw
//! mode and mode toggles are skipped, but output still flows so redraws can
//! be captured by a pipe.
//!
//! # Escape sequences
//!
//! | Feature | Enable | Disable |
//! |---------|--------|---------|
//! | Alternate screen | `CSI ? 1049 h` | `CSI ? 1049 l` |
//! | Cursor | `CSI ? 25 h` (show) | `CSI ? 25 l` (hide) |
//! | Mouse tracking | `CSI ? 1000/1002/1003/1006 h` | same with `l` |
//! | Clear | `CSI 2 J` then `CSI H` | — |
//!
//! The four mouse modes are emitted individually and in order: button
//! tracking, button-motion, all-motion, then SGR extended coordinates.

use std::io::{self, IsTerminal, Write};
use std::sync::OnceLock;

#[cfg(unix)]
use signal_hook::consts::signal::SIGWINCH;
#[cfg(unix)]
use signal_hook::iterator::Signals;

const ALT_SCREEN_ENTER: &[u8] = b"\x1b[?1049h";
const ALT_SCREEN_LEAVE: &[u8] = b"\x1b[?1049l";
const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";
const MOUSE_ENABLE: [&[u8]; 4] = [
    b"\x1b[?1000h",
    b"\x1b[?1002h",
    b"\x1b[?1003h",
    b"\x1b[?1006h",
];
const MOUSE_DISABLE: [&[u8]; 4] = [
    b"\x1b[?1000l",
    b"\x1b[?1002l",
    b"\x1b[?1003l",
    b"\x1b[?1006l",
];

/// Terminal session configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer.
    pub alternate_screen: bool,
    /// Enable SGR mouse tracking (all four modes).
    pub mouse_capture: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
        }
    }
}

/// A terminal session that owns raw mode and restores it on drop.
///
/// Only one session should exist at a time; the session owns stdout for
/// the duration of the program.
#[derive(Debug)]
pub struct TerminalSession {
    is_tty: bool,
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
}

impl TerminalSession {
    /// Enter raw mode and enable the configured terminal features.
    ///
    /// Without a TTY on both ends the session is created in degraded form:
    /// no raw mode, no mode toggles, output still emitted.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled on a real TTY, or if
    /// the enabling sequences cannot be written.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        let is_tty = io::stdin().is_terminal() && io::stdout().is_terminal();

        let mut session = Self {
            is_tty,
            raw_mode_enabled: false,
            alternate_screen_enabled: false,
            mouse_enabled: false,
        };

        if !is_tty {
            tracing::info!("no tty detected, running degraded (raw mode skipped)");
            return Ok(session);
        }

        crossterm::terminal::enable_raw_mode()?;
        session.raw_mode_enabled = true;
        tracing::debug!("raw mode enabled");

        let mut stdout = io::stdout();

        if options.alternate_screen {
            stdout.write_all(ALT_SCREEN_ENTER)?;
            session.alternate_screen_enabled = true;
        }

        stdout.write_all(CURSOR_HIDE)?;
        stdout.write_all(CLEAR_SCREEN)?;

        if options.mouse_capture {
            for seq in MOUSE_ENABLE {
                stdout.write_all(seq)?;
            }
            session.mouse_enabled = true;
        }

        stdout.flush()?;
        tracing::debug!(
            alternate_screen = session.alternate_screen_enabled,
            mouse = session.mouse_enabled,
            "terminal session started"
        );

        Ok(session)
    }

    /// Whether a real terminal is attached.
    #[must_use]
    pub const fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Current terminal size in (columns, rows).
    ///
    /// Falls back to 80x24 when no terminal is attached, and clamps to a
    /// minimum of 1x1 so downstream buffer allocation stays valid.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        if !self.is_tty {
            return Ok((80, 24));
        }
        let (w, h) = crossterm::terminal::size()?;
        Ok((w.max(1), h.max(1)))
    }

    /// Restore every enabled mode in reverse order of enabling.
    fn cleanup(&mut self) {
        let mut stdout = io::stdout();

        if self.mouse_enabled {
            for seq in MOUSE_DISABLE {
                let _ = stdout.write_all(seq);
            }
            self.mouse_enabled = false;
        }

        let _ = stdout.write_all(CURSOR_SHOW);

        if self.alternate_screen_enabled {
            let _ = stdout.write_all(ALT_SCREEN_LEAVE);
            self.alternate_screen_enabled = false;
        }

        if self.raw_mode_enabled {
            let _ = crossterm::terminal::disable_raw_mode();
            self.raw_mode_enabled = false;
            tracing::debug!("raw mode disabled");
        }

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

/// Unconditional terminal restore for paths that skip `Drop`.
fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    for seq in MOUSE_DISABLE {
        let _ = stdout.write_all(seq);
    }
    let _ = stdout.write_all(CURSOR_SHOW);
    let _ = stdout.write_all(ALT_SCREEN_LEAVE);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Window-change notification source.
///
/// On Unix this subscribes to `SIGWINCH` on a background thread and invokes
/// the supplied callback once per signal. Platforms without the signal get
/// no watcher; callers fall back to polling the size.
#[derive(Debug)]
pub struct ResizeWatcher {
    #[cfg(unix)]
    handle: Option<signal_hook::iterator::Handle>,
    #[cfg(unix)]
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ResizeWatcher {
    /// Start watching for window-change signals.
    ///
    /// `on_resize` runs on the watcher thread; implementations marshal the
    /// notification to their own event loop (a channel send). Returns
    /// `None` when the platform offers no resize signal.
    pub fn spawn<F>(on_resize: F) -> io::Result<Option<Self>>
    where
        F: FnMut() + Send + 'static,
    {
        #[cfg(unix)]
        {
            let mut on_resize = on_resize;
            let mut signals = Signals::new([SIGWINCH]).map_err(io::Error::other)?;
            let handle = signals.handle();
            let thread = std::thread::spawn(move || {
                for signal in signals.forever() {
                    if signal == SIGWINCH {
                        on_resize();
                    }
                }
            });
            Ok(Some(Self {
                handle: Some(handle),
                thread: Some(thread),
            }))
        }
        #[cfg(not(unix))]
        {
            let _ = on_resize;
            Ok(None)
        }
    }
}

#[cfg(unix)]
impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
