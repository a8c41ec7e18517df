#![forbid(unsafe_code)]

//! Input parser state machine.
//!
//! Decodes the raw terminal byte stream into [`Event`] values. The parser
//! accumulates unparsed bytes; [`InputParser::parse_next`] returns the next
//! complete event or `None`. Partial escape sequences stay buffered until
//! they complete — they are never surfaced as errors. A bare ESC cannot be
//! distinguished from the start of a sequence by bytes alone, so the caller
//! flushes it with [`InputParser::flush_escape`] after an idle period.
//!
//! Handled encodings:
//!
//! - printable ASCII, control codes (Ctrl+letter), DEL as Backspace
//! - UTF-8 multi-byte characters
//! - CSI sequences with `;`-separated decimal parameters and xterm
//!   `1;<modifier>` encoding
//! - SS3 (`ESC O`) function keys F1-F4
//! - SGR mouse reports `CSI < Cb ; Cx ; Cy (M|m)` with 0-based
//!   coordinate normalization
//!
//! Sequence buffers are length-limited so a hostile byte stream cannot grow
//! memory without bound.

use std::collections::VecDeque;

use crate::event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent};

/// Maximum CSI sequence length before the parser bails to ignore mode.
const MAX_CSI_LEN: usize = 256;

/// Parser state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParserState {
    /// Normal character input.
    #[default]
    Ground,
    /// After ESC (0x1B).
    Escape,
    /// Collecting CSI parameter/intermediate bytes.
    Csi,
    /// Ignoring an oversized CSI sequence until its final byte.
    CsiIgnore,
    /// After ESC O (SS3 introducer).
    Ss3,
    /// Collecting a UTF-8 multi-byte sequence.
    Utf8 {
        /// Bytes collected so far.
        collected: u8,
        /// Total bytes expected.
        expected: u8,
    },
}

/// Terminal input parser.
#[derive(Debug, Default)]
pub struct InputParser {
    state: ParserState,
    /// Bytes received but not yet consumed by the state machine.
    pending: VecDeque<u8>,
    /// CSI parameter bytes for the sequence in flight.
    buffer: Vec<u8>,
    /// UTF-8 bytes collected so far.
    utf8: [u8; 4],
}

impl InputParser {
    /// Create a new parser in the ground state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ParserState::Ground,
            pending: VecDeque::new(),
            buffer: Vec::with_capacity(32),
            utf8: [0; 4],
        }
    }

    /// Append raw bytes to the parse queue.
    pub fn push_bytes(&mut self, input: &[u8]) {
        self.pending.extend(input.iter().copied());
    }

    /// Consume queued bytes until an event completes.
    ///
    /// Returns `None` when the queue is exhausted without completing an
    /// event; any partially consumed sequence stays in the state machine.
    pub fn parse_next(&mut self) -> Option<Event> {
        while let Some(byte) = self.pending.pop_front() {
            if let Some(event) = self.process_byte(byte) {
                return Some(event);
            }
        }
        None
    }

    /// Push bytes and drain every event they complete.
    pub fn advance(&mut self, input: &[u8]) -> Vec<Event> {
        self.push_bytes(input);
        let mut events = Vec::new();
        while let Some(event) = self.parse_next() {
            events.push(event);
        }
        events
    }

    /// Whether a lone ESC is waiting for more bytes.
    #[must_use]
    pub fn has_pending_escape(&self) -> bool {
        self.state == ParserState::Escape && self.pending.is_empty()
    }

    /// Resolve a buffered lone ESC into an Escape key event.
    ///
    /// Call after an idle timeout; a no-op unless the parser is sitting in
    /// the escape state with nothing left to read.
    pub fn flush_escape(&mut self) -> Option<Event> {
        if self.has_pending_escape() {
            self.state = ParserState::Ground;
            Some(Event::Key(KeyEvent::new(KeyCode::Escape)))
        } else {
            None
        }
    }

    fn process_byte(&mut self, byte: u8) -> Option<Event> {
        match self.state {
            ParserState::Ground => self.process_ground(byte),
            ParserState::Escape => self.process_escape(byte),
            ParserState::Csi => self.process_csi(byte),
            ParserState::CsiIgnore => self.process_csi_ignore(byte),
            ParserState::Ss3 => self.process_ss3(byte),
            ParserState::Utf8 {
                collected,
                expected,
            } => self.process_utf8(byte, collected, expected),
        }
    }

    fn process_ground(&mut self, byte: u8) -> Option<Event> {
        match byte {
            0x1B => {
                self.state = ParserState::Escape;
                None
            }
            0x00 => Some(Event::Key(KeyEvent::new(KeyCode::Null))),
            0x08 => Some(Event::Key(KeyEvent::new(KeyCode::Backspace))),
            0x09 => Some(Event::Key(KeyEvent::new(KeyCode::Tab))),
            0x0D => Some(Event::Key(KeyEvent::new(KeyCode::Enter))),
            // Ctrl+A..Ctrl+Z, minus the bytes that double as Tab/Enter.
            0x01..=0x07 | 0x0A..=0x0C | 0x0E..=0x1A => {
                let c = (byte + b'a' - 1) as char;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL),
                ))
            }
            0x7F => Some(Event::Key(KeyEvent::new(KeyCode::Backspace))),
            0x20..=0x7E => Some(Event::Key(KeyEvent::new(KeyCode::Char(byte as char)))),
            0xC0..=0xDF => self.start_utf8(byte, 2),
            0xE0..=0xEF => self.start_utf8(byte, 3),
            0xF0..=0xF7 => self.start_utf8(byte, 4),
            _ => None,
        }
    }

    fn start_utf8(&mut self, byte: u8, expected: u8) -> Option<Event> {
        self.utf8[0] = byte;
        self.state = ParserState::Utf8 {
            collected: 1,
            expected,
        };
        None
    }

    fn process_utf8(&mut self, byte: u8, collected: u8, expected: u8) -> Option<Event> {
        if byte & 0xC0 != 0x80 {
            // Broken continuation; drop the sequence and re-process the byte.
            self.state = ParserState::Ground;
            return self.process_byte(byte);
        }

        self.utf8[collected as usize] = byte;
        let collected = collected + 1;
        if collected < expected {
            self.state = ParserState::Utf8 {
                collected,
                expected,
            };
            return None;
        }

        self.state = ParserState::Ground;
        std::str::from_utf8(&self.utf8[..expected as usize])
            .ok()
            .and_then(|s| s.chars().next())
            .map(|c| Event::Key(KeyEvent::new(KeyCode::Char(c))))
    }

    fn process_escape(&mut self, byte: u8) -> Option<Event> {
        match byte {
            b'[' => {
                self.state = ParserState::Csi;
                self.buffer.clear();
                None
            }
            b'O' => {
                self.state = ParserState::Ss3;
                None
            }
            // ESC ESC: deliver the first as Alt+Escape.
            0x1B => {
                self.state = ParserState::Ground;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Escape).with_modifiers(Modifiers::ALT),
                ))
            }
            0x20..=0x7E => {
                self.state = ParserState::Ground;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Char(byte as char)).with_modifiers(Modifiers::ALT),
                ))
            }
            _ => {
                self.state = ParserState::Ground;
                None
            }
        }
    }

    fn process_csi(&mut self, byte: u8) -> Option<Event> {
        // ESC restarts the sequence.
        if byte == 0x1B {
            self.state = ParserState::Escape;
            self.buffer.clear();
            return None;
        }

        if self.buffer.len() >= MAX_CSI_LEN {
            self.state = ParserState::CsiIgnore;
            self.buffer.clear();
            return None;
        }

        self.buffer.push(byte);

        match byte {
            // Parameter and intermediate bytes.
            0x20..=0x3F => None,
            // Final byte.
            0x40..=0x7E => {
                self.state = ParserState::Ground;
                self.parse_csi_sequence()
            }
            _ => {
                self.state = ParserState::Ground;
                self.buffer.clear();
                None
            }
        }
    }

    fn process_csi_ignore(&mut self, byte: u8) -> Option<Event> {
        if byte == 0x1B {
            self.state = ParserState::Escape;
            return None;
        }
        if let 0x40..=0x7E = byte {
            self.state = ParserState::Ground;
        }
        None
    }

    fn parse_csi_sequence(&mut self) -> Option<Event> {
        let seq = std::mem::take(&mut self.buffer);
        let final_byte = *seq.last()?;
        let params = &seq[..seq.len() - 1];

        if params.starts_with(b"<") && (final_byte == b'M' || final_byte == b'm') {
            return parse_sgr_mouse(&params[1..], final_byte);
        }

        match final_byte {
            b'A' => Some(Event::Key(key_with_modifiers(KeyCode::Up, params))),
            b'B' => Some(Event::Key(key_with_modifiers(KeyCode::Down, params))),
            b'C' => Some(Event::Key(key_with_modifiers(KeyCode::Right, params))),
            b'D' => Some(Event::Key(key_with_modifiers(KeyCode::Left, params))),
            b'H' => Some(Event::Key(key_with_modifiers(KeyCode::Home, params))),
            b'F' => Some(Event::Key(key_with_modifiers(KeyCode::End, params))),
            b'Z' => Some(Event::Key(key_with_modifiers(KeyCode::BackTab, params))),
            b'~' => parse_csi_tilde(params),
            _ => None,
        }
    }

    fn process_ss3(&mut self, byte: u8) -> Option<Event> {
        if byte == 0x1B {
            self.state = ParserState::Escape;
            return None;
        }

        self.state = ParserState::Ground;

        let code = match byte {
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            _ => return None,
        };

        Some(Event::Key(KeyEvent::new(code)))
    }
}

/// Parse CSI sequences ending in `~` (named keys by leading parameter).
fn parse_csi_tilde(params: &[u8]) -> Option<Event> {
    let num = first_param(params)?;
    let mods = modifier_param(params);

    let code = match num {
        1 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        15 => KeyCode::F(5),
        17 => KeyCode::F(6),
        18 => KeyCode::F(7),
        19 => KeyCode::F(8),
        20 => KeyCode::F(9),
        21 => KeyCode::F(10),
        23 => KeyCode::F(11),
        24 => KeyCode::F(12),
        _ => return None,
    };

    Some(Event::Key(KeyEvent::new(code).with_modifiers(mods)))
}

fn first_param(params: &[u8]) -> Option<u32> {
    let s = std::str::from_utf8(params).ok()?;
    s.split(';').next()?.parse().ok()
}

/// Decode the xterm `1;<modifier>` parameter into modifier flags.
fn modifier_param(params: &[u8]) -> Modifiers {
    let Ok(s) = std::str::from_utf8(params) else {
        return Modifiers::NONE;
    };

    let value: u32 = s
        .split(';')
        .nth(1)
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    modifiers_from_xterm(value)
}

/// xterm modifier encoding: value = 1 + bits (Shift=1, Alt=2, Ctrl=4).
fn modifiers_from_xterm(value: u32) -> Modifiers {
    let bits = value.saturating_sub(1);
    let mut mods = Modifiers::NONE;
    if bits & 1 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if bits & 2 != 0 {
        mods |= Modifiers::ALT;
    }
    if bits & 4 != 0 {
        mods |= Modifiers::CTRL;
    }
    mods
}

fn key_with_modifiers(code: KeyCode, params: &[u8]) -> KeyEvent {
    KeyEvent::new(code).with_modifiers(modifier_param(params))
}

/// Parse an SGR mouse report: `Cb ; Cx ; Cy` with `M` press / `m` release.
///
/// Bit 64 of `Cb` marks wheel events (64 = up, 65 = down); bits 0-1 pick
/// the button; bits 2-4 carry modifiers. Coordinates arrive 1-based.
fn parse_sgr_mouse(params: &[u8], final_byte: u8) -> Option<Event> {
    let s = std::str::from_utf8(params).ok()?;
    let mut parts = s.split(';');

    let code: u16 = parts.next()?.parse().ok()?;
    let x: u16 = parts.next()?.parse().ok()?;
    let y: u16 = parts.next()?.parse().ok()?;

    let button = if code & 64 != 0 {
        if code & 1 == 0 {
            MouseButton::WheelUp
        } else {
            MouseButton::WheelDown
        }
    } else {
        match code & 0b11 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => return None,
        }
    };

    let mut mods = Modifiers::NONE;
    if code & 4 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if code & 8 != 0 {
        mods |= Modifiers::ALT;
    }
    if code & 16 != 0 {
        mods |= Modifiers::CTRL;
    }

    // Wheel reports never get a release; the press terminator is authoritative.
    let pressed = final_byte == b'M';

    Some(Event::Mouse(MouseEvent {
        button,
        x: x.saturating_sub(1),
        y: y.saturating_sub(1),
        pressed,
        modifiers: mods,
    }))
}
