//! Key decoding
//!
//! Turns the raw byte stream into [`KeyEvent`]s. Plain bytes map to
//! themselves; an escape byte starts a small state machine recognizing the
//! VT100/xterm sequences for arrows and navigation keys:
//!
//! ```text
//! ESC [ A|B|C|D|H|F        arrows, Home, End
//! ESC [ 1|3|4|5|6|7|8 ~    Home, Delete, End, PageUp, PageDown, Home, End
//! ESC O H|F                Home, End
//! ```
//!
//! A lone ESC is told apart from the start of a sequence only by timing: if
//! nothing follows within the read timeout it is the Escape key. Anything
//! unrecognized or cut short also decodes as a bare Escape.

use tracing::trace;

use crate::core::input::{ByteSource, Result};

const ESC: u8 = 0x1b;

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A literal byte, including control characters
    Char(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Escape,
}

/// The byte produced by Control plus `key`
pub const fn ctrl_key(key: u8) -> u8 {
    key & 0x1f
}

/// Final bytes of `ESC [ <letter>`
const CSI_FINAL: [(u8, KeyEvent); 6] = [
    (b'A', KeyEvent::ArrowUp),
    (b'B', KeyEvent::ArrowDown),
    (b'C', KeyEvent::ArrowRight),
    (b'D', KeyEvent::ArrowLeft),
    (b'H', KeyEvent::Home),
    (b'F', KeyEvent::End),
];

/// Parameters of `ESC [ <digit> ~`
const CSI_TILDE: [(u8, KeyEvent); 7] = [
    (b'1', KeyEvent::Home),
    (b'3', KeyEvent::Delete),
    (b'4', KeyEvent::End),
    (b'5', KeyEvent::PageUp),
    (b'6', KeyEvent::PageDown),
    (b'7', KeyEvent::Home),
    (b'8', KeyEvent::End),
];

/// Final bytes of `ESC O <letter>`
const SS3_FINAL: [(u8, KeyEvent); 2] = [(b'H', KeyEvent::Home), (b'F', KeyEvent::End)];

fn lookup(table: &[(u8, KeyEvent)], byte: u8) -> KeyEvent {
    table
        .iter()
        .find(|(b, _)| *b == byte)
        .map_or(KeyEvent::Escape, |(_, key)| *key)
}

/// Position inside an escape sequence, after the initial ESC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    /// Saw ESC
    Introducer,
    /// Saw ESC [
    Csi,
    /// Saw ESC [ <digit>
    CsiParam(u8),
    /// Saw ESC O
    Ss3,
}

enum Step {
    Next(EscapeState),
    Emit(KeyEvent),
}

impl EscapeState {
    fn advance(self, byte: u8) -> Step {
        match (self, byte) {
            (EscapeState::Introducer, b'[') => Step::Next(EscapeState::Csi),
            (EscapeState::Introducer, b'O') => Step::Next(EscapeState::Ss3),
            (EscapeState::Csi, b'0'..=b'9') => Step::Next(EscapeState::CsiParam(byte)),
            (EscapeState::Csi, _) => Step::Emit(lookup(&CSI_FINAL, byte)),
            (EscapeState::CsiParam(digit), b'~') => Step::Emit(lookup(&CSI_TILDE, digit)),
            (EscapeState::Ss3, _) => Step::Emit(lookup(&SS3_FINAL, byte)),
            _ => Step::Emit(KeyEvent::Escape),
        }
    }
}

/// Reads one key at a time from a [`ByteSource`]
pub struct KeyDecoder<S> {
    source: S,
}

impl<S: ByteSource> KeyDecoder<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Block for the next key. `Ok(None)` means the read timed out idle.
    pub fn next_key(&mut self) -> Result<Option<KeyEvent>> {
        let key = match self.source.read_byte()? {
            None => return Ok(None),
            Some(ESC) => self.read_escape()?,
            Some(byte) => KeyEvent::Char(byte),
        };
        trace!("Key {:?}", key);
        Ok(Some(key))
    }

    fn read_escape(&mut self) -> Result<KeyEvent> {
        let mut state = EscapeState::Introducer;
        loop {
            let Some(byte) = self.source.read_byte()? else {
                return Ok(KeyEvent::Escape);
            };
            match state.advance(byte) {
                Step::Next(next) => state = next,
                Step::Emit(key) => return Ok(key),
            }
        }
    }
}
