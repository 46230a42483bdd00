//! Raw byte input from the terminal
//!
//! Reads are bounded by the termios read timeout set in raw mode, so a read
//! either yields one byte or comes back empty-handed after the timeout.

use std::collections::VecDeque;
use std::io::{self, Read};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("read: {0}")]
    Read(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, InputError>;

/// A source of single input bytes.
///
/// `Ok(None)` means the read timed out with nothing available; callers treat
/// it as "no key yet" and retry.
pub trait ByteSource {
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// Standard input of a terminal in raw mode
#[derive(Debug, Default)]
pub struct StdinSource;

impl StdinSource {
    pub fn new() -> Self {
        Self
    }
}

impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match io::stdin().read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            // Some platforms report an empty timed read as EAGAIN
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                Ok(None)
            }
            Err(e) => Err(InputError::Read(e)),
        }
    }
}

/// Scripted input; an empty queue behaves like a read timeout.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.pop_front())
    }
}
