//! Frame staging buffer
//!
//! A frame is assembled here in full and then handed to the output device in
//! a single write, so the terminal never shows a half-drawn screen.

use std::io::{self, Write};
use tracing::debug;

/// Default staging capacity; a full 80x24 frame fits comfortably
const DEFAULT_CAPACITY: usize = 4096;

/// Append-only byte accumulator for one frame
#[derive(Debug, Default)]
pub struct AppendBuffer {
    data: Vec<u8>,
}

impl AppendBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Copy `bytes` to the end of the buffer.
    ///
    /// If the buffer cannot grow, the bytes are dropped and the frame goes
    /// out without them.
    pub fn append(&mut self, bytes: &[u8]) {
        if let Err(e) = self.data.try_reserve(bytes.len()) {
            debug!("Dropping {} bytes from frame: {}", bytes.len(), e);
            return;
        }
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[allow(dead_code)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Hand the whole frame to `out` in one write and discard the buffer.
    pub fn flush_to<W: Write>(self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.data)?;
        out.flush()
    }
}

/// Lets crossterm commands be queued straight into the frame.
impl Write for AppendBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
