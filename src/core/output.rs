//! Unbuffered terminal output
//!
//! `io::stdout()` is line buffered: a frame containing `\r\n` would reach the
//! terminal as one write up to the last newline and another for the tail.
//! [`TerminalOutput`] hands each buffer to the file descriptor as it comes,
//! so a staged frame arrives in a single `write(2)`.

use std::io::{self, Write};
use rustix::fd::AsFd;

/// Writes straight to a file descriptor, with no buffering of its own
#[derive(Debug)]
pub struct TerminalOutput<F> {
    fd: F,
}

impl TerminalOutput<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<F: AsFd> TerminalOutput<F> {
    pub fn new(fd: F) -> Self {
        Self { fd }
    }
}

impl<F: AsFd> Write for TerminalOutput<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Short writes and EINTR are retried by `write_all`
        Ok(rustix::io::write(&self.fd, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixDatagram;

    use crate::core::geometry::Viewport;
    use crate::editor::EditorState;
    use crate::ui::Renderer;

    /// Each write on a datagram socket arrives as its own message
    fn writes_received(peer: &UnixDatagram) -> Vec<Vec<u8>> {
        peer.set_nonblocking(true).unwrap();
        let mut writes = Vec::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            match peer.recv(&mut buf) {
                Ok(n) => writes.push(buf[..n].to_vec()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return writes,
                Err(e) => panic!("recv: {}", e),
            }
        }
    }

    #[test]
    fn test_frame_reaches_device_in_one_write() {
        let (device, peer) = UnixDatagram::pair().unwrap();
        let mut out = TerminalOutput::new(device);

        let renderer = Renderer::default();
        let state = EditorState::new(Viewport::new(24, 80));
        renderer.draw(&state, &mut out).unwrap();

        let writes = writes_received(&peer);
        assert_eq!(writes.len(), 1);
        let expected = renderer.build_frame(&state).unwrap();
        assert_eq!(writes[0].len(), expected.len());
        assert!(writes[0].ends_with(b"\x1b[1;1H\x1b[?25h"));
        assert_eq!(writes[0].windows(2).filter(|w| *w == b"\r\n").count(), 23);
    }

    #[test]
    fn test_line_buffering_would_split_the_frame() {
        let (device, peer) = UnixDatagram::pair().unwrap();
        let mut out = io::LineWriter::new(TerminalOutput::new(device));

        let state = EditorState::new(Viewport::new(24, 80));
        Renderer::default().draw(&state, &mut out).unwrap();

        assert_eq!(writes_received(&peer).len(), 2);
    }

    #[test]
    fn test_flush_is_a_no_op() {
        let (device, peer) = UnixDatagram::pair().unwrap();
        let mut out = TerminalOutput::new(device);
        out.flush().unwrap();
        assert!(writes_received(&peer).is_empty());
    }
}
