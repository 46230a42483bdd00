//! Terminal geometry
//!
//! The window size comes from a direct `TIOCGWINSZ` query on standard output.
//! Terminals that answer with zero columns (or not at all) are measured by
//! pushing the cursor into the bottom-right corner and asking where it ended
//! up: the terminal replies `ESC [ <row> ; <col> R` on the input stream.

use std::io::{self, Write};
use crossterm::cursor::{MoveDown, MoveRight};
use crossterm::queue;
use thiserror::Error;
use tracing::{debug, warn};

use super::input::{ByteSource, InputError};

/// Cursor position report request (DSR 6)
const REPORT_CURSOR_POSITION: &[u8] = b"\x1b[6n";

/// Longest cursor report accepted before giving up on the terminator
const REPORT_CAP: usize = 31;

/// Distance used to reach the bottom-right corner; terminals clamp it
const FAR_CORNER: u16 = 999;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("cursor position probe: {0}")]
    Probe(#[source] io::Error),

    #[error("cursor position probe: {0}")]
    Input(#[from] InputError),

    #[error("malformed cursor position report {0:?}")]
    MalformedReport(String),

    #[error("terminal reports an empty {rows}x{cols} viewport")]
    EmptyViewport { rows: u16, cols: u16 },
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Visible area available for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub rows: u16,
    pub cols: u16,
}

impl Viewport {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    fn non_empty(self) -> Result<Self> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GeometryError::EmptyViewport {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self)
    }
}

/// Ask the kernel for the window size of the terminal on standard output.
#[cfg(unix)]
pub fn window_size() -> io::Result<Viewport> {
    let ws = rustix::termios::tcgetwinsize(io::stdout())?;
    Ok(Viewport::new(ws.ws_row, ws.ws_col))
}

/// Resolve the viewport from a primary size query, probing when it is unusable.
pub fn query_with<W: Write, S: ByteSource>(
    primary: io::Result<Viewport>,
    out: &mut W,
    input: &mut S,
) -> Result<Viewport> {
    match primary {
        Ok(viewport) if viewport.rows > 0 && viewport.cols > 0 => {
            debug!("Window size {}x{}", viewport.rows, viewport.cols);
            Ok(viewport)
        }
        Ok(viewport) => {
            warn!(
                "Window size query returned {}x{}, probing cursor position",
                viewport.rows, viewport.cols
            );
            probe(out, input)
        }
        Err(e) => {
            warn!("Window size query failed ({}), probing cursor position", e);
            probe(out, input)
        }
    }
}

/// Measure the screen by moving the cursor as far as it goes.
fn probe<W: Write, S: ByteSource>(out: &mut W, input: &mut S) -> Result<Viewport> {
    queue!(out, MoveRight(FAR_CORNER), MoveDown(FAR_CORNER)).map_err(GeometryError::Probe)?;
    out.write_all(REPORT_CURSOR_POSITION)
        .map_err(GeometryError::Probe)?;
    out.flush().map_err(GeometryError::Probe)?;

    let mut report = Vec::with_capacity(REPORT_CAP);
    while report.len() < REPORT_CAP {
        match input.read_byte()? {
            Some(b'R') | None => break,
            Some(byte) => report.push(byte),
        }
    }

    parse_cursor_report(&report)?.non_empty()
}

/// Parse the body of a cursor position report, without the trailing `R`.
pub fn parse_cursor_report(report: &[u8]) -> Result<Viewport> {
    let malformed = || GeometryError::MalformedReport(String::from_utf8_lossy(report).into_owned());

    let body = report.strip_prefix(b"\x1b[").ok_or_else(malformed)?;
    let body = std::str::from_utf8(body).map_err(|_| malformed())?;
    let (rows, cols) = body.split_once(';').ok_or_else(malformed)?;

    let rows = rows.parse::<u16>().map_err(|_| malformed())?;
    let cols = cols.parse::<u16>().map_err(|_| malformed())?;
    Ok(Viewport::new(rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn reply(bytes: &[u8]) -> VecDeque<u8> {
        bytes.iter().copied().collect()
    }

    #[test]
    fn test_primary_size_is_used() {
        let mut out = Vec::new();
        let mut input = reply(b"");
        let viewport = query_with(Ok(Viewport::new(24, 80)), &mut out, &mut input).unwrap();

        assert_eq!(viewport, Viewport::new(24, 80));
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_columns_falls_back_to_probe() {
        let mut out = Vec::new();
        let mut input = reply(b"\x1b[50;132R");
        let viewport = query_with(Ok(Viewport::new(24, 0)), &mut out, &mut input).unwrap();

        assert_eq!(viewport, Viewport::new(50, 132));
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n".to_vec());
    }

    #[test]
    fn test_query_failure_falls_back_to_probe() {
        let mut out = Vec::new();
        let mut input = reply(b"\x1b[24;80R");
        let primary = Err(io::Error::new(io::ErrorKind::Other, "ENOTTY"));

        assert_eq!(
            query_with(primary, &mut out, &mut input).unwrap(),
            Viewport::new(24, 80)
        );
    }

    #[test]
    fn test_probe_stops_at_terminator() {
        let mut out = Vec::new();
        let mut input = reply(b"\x1b[10;20Rleftover");
        query_with(Ok(Viewport::new(0, 0)), &mut out, &mut input).unwrap();

        assert_eq!(input.iter().copied().collect::<Vec<_>>(), b"leftover".to_vec());
    }

    #[test]
    fn test_probe_without_reply_fails() {
        let mut out = Vec::new();
        let mut input = reply(b"");
        let err = query_with(Ok(Viewport::new(0, 0)), &mut out, &mut input).unwrap_err();

        assert!(matches!(err, GeometryError::MalformedReport(_)));
    }

    #[test]
    fn test_probe_rejects_zero_sized_reply() {
        let mut out = Vec::new();
        let mut input = reply(b"\x1b[0;80R");
        let err = query_with(Ok(Viewport::new(0, 0)), &mut out, &mut input).unwrap_err();

        assert!(matches!(err, GeometryError::EmptyViewport { rows: 0, cols: 80 }));
    }

    #[test]
    fn test_probe_caps_runaway_reply() {
        let mut out = Vec::new();
        let mut noise = b"\x1b[".to_vec();
        noise.extend(std::iter::repeat(b'9').take(100));
        let mut input = reply(&noise);

        let err = query_with(Ok(Viewport::new(0, 0)), &mut out, &mut input).unwrap_err();
        assert!(matches!(err, GeometryError::MalformedReport(_)));
        assert_eq!(input.len(), 100 + 2 - REPORT_CAP);
    }

    #[test]
    fn test_parse_cursor_report() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80").unwrap(), Viewport::new(24, 80));
        assert!(parse_cursor_report(b"[24;80").is_err());
        assert!(parse_cursor_report(b"\x1b[24").is_err());
        assert!(parse_cursor_report(b"\x1b[24;x").is_err());
        assert!(parse_cursor_report(b"\x1b[;80").is_err());
    }
}
