//! Frame renderer
//!
//! Draws the viewport into an [`AppendBuffer`] and flushes it in one write:
//!
//! ```text
//! hide cursor, home
//! ~<clear-eol>\r\n          one placeholder row per line
//! ~     banner<clear-eol>\r\n   at rows/3
//! ~<clear-eol>              no newline after the last row
//! move cursor to (cy+1, cx+1), show cursor
//! ```

use std::io::{self, Write};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    terminal::{Clear, ClearType},
};
use tracing::trace;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::AppendBuffer;
use crate::config::Config;
use crate::editor::EditorState;

/// Terminal renderer
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Drawn at the start of every row without content
    placeholder: String,
    /// Welcome line, if shown
    banner: Option<String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new("~", Some(Config::default().banner_text()))
    }
}

impl Renderer {
    pub fn new(placeholder: impl Into<String>, banner: Option<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            banner,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let banner = config.show_banner.then(|| config.banner_text());
        Self::new(config.placeholder.clone(), banner)
    }

    /// Stage one complete frame.
    pub fn build_frame(&self, state: &EditorState) -> io::Result<AppendBuffer> {
        let mut ab = AppendBuffer::new();
        queue!(ab, Hide, MoveTo(0, 0))?;

        self.draw_rows(&mut ab, state)?;

        queue!(ab, MoveTo(state.cx(), state.cy()), Show)?;
        Ok(ab)
    }

    /// Draw the frame and hand it to `out` in a single write.
    pub fn draw<W: Write>(&self, state: &EditorState, out: &mut W) -> io::Result<()> {
        let frame = self.build_frame(state)?;
        trace!("Frame {} bytes", frame.len());
        frame.flush_to(out)
    }

    fn draw_rows(&self, ab: &mut AppendBuffer, state: &EditorState) -> io::Result<()> {
        let rows = state.rows();
        let banner_row = rows / 3;

        for y in 0..rows {
            match &self.banner {
                Some(banner) if y == banner_row => {
                    let line = banner_line(banner, &self.placeholder, state.cols());
                    ab.append(line.as_bytes());
                }
                _ => ab.append(self.placeholder.as_bytes()),
            }

            queue!(ab, Clear(ClearType::UntilNewLine))?;
            if y + 1 < rows {
                ab.append(b"\r\n");
            }
        }
        Ok(())
    }
}

/// Lay out the banner centered in `cols` columns.
///
/// The banner is cut to fit. The left padding starts with the placeholder
/// when the placeholder fits inside it.
pub fn banner_line(banner: &str, placeholder: &str, cols: u16) -> String {
    let cols = usize::from(cols);

    let mut width = 0;
    let mut end = 0;
    for (idx, ch) in banner.char_indices() {
        let w = ch.width().unwrap_or(0);
        if width + w > cols {
            break;
        }
        width += w;
        end = idx + ch.len_utf8();
    }
    let text = &banner[..end];

    let mut padding = (cols - width) / 2;
    let mut line = String::with_capacity(cols);
    let placeholder_width = placeholder.width();
    if padding > 0 && placeholder_width <= padding {
        line.push_str(placeholder);
        padding -= placeholder_width;
    }
    line.extend(std::iter::repeat(' ').take(padding));
    line.push_str(text);
    line
}
