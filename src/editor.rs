//! Editor state and main loop
//!
//! [`EditorState`] holds the cursor and the viewport it is confined to.
//! [`Editor`] runs the render, read, dispatch cycle until Control+Q.

use std::io::{self, Write};
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::geometry::Viewport;
use crate::core::input::{ByteSource, InputError};
use crate::ui::{ctrl_key, KeyDecoder, KeyEvent, Renderer};

/// Quits the editor
pub const QUIT_KEY: u8 = ctrl_key(b'q');

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("write: {0}")]
    Output(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;

/// Cursor position within the viewport.
///
/// `cx < cols` and `cy < rows` hold for the life of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorState {
    cx: u16,
    cy: u16,
    rows: u16,
    cols: u16,
}

impl EditorState {
    /// Start at the top-left corner. The viewport must be non-empty.
    pub fn new(viewport: Viewport) -> Self {
        debug_assert!(viewport.rows > 0 && viewport.cols > 0);
        Self {
            cx: 0,
            cy: 0,
            rows: viewport.rows.max(1),
            cols: viewport.cols.max(1),
        }
    }

    pub fn cx(&self) -> u16 {
        self.cx
    }

    pub fn cy(&self) -> u16 {
        self.cy
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Move the cursor for a navigation key. Other keys leave it alone.
    pub fn apply(&mut self, key: KeyEvent) {
        match key {
            KeyEvent::ArrowLeft => self.cx = self.cx.saturating_sub(1),
            KeyEvent::ArrowRight => {
                if self.cx + 1 < self.cols {
                    self.cx += 1;
                }
            }
            KeyEvent::ArrowUp => self.cy = self.cy.saturating_sub(1),
            KeyEvent::ArrowDown => {
                if self.cy + 1 < self.rows {
                    self.cy += 1;
                }
            }
            KeyEvent::Home => self.cx = 0,
            KeyEvent::End => self.cx = self.cols - 1,
            // No scroll offset yet: a page is `rows` single steps
            KeyEvent::PageUp | KeyEvent::PageDown => {
                let step = if key == KeyEvent::PageUp {
                    KeyEvent::ArrowUp
                } else {
                    KeyEvent::ArrowDown
                };
                for _ in 0..self.rows {
                    self.apply(step);
                }
            }
            KeyEvent::Char(_) | KeyEvent::Delete | KeyEvent::Escape => {}
        }
    }
}

/// What the loop does after one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The render, read, dispatch loop
pub struct Editor<S, W> {
    state: EditorState,
    keys: KeyDecoder<S>,
    renderer: Renderer,
    out: W,
}

impl<S: ByteSource, W: Write> Editor<S, W> {
    pub fn new(viewport: Viewport, input: S, out: W, renderer: Renderer) -> Self {
        Self {
            state: EditorState::new(viewport),
            keys: KeyDecoder::new(input),
            renderer,
            out,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Draw a frame, then wait for and handle at most one key.
    pub fn step(&mut self) -> Result<Flow> {
        self.renderer
            .draw(&self.state, &mut self.out)
            .map_err(EditorError::Output)?;

        // A timed-out read just means another frame
        let Some(key) = self.keys.next_key()? else {
            return Ok(Flow::Continue);
        };

        if key == KeyEvent::Char(QUIT_KEY) {
            return Ok(Flow::Quit);
        }

        self.state.apply(key);
        debug!("{:?} -> cursor ({}, {})", key, self.state.cx, self.state.cy);
        Ok(Flow::Continue)
    }

    /// Run until the quit key, leaving a cleared screen behind.
    pub fn run(&mut self) -> Result<()> {
        info!(
            "Editor running on a {}x{} viewport",
            self.state.rows, self.state.cols
        );
        while self.step()? == Flow::Continue {}

        info!("Quit requested");
        clear_screen(&mut self.out).map_err(EditorError::Output)
    }
}

/// Clear the whole screen and home the cursor.
pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    out.flush()
}
