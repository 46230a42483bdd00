//! Terminal plumbing.
//!
//! - **terminal**: raw-mode guard over the terminal's line discipline
//! - **input**: timed single-byte reads from the terminal
//! - **geometry**: viewport size via `TIOCGWINSZ` or a cursor-position probe
//! - **output**: unbuffered writes to the terminal, one per frame
//!
//! # Architecture
//!
//! ```text
//! TerminalMode (raw mode, restored on drop)
//! ├── ByteSource   (one byte or a timeout per read)
//! ├── Viewport     (rows x cols, queried once at startup)
//! └── TerminalOutput (frames straight to the fd)
//! ```

pub mod geometry;
pub mod input;
#[cfg(unix)]
pub mod output;
pub mod terminal;
