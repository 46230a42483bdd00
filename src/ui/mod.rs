//! Frame output and key input.
//!
//! - **append_buffer**: stages a whole frame for a single write
//! - **keys**: decodes raw bytes and escape sequences into key events
//! - **renderer**: draws placeholder rows, the banner and the cursor
//!
//! # Frame pipeline
//!
//! ```text
//! EditorState ──> Renderer ──> AppendBuffer ──(one write)──> terminal
//! terminal ──> ByteSource ──> KeyDecoder ──> KeyEvent
//! ```

pub mod append_buffer;
pub mod keys;
pub mod renderer;

pub use append_buffer::AppendBuffer;
pub use keys::*;
pub use renderer::Renderer;
