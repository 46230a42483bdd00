//! kilo - a minimal screen-oriented text editor
//!
//! kilo puts the terminal into raw mode, draws a full-screen view with a
//! welcome banner, and moves a cursor around it with the arrow and
//! navigation keys. Every frame is staged in memory and written in one go,
//! so the screen never flickers.
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Arrows | Move the cursor |
//! | Home / End | Start / end of the row |
//! | Page Up / Page Down | Top / bottom of the screen |
//! | Ctrl+Q | Quit |
//!
//! The terminal is restored to its original settings on every way out.

mod config;
mod core;
mod editor;
mod ui;

use std::io::{self, Write};
use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{Config, VERSION};
use crate::core::geometry::{self, Viewport};
use crate::core::input::ByteSource;
use crate::core::terminal::{LineDiscipline, ReadTimeout, TerminalMode};
use crate::editor::Editor;
use crate::ui::Renderer;

fn main() {
    let config = Config::load();
    init_logging(&config);
    info!("kilo {} starting...", VERSION);

    if let Err(e) = run(&config) {
        error!("Fatal: {:#}", e);
        let _ = editor::clear_screen(&mut io::stdout());
        eprintln!("kilo: {:#}", e);
        std::process::exit(1);
    }

    info!("kilo exited cleanly");
}

/// Log to `~/.kilo/kilo.log`; the terminal itself belongs to the editor.
fn init_logging(config: &Config) {
    let log_path = Config::dir()
        .map(|dir| dir.join("kilo.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("kilo.log"));

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("KILO_LOG")
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

#[cfg(unix)]
fn run(config: &Config) -> anyhow::Result<()> {
    use crate::core::input::StdinSource;
    use crate::core::output::TerminalOutput;
    use crate::core::terminal::Tty;

    run_with(
        Tty,
        ReadTimeout::from_duration(config.read_timeout()),
        geometry::window_size,
        StdinSource::new(),
        TerminalOutput::stdout(),
        Renderer::from_config(config),
    )
}

#[cfg(not(unix))]
fn run(_config: &Config) -> anyhow::Result<()> {
    anyhow::bail!("kilo needs a POSIX terminal (termios)")
}

/// Enter raw mode, size the viewport and run the editor until it quits.
///
/// The captured terminal settings are back in place when this returns,
/// whichever way it returns.
#[cfg_attr(not(unix), allow(dead_code))]
fn run_with<D, S, W>(
    device: D,
    timeout: ReadTimeout,
    window_size: impl FnOnce() -> io::Result<Viewport>,
    mut input: S,
    mut out: W,
    renderer: Renderer,
) -> anyhow::Result<()>
where
    D: LineDiscipline,
    S: ByteSource,
    W: Write,
{
    let mut mode = TerminalMode::enter(device, timeout).context("entering raw mode")?;

    let viewport = geometry::query_with(window_size(), &mut out, &mut input)
        .context("querying window size")?;
    info!("Viewport {}x{}", viewport.rows, viewport.cols);

    let mut editor = Editor::new(viewport, input, out, renderer);
    editor.run().context("running editor")?;

    mode.restore().context("restoring terminal")?;
    Ok(())
}
