//! Raw mode with guaranteed restoration
//!
//! [`TerminalMode`] captures the terminal's line-discipline settings, switches
//! to raw mode, and puts the captured settings back exactly once: either when
//! the owner calls [`TerminalMode::restore`] or when the guard is dropped on
//! any other exit path (early return, error, panic unwind).
//!
//! In raw mode input arrives byte by byte without echo, line buffering,
//! signal keys or CR/NL translation, output is not post-processed, and a read
//! returns as soon as one byte is available or after the read timeout.

use std::io;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("tcgetattr: {0}")]
    Capture(#[source] io::Error),

    #[error("tcsetattr: {0}")]
    Apply(#[source] io::Error),

    #[error("tcsetattr (restore): {0}")]
    Restore(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, TerminalError>;

/// Inter-byte read timeout, in termios deciseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeout(u8);

impl ReadTimeout {
    /// Round up to whole deciseconds, clamped to `1..=255`.
    pub fn from_duration(timeout: Duration) -> Self {
        let tenths = (timeout.as_millis() + 99) / 100;
        Self(tenths.clamp(1, u128::from(u8::MAX)) as u8)
    }

    pub fn deciseconds(self) -> u8 {
        self.0
    }
}

impl Default for ReadTimeout {
    fn default() -> Self {
        Self(1)
    }
}

/// Access to a terminal's line-discipline settings
pub trait LineDiscipline {
    type Settings: Clone;

    fn get(&self) -> io::Result<Self::Settings>;

    fn set(&self, settings: &Self::Settings) -> io::Result<()>;

    /// Derive the raw-mode configuration from the captured one.
    fn make_raw(original: &Self::Settings, timeout: ReadTimeout) -> Self::Settings;
}

/// Scoped raw-mode guard
pub struct TerminalMode<D: LineDiscipline> {
    device: D,
    original: D::Settings,
    restored: bool,
}

impl<D: LineDiscipline> TerminalMode<D> {
    /// Capture the current settings and switch the device into raw mode.
    pub fn enter(device: D, timeout: ReadTimeout) -> Result<Self> {
        let original = device.get().map_err(TerminalError::Capture)?;

        // Armed before applying, so a half-applied change is still undone
        let mode = Self {
            device,
            original,
            restored: false,
        };

        let raw = D::make_raw(&mode.original, timeout);
        mode.device.set(&raw).map_err(TerminalError::Apply)?;

        info!("Raw mode enabled (read timeout {}ds)", timeout.deciseconds());
        Ok(mode)
    }

    /// Re-apply the captured settings. Only the first call touches the device.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        self.device
            .set(&self.original)
            .map_err(TerminalError::Restore)?;
        debug!("Terminal settings restored");
        Ok(())
    }

    #[allow(dead_code)]
    pub fn original(&self) -> &D::Settings {
        &self.original
    }
}

impl<D: LineDiscipline> Drop for TerminalMode<D> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            // The shell is left in raw mode; say so where the user can see it
            error!("Failed to restore terminal: {}", e);
            eprintln!("kilo: {}", e);
        }
    }
}

#[cfg(unix)]
pub use self::tty::Tty;

#[cfg(unix)]
mod tty {
    use std::io;

    use rustix::termios::{
        self, ControlModes, InputModes, LocalModes, OptionalActions, OutputModes,
        SpecialCodeIndex, Termios,
    };

    use super::{LineDiscipline, ReadTimeout};

    /// The controlling terminal on standard input
    #[derive(Debug, Default)]
    pub struct Tty;

    impl LineDiscipline for Tty {
        type Settings = Termios;

        fn get(&self) -> io::Result<Termios> {
            Ok(termios::tcgetattr(io::stdin())?)
        }

        fn set(&self, settings: &Termios) -> io::Result<()> {
            // Flush: discard input typed while the mode was switching
            Ok(termios::tcsetattr(io::stdin(), OptionalActions::Flush, settings)?)
        }

        fn make_raw(original: &Termios, timeout: ReadTimeout) -> Termios {
            let mut raw = original.clone();
            raw.input_modes.remove(
                InputModes::BRKINT
                    | InputModes::ICRNL
                    | InputModes::INPCK
                    | InputModes::ISTRIP
                    | InputModes::IXON,
            );
            raw.output_modes.remove(OutputModes::OPOST);
            raw.control_modes.insert(ControlModes::CS8);
            raw.local_modes.remove(
                LocalModes::ECHO | LocalModes::ICANON | LocalModes::IEXTEN | LocalModes::ISIG,
            );
            raw.special_codes[SpecialCodeIndex::VMIN] = 0;
            raw.special_codes[SpecialCodeIndex::VTIME] = timeout.deciseconds();
            raw
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeTty, COOKED};
    use super::*;

    #[test]
    fn test_enter_applies_raw_settings() {
        let tty = FakeTty::cooked();
        let mode = TerminalMode::enter(tty.clone(), ReadTimeout::default()).unwrap();

        assert_eq!(mode.original(), &COOKED);
        let raw = tty.current();
        assert!(!raw.echo);
        assert!(!raw.canonical);
        assert_eq!(raw.vmin, 0);
        assert_eq!(raw.vtime, 1);
    }

    #[test]
    fn test_drop_restores_captured_settings() {
        let tty = FakeTty::cooked();
        {
            let _mode = TerminalMode::enter(tty.clone(), ReadTimeout::default()).unwrap();
            assert_ne!(tty.current(), COOKED);
        }
        assert_eq!(tty.current(), COOKED);
        assert_eq!(tty.applied.borrow().len(), 2);
    }

    #[test]
    fn test_restore_happens_once() {
        let tty = FakeTty::cooked();
        let mut mode = TerminalMode::enter(tty.clone(), ReadTimeout::default()).unwrap();

        mode.restore().unwrap();
        mode.restore().unwrap();
        drop(mode);

        // One raw apply, one restore
        let applied = tty.applied.borrow();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[1], COOKED);
        assert_eq!(tty.current(), COOKED);
    }

    #[test]
    fn test_capture_failure_is_reported() {
        let tty = FakeTty {
            fail_get: true,
            ..FakeTty::cooked()
        };
        let err = TerminalMode::enter(tty.clone(), ReadTimeout::default())
            .err()
            .unwrap();

        assert!(matches!(err, TerminalError::Capture(_)));
        assert_eq!(err.to_string(), "tcgetattr: not a tty");
        assert!(tty.applied.borrow().is_empty());
    }

    #[test]
    fn test_apply_failure_is_reported() {
        let tty = FakeTty::cooked();
        tty.fail_set_after.set(Some(0));
        let err = TerminalMode::enter(tty.clone(), ReadTimeout::default())
            .err()
            .unwrap();

        assert!(matches!(err, TerminalError::Apply(_)));
        assert_eq!(tty.current(), COOKED);
    }

    #[test]
    fn test_restore_failure_is_surfaced() {
        let tty = FakeTty::cooked();
        let mut mode = TerminalMode::enter(tty.clone(), ReadTimeout::default()).unwrap();
        tty.fail_set_after.set(Some(1));

        let err = mode.restore().unwrap_err();
        assert!(matches!(err, TerminalError::Restore(_)));
        // Not retried on drop
        drop(mode);
        assert_eq!(tty.applied.borrow().len(), 1);
    }

    #[test]
    fn test_read_timeout_rounding() {
        assert_eq!(ReadTimeout::from_duration(Duration::from_millis(100)).deciseconds(), 1);
        assert_eq!(ReadTimeout::from_duration(Duration::from_millis(0)).deciseconds(), 1);
        assert_eq!(ReadTimeout::from_duration(Duration::from_millis(250)).deciseconds(), 3);
        assert_eq!(ReadTimeout::from_duration(Duration::from_secs(60)).deciseconds(), 255);
    }
}
