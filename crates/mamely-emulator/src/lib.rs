//! Emulator launching for MAMEly
//!
//! Runs the platform's emulator synchronously with the per-game flags and
//! the ROM file, returning once the emulator exits.

mod launcher;

pub use launcher::{EmulatorLauncher, LaunchRequest, LaunchResult};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("Emulator not found: {0}")]
    EmulatorNotFound(String),

    #[error("ROM not found: {0}")]
    RomNotFound(PathBuf),

    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmulatorError::RomNotFound(PathBuf::from("/roms/pacman.zip"));
        assert!(err.to_string().contains("pacman.zip"));

        let err = EmulatorError::EmulatorNotFound("mame".to_string());
        assert!(err.to_string().contains("mame"));
    }
}
