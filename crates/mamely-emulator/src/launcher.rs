//! Emulator process launcher

use crate::EmulatorError;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// What to run for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Emulator program, a path or a name looked up on `PATH`
    pub executable: String,

    /// Extra command-line flags, whitespace separated
    pub flags: String,

    /// ROM file, passed as the last argument
    pub rom_path: PathBuf,
}

impl LaunchRequest {
    pub fn new(executable: impl Into<String>, rom_path: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            flags: String::new(),
            rom_path: rom_path.into(),
        }
    }

    /// Set the per-game flags
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Arguments after the program name
    pub fn args(&self) -> Vec<&std::ffi::OsStr> {
        let mut args: Vec<&std::ffi::OsStr> =
            self.flags.split_whitespace().map(std::ffi::OsStr::new).collect();
        args.push(self.rom_path.as_os_str());
        args
    }
}

/// Outcome of a finished emulator run
#[derive(Debug)]
pub struct LaunchResult {
    /// Exit status of the emulator
    pub status: ExitStatus,

    /// Wall-clock time the emulator ran
    pub duration: Duration,

    /// Program that was run
    pub program: PathBuf,
}

/// Runs emulators
#[derive(Debug, Default)]
pub struct EmulatorLauncher;

impl EmulatorLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the emulator program. Bare names are looked up on `PATH`.
    pub fn resolve(&self, executable: &str) -> Result<PathBuf, EmulatorError> {
        if executable.trim().is_empty() {
            return Err(EmulatorError::EmulatorNotFound(
                "no emulator configured".to_string(),
            ));
        }

        let path = Path::new(executable);
        if path.components().count() > 1 {
            return if path.exists() {
                Ok(path.to_path_buf())
            } else {
                Err(EmulatorError::EmulatorNotFound(executable.to_string()))
            };
        }

        which::which(executable).map_err(|_| EmulatorError::EmulatorNotFound(executable.to_string()))
    }

    /// Build the command for a request without running it
    pub fn command(&self, request: &LaunchRequest) -> Result<Command, EmulatorError> {
        let program = self.resolve(&request.executable)?;
        let mut cmd = Command::new(program);
        cmd.args(request.args());
        Ok(cmd)
    }

    /// Run the emulator and wait for it to exit
    pub fn launch(&self, request: &LaunchRequest) -> Result<LaunchResult, EmulatorError> {
        if !request.rom_path.exists() {
            return Err(EmulatorError::RomNotFound(request.rom_path.clone()));
        }

        let mut cmd = self.command(request)?;
        cmd.stdin(Stdio::null());

        let program = PathBuf::from(cmd.get_program());
        tracing::info!(
            "Launching {} with {} {}",
            request.rom_path.display(),
            program.display(),
            request.flags
        );

        let started = Instant::now();
        let status = cmd
            .status()
            .map_err(|e| EmulatorError::LaunchFailed(format!("Failed to run {}: {}", program.display(), e)))?;
        let duration = started.elapsed();

        if status.success() {
            tracing::info!("Emulator exited after {:.1}s", duration.as_secs_f32());
        } else {
            tracing::warn!("Emulator exited with {}", status);
        }

        Ok(LaunchResult {
            status,
            duration,
            program,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_split_flags_and_keep_rom_path_whole() {
        let request = LaunchRequest::new("mame", "/roms/my games/pacman.zip")
            .with_flags("  -joy   -nowindow ");

        let args: Vec<String> = request
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["-joy", "-nowindow", "/roms/my games/pacman.zip"]);
    }

    #[test]
    fn test_args_without_flags() {
        let request = LaunchRequest::new("mame", "/roms/pacman.zip");
        assert_eq!(request.args().len(), 1);
    }

    #[test]
    fn test_resolve_empty_executable() {
        let launcher = EmulatorLauncher::new();
        assert!(matches!(
            launcher.resolve(""),
            Err(EmulatorError::EmulatorNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_missing_path() {
        let launcher = EmulatorLauncher::new();
        assert!(matches!(
            launcher.resolve("/nonexistent/bin/mame"),
            Err(EmulatorError::EmulatorNotFound(_))
        ));
    }
}
