//! Logging init for embedding hosts: file under XDG state dir, or stderr.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to whichever process hosts the console utilities.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,consolekit=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Path of the log file: `~/.local/state/consolekit/consolekit.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("consolekit")?;
    Ok(xdg_dirs.get_state_home().join("consolekit.log"))
}

/// Initialize structured logging to the XDG state log file.
/// On failure (e.g. state dir unwritable) returns Err so the caller can use
/// [`init_logging_stderr`] instead.
pub fn init_logging() -> Result<()> {
    let log_file_path = log_file_path()?;
    let file = open_log_file(&log_file_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!("consolekit logging initialized at {}", log_file_path.display());
    Ok(())
}

/// Opens `path` for appending, creating it and its parent directories.
fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Initialize logging to stderr only. Ignored if a subscriber is already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_under_consolekit_state_dir() {
        if let Ok(path) = log_file_path() {
            assert!(path.ends_with("consolekit.log"));
            assert!(path.to_string_lossy().contains("consolekit"));
        }
    }

    #[test]
    fn log_file_is_created_and_appended() {
        use std::io::Write;
        use tracing_subscriber::fmt::MakeWriter;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("consolekit").join("consolekit.log");

        let writer = Mutex::new(open_log_file(&path).unwrap());
        writeln!(writer.make_writer(), "first").unwrap();
        drop(writer);

        let writer = Mutex::new(open_log_file(&path).unwrap());
        writeln!(writer.make_writer(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn log_file_under_a_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        assert!(open_log_file(&blocker.join("consolekit.log")).is_err());
    }

    #[test]
    fn stderr_init_is_repeatable() {
        init_logging_stderr();
        init_logging_stderr();
        tracing::debug!("stderr logging still usable");
    }
}
