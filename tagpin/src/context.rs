//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values (`--config`, or the user config file if present)
//! 3. Environment variables (`TAGPIN_*`)
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use crate::format::{self, ColorChoice, OutputFormatter};
use libtagpin::Config;
use std::path::{Path, PathBuf};

/// How much the CLI logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl VerbosityLevel {
    /// Maps the `-v` count to a level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// The `tracing` filter used when `RUST_LOG` is unset.
    pub fn log_directive(self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Path of the user config file: `~/.config/tagpin/config.yaml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagpin").join("config.yaml"))
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    pub color: ColorChoice,
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    ///
    /// An explicit `config_path` must exist. The user config file is only
    /// read when present.
    pub fn build(
        config_path: Option<&Path>,
        color: ColorChoice,
        verbosity: VerbosityLevel,
    ) -> libtagpin::Result<Self> {
        let path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.is_file()),
        };
        if let Some(path) = &path {
            tracing::debug!(path = %path.display(), "loading configuration");
        }

        let config = Config::load(path.as_deref())?;

        Ok(Self {
            config,
            color,
            verbosity,
        })
    }

    /// Formatter for operator-facing messages.
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        format::create_formatter(self.color)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
