//! Top-level error types and their process exit codes.

use std::{io, path::PathBuf, process::ExitCode};

use thiserror::Error;

use crate::{color::ColorError, device::DeviceError, gradient::GradientError};

/// Errors raised while loading the configuration or resolving the selected mode.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("could not find config file {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The configuration file exists but could not be read.
    #[error("failed to read config file {}", .path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The configuration is not valid YAML or misses required keys.
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
    /// The requested mode is not declared under `modes`.
    #[error("mode `{mode}` not specified in config (available: {})", .available.join(", "))]
    ModeNotFound {
        /// Requested mode.
        mode: String,
        /// Modes declared in the configuration.
        available: Vec<String>,
    },
    /// The mode is declared but its definition is unusable.
    #[error("invalid definition for mode `{mode}`: {reason}")]
    InvalidMode {
        /// Offending mode.
        mode: String,
        /// Human readable reason.
        reason: String,
    },
    /// The linear gradient of the mode could not be built.
    #[error("invalid gradient for mode `{mode}`")]
    InvalidGradient {
        /// Offending mode.
        mode: String,
        /// Underlying gradient error.
        #[source]
        source: GradientError,
    },
    /// An entry of the `colors` table is not a valid `R,G,B` string.
    #[error("invalid color `{name}` in config")]
    InvalidColor {
        /// Name of the offending entry.
        name: String,
        /// Underlying parse error.
        #[source]
        source: ColorError,
    },
}

impl ConfigError {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConfigError::NotFound { .. } | ConfigError::Read { .. } | ConfigError::Parse { .. } => 1,
            ConfigError::ModeNotFound { .. } => 2,
            ConfigError::InvalidMode { .. }
            | ConfigError::InvalidGradient { .. }
            | ConfigError::InvalidColor { .. } => 3,
        }
    }
}

/// Fatal errors ending the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Startup failed because of the configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The light could not be reached or rejected a request.
    #[error("device error")]
    Device(#[from] DeviceError),
}

impl AppError {
    /// Numeric status reported for this failure.
    pub fn code(&self) -> u8 {
        match self {
            AppError::Config(err) => err.exit_code(),
            AppError::Device(_) => 4,
        }
    }

    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
