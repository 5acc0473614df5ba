//! CLI error handling.

use std::io;
use std::path::PathBuf;

use brofetch_config::{ConfigError, EnvError};
use brofetch_http::ClientError;
use thiserror::Error;

use crate::Exit;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
    },

    /// The request went out but ended in a client or server error.
    #[error("{method} {url} ended with status {status} ({message})")]
    Network {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("{message}")]
    Input { message: String },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit(&self) -> Exit {
        match self {
            Self::Config { .. } => Exit::ConfigError,
            Self::Network { .. } => Exit::NetworkError,
            Self::Io { .. } | Self::Input { .. } | Self::Client(_) | Self::Other(_) => {
                Exit::GeneralError
            }
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    pub fn io_with_path(message: impl Into<String>, source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            message: message.into(),
            source,
            path: Some(path.into()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config {
            message: format!("configuration error: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

impl From<EnvError> for CliError {
    fn from(e: EnvError) -> Self {
        Self::Config {
            message: format!("environment error: {e}"),
            source: Some(Box::new(e)),
        }
    }
}
