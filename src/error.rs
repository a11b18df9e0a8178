//! Error types and process exit codes.
//!
//! Local configuration problems and a refused connection share exit code 2.
//! Failures the interpreter classifies itself (remote error, malformed reply)
//! are not errors here; they are reported as an [`Outcome`](crate::Outcome).

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for invalid local configuration.
pub const EXIT_CONFIGURATION: u8 = 2;

/// Exit code for fatal failures that are not configuration problems.
pub const EXIT_FATAL: u8 = 1;

/// Errors raised while compiling, sending, or decoding a request.
#[derive(Debug, Error)]
pub enum JlcliError {
    /// The caller's input cannot be turned into a request.
    #[error("{0}")]
    Configuration(String),

    /// Failed to connect to the worker socket.
    #[error("Connection to {} failed: {source}", .path.display())]
    ConnectionFailed {
        /// Socket path that was dialed
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the request or reading the reply failed.
    #[error("Transport error: {0:#}")]
    Transport(anyhow::Error),

    /// The reply is not valid JSON.
    #[error("Protocol error: {0}")]
    Protocol(#[source] serde_json::Error),

    /// Writing to the local standard streams failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JlcliError {
    /// Shorthand for [`JlcliError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        JlcliError::Configuration(message.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            JlcliError::Configuration(_) | JlcliError::ConnectionFailed { .. } => {
                EXIT_CONFIGURATION
            }
            JlcliError::Transport(_) | JlcliError::Protocol(_) | JlcliError::Io(_) => EXIT_FATAL,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = JlcliError> = std::result::Result<T, E>;
