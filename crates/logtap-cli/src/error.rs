//! CLI error types.

use thiserror::Error;

use logtap_client::ClientError;
use logtap_output::UnknownFormatError;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration (missing credentials, bad URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown output format name.
    #[error(transparent)]
    Format(#[from] UnknownFormatError),

    /// Failure reported by the query or tail engine.
    #[error(transparent)]
    Client(#[from] ClientError),
}
