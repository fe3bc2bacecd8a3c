//! # logtap-cli
//!
//! Command-line interface for the logtap client engine.
//!
//! Provides two commands over a remote log backend:
//! - `query` — one-shot retrieval of a bounded time range
//! - `tail` — a live subscription delivering records as they arrive
//!
//! This layer is deliberately thin: argument parsing, credential
//! resolution, and sink construction. All protocol, ordering, and
//! retry behavior lives in `logtap-client`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod credentials;
pub mod error;

pub use cli::{Cli, Commands, QueryArgs, TailArgs};
pub use credentials::EnvCredentials;
pub use error::CliError;
