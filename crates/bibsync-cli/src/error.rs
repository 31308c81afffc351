//! Error type for the bibsync command line front end.

use bibsync::error::BibsyncError;
use thiserror::Error;

/// Result alias for the CLI.
pub type Result<T> = core::result::Result<T, CliError>;

/// Errors that end a CLI run.
#[derive(Error, Debug)]
pub enum CliError {
  /// Failure reported by the library.
  #[error(transparent)]
  Bibsync(#[from] BibsyncError),

  /// A configuration file given with `--config` does not exist.
  #[error("Configuration file not found: {0}")]
  MissingConfig(String),
}
