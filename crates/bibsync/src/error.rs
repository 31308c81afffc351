//! Error types for the bibsync library.
//!
//! A single error enum covers every failure mode of a sync run:
//! - Transport failures while listing or downloading from the remote store
//! - Malformed archives
//! - Unreadable PDF documents
//! - Filesystem operations on extracted documents and the citation file
//! - Configuration loading
//!
//! Which of these abort a run is decided by the callers: per-document failures are logged and
//! skipped by [`crate::pipeline`], per-archive failures are recorded by [`crate::sync`], and only
//! a failed listing propagates out of a whole run.
//!
//! # Examples
//!
//! ```
//! use bibsync::{archive, error::BibsyncError};
//!
//! let dir = std::env::temp_dir().join("bibsync-doc-error");
//! match archive::extract(b"definitely not a zip", &dir) {
//!   Err(BibsyncError::ArchiveFormat(e)) => println!("Bad archive: {e}"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(_) => println!("Success!"),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`bibsync`](crate) crate.
pub type Result<T> = core::result::Result<T, BibsyncError>;

/// Errors that can occur while syncing archives into a citation file.
#[derive(Error, Debug)]
pub enum BibsyncError {
  /// A network request failed.
  ///
  /// This can occur when:
  /// - The server is unreachable
  /// - The connection drops mid-transfer
  /// - TLS negotiation fails
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The remote store answered with a non-success status.
  ///
  /// The string holds the request that failed and the status the server returned.
  #[error("API error: {0}")]
  ApiError(String),

  /// The WebDAV listing body could not be parsed.
  #[error("Malformed listing response: {0}")]
  Listing(#[from] quick_xml::Error),

  /// A URL could not be built from the configured base and a file name.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// The archive bytes are not a readable ZIP container, or one of its entries is corrupt.
  #[error("Unreadable archive: {0}")]
  ArchiveFormat(#[from] zip::result::ZipError),

  /// An archive entry decompressed to more bytes than the extractor accepts.
  #[error("Archive entry {name} exceeds the {limit} byte limit")]
  EntryTooLarge {
    /// Name of the offending entry inside the archive
    name:  String,
    /// The decompressed-size limit that was hit
    limit: u64,
  },

  /// A PDF document could not be parsed.
  ///
  /// Common causes are truncated or corrupted files and encrypted documents.
  #[error("Unreadable PDF document: {0}")]
  DocumentParse(#[from] lopdf::Error),

  /// A file system operation failed.
  ///
  /// This occurs when:
  /// - Creating the output directory fails
  /// - Writing an extracted document fails
  /// - Reading or writing the citation file fails
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// A configuration file could not be deserialized.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// A configuration value is missing or invalid.
  #[error("{0}")]
  Config(String),
}
