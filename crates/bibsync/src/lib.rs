//! Sync PDF archives from a WebDAV share into a BibTeX citation file.
//!
//! `bibsync` watches a WebDAV folder (typically the one a reference manager such as Zotero
//! syncs its attachments to), and for every ZIP archive found there it:
//!
//! - Extracts the contained PDF documents
//! - Reads each document's embedded information dictionary
//! - Normalizes it into a citation record with a synthesized key
//! - Appends the records to an existing BibTeX file without disturbing prior content
//!
//! # Getting Started
//!
//! ```no_run
//! use bibsync::{pipeline::Pipeline, prelude::*, sync::sync, webdav::WebDavClient, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::default()
//!     .with_webdav_url("https://dav.example.org/zotero")
//!     .with_credentials("alice", "hunter2")
//!     .with_bibliography_path("library.bib");
//!
//!   let client = WebDavClient::new(&config)?;
//!   let pipeline = Pipeline::from_config(&config);
//!
//!   let report = sync(&client, &pipeline).await?;
//!   println!("Processed {} archives", report.archives.len());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`archive`]: ZIP enumeration and document extraction
//! - [`metadata`]: PDF information dictionary reading
//! - [`citation`]: Citation record synthesis and key generation
//! - [`bibliography`]: BibTeX serialization and append-merge into the citation file
//! - [`pipeline`]: Per-archive orchestration and cleanup
//! - [`webdav`]: Remote listing and download over WebDAV
//! - [`sync`]: One run across every archive a remote store lists
//! - [`config`]: Serializable configuration
//! - [`prelude`]: Common traits and types for ergonomic imports

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fmt::Display,
  fs,
  io::Read,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{Datelike, Local};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod archive;
pub mod bibliography;
pub mod citation;
pub mod config;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod sync;
pub mod webdav;

pub use config::Config;

use crate::{
  archive::{ArchiveEntry, ExtractedDocument},
  citation::{CitationRecord, Clock, KeyPolicy, SystemClock},
  error::*,
  metadata::DocumentMetadata,
};

/// File extension of the documents pulled out of each archive.
pub const DOCUMENT_EXTENSION: &str = ".pdf";

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use bibsync::{pipeline::Pipeline, prelude::*, Config};
///
/// fn example(bytes: &[u8]) -> Result<(), BibsyncError> {
///   let pipeline = Pipeline::from_config(&Config::default());
///   let report = pipeline.process_archive(bytes)?;
///   println!("{}", report.batch_text);
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{citation::Clock, error::BibsyncError, sync::RemoteStore};
}
