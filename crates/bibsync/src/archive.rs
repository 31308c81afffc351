//! ZIP archive enumeration and document extraction.
//!
//! Archives pulled from the remote store are plain ZIP containers holding PDF attachments,
//! sometimes nested in per-item folders. This module offers two views over the same bytes:
//!
//! - [`extract`] writes every document to a flat output directory and reports the paths
//! - [`documents`] re-reads the document entries one by one for metadata inspection
//!
//! Both are tolerant of bad entries: a corrupt or oversized entry is logged and skipped so the
//! rest of the archive still gets processed. Only an archive that cannot be opened at all is an
//! error.
//!
//! # Examples
//!
//! ```no_run
//! # fn example(bytes: &[u8]) -> Result<(), bibsync::error::BibsyncError> {
//! let extracted = bibsync::archive::extract(bytes, "extracted_pdfs")?;
//! for document in &extracted {
//!   println!("{} -> {}", document.entry_name, document.path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::io::Cursor;

use zip::ZipArchive;

use super::*;

/// Largest decompressed size accepted for a single archive entry.
pub const MAX_ENTRY_BYTES: u64 = 512 * 1024 * 1024;

/// A document entry read out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  /// Full path of the entry inside the archive
  pub name:  String,
  /// Decompressed content
  pub bytes: Vec<u8>,
}

/// A document that was written to disk by [`extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
  /// Full path of the originating entry inside the archive
  pub entry_name: String,
  /// Where the document now lives on disk
  pub path:       PathBuf,
}

/// Returns true when an entry name carries the document extension, ignoring case.
pub fn is_document(name: &str) -> bool { name.to_lowercase().ends_with(DOCUMENT_EXTENSION) }

/// Strips every directory component from an archive entry name.
///
/// Both `/` and `\` are treated as separators. A name ending in a separator yields `""`.
pub fn basename(name: &str) -> &str { name.rsplit(['/', '\\']).next().unwrap_or(name) }

/// Writes every document entry of `bytes` into `output_dir`.
///
/// The output directory is created if needed. Entries are flattened to their base name, so two
/// entries sharing a base name in different folders resolve to the same path and the later one
/// wins.
///
/// # Errors
///
/// Returns [`BibsyncError::ArchiveFormat`] if the archive cannot be opened, or
/// [`BibsyncError::Path`] if the output directory cannot be created. Failures on individual
/// entries are logged and skipped.
pub fn extract(bytes: &[u8], output_dir: impl AsRef<Path>) -> Result<Vec<ExtractedDocument>> {
  let output_dir = output_dir.as_ref();
  let mut archive = open(bytes)?;
  fs::create_dir_all(output_dir)?;

  let mut extracted = Vec::new();
  for index in 0..archive.len() {
    let entry = match read_document(&mut archive, index) {
      Ok(Some(entry)) => entry,
      Ok(None) => continue,
      Err(e) => {
        warn!("Error extracting entry #{index}: {e}");
        continue;
      },
    };

    let filename = basename(&entry.name);
    if filename.is_empty() {
      debug!("Skipping {:?}: no file name after stripping directories", entry.name);
      continue;
    }

    let path = output_dir.join(filename);
    match fs::write(&path, &entry.bytes) {
      Ok(()) => {
        info!("Extracted: {filename}");
        extracted.push(ExtractedDocument { entry_name: entry.name, path });
      },
      Err(e) => warn!("Error extracting {}: {e}", entry.name),
    }
  }

  Ok(extracted)
}

/// Document entries of an archive, decompressed one at a time as the iterator advances.
///
/// Created by [`documents`]. Unreadable entries are logged and skipped.
pub struct Documents<'a> {
  /// Archive being walked
  archive: ZipArchive<Cursor<&'a [u8]>>,
  /// Index of the next entry to look at
  index:   usize,
}

impl Iterator for Documents<'_> {
  type Item = ArchiveEntry;

  fn next(&mut self) -> Option<ArchiveEntry> {
    while self.index < self.archive.len() {
      let index = self.index;
      self.index += 1;
      match read_document(&mut self.archive, index) {
        Ok(Some(entry)) => return Some(entry),
        Ok(None) => (),
        Err(e) => warn!("Error reading entry #{index}: {e}"),
      }
    }
    None
  }
}

/// Walks the document entries of `bytes` in archive order.
///
/// Only the entry currently yielded is held in memory.
///
/// # Errors
///
/// Returns [`BibsyncError::ArchiveFormat`] if the archive cannot be opened.
pub fn documents(bytes: &[u8]) -> Result<Documents<'_>> {
  Ok(Documents { archive: open(bytes)?, index: 0 })
}

/// Opens an in-memory ZIP archive.
fn open(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>> {
  Ok(ZipArchive::new(Cursor::new(bytes))?)
}

/// Reads entry `index` if it is a document, returning `None` for directories and other files.
fn read_document(
  archive: &mut ZipArchive<Cursor<&[u8]>>,
  index: usize,
) -> Result<Option<ArchiveEntry>> {
  let entry = archive.by_index(index)?;
  if entry.is_dir() || !is_document(entry.name()) {
    trace!("Ignoring archive entry {:?}", entry.name());
    return Ok(None);
  }

  let name = entry.name().to_string();
  let mut bytes = Vec::new();
  entry.take(MAX_ENTRY_BYTES + 1).read_to_end(&mut bytes)?;
  if bytes.len() as u64 > MAX_ENTRY_BYTES {
    return Err(BibsyncError::EntryTooLarge { name, limit: MAX_ENTRY_BYTES });
  }
  Ok(Some(ArchiveEntry { name, bytes }))
}
