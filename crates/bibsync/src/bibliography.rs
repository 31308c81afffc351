//! BibTeX serialization and append-merge into the citation file.
//!
//! The citation file is append-only from this crate's point of view. A merge reads whatever the
//! file holds, trims trailing whitespace, and writes it back followed by exactly one blank line
//! and the new batch. Nothing is deduplicated or validated, and there is no locking: two merges
//! racing on the same file can lose one batch.
//!
//! # Examples
//!
//! ```no_run
//! use bibsync::{bibliography, citation::CitationRecord};
//!
//! # fn example() -> Result<(), bibsync::error::BibsyncError> {
//! let record = CitationRecord {
//!   key:       "systems2022".into(),
//!   title:     "Systems".into(),
//!   author:    "Unknown".into(),
//!   year:      "2022".into(),
//!   publisher: "Unknown".into(),
//! };
//! let full_text = bibliography::merge(&[record], "library.bib")?;
//! println!("{full_text}");
//! # Ok(())
//! # }
//! ```

use std::{collections::HashSet, io::ErrorKind};

use super::*;

lazy_static! {
  /// Opening line of a BibTeX entry, capturing its key.
  static ref ENTRY_KEY: Regex = Regex::new(r"(?m)^\s*@\w+\s*\{\s*([^,\s]+)\s*,").unwrap();
}

impl Display for CitationRecord {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "@article{{{},", self.key)?;
    writeln!(f, "  title = {{{}}},", self.title)?;
    writeln!(f, "  author = {{{}}},", self.author)?;
    writeln!(f, "  year = {{{}}},", self.year)?;
    writeln!(f, "  publisher = {{{}}},", self.publisher)?;
    write!(f, "}}")
  }
}

/// Serializes `records` as BibTeX entries separated by a single newline.
pub fn batch_text(records: &[CitationRecord]) -> String {
  records.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Appends `records` to the citation file at `target` and returns the file's new content.
///
/// A missing or empty file ends up holding exactly the batch text. An empty batch leaves the file
/// untouched.
///
/// # Errors
///
/// Returns [`BibsyncError::Path`] if the file cannot be read or written.
pub fn merge(records: &[CitationRecord], target: impl AsRef<Path>) -> Result<String> {
  merge_text(&batch_text(records), target)
}

/// Appends already serialized `batch` text to the citation file at `target`.
///
/// See [`merge`].
pub fn merge_text(batch: &str, target: impl AsRef<Path>) -> Result<String> {
  let target = target.as_ref();
  let existing = read_existing(target)?;

  if batch.is_empty() {
    debug!("No citations to add to {}", target.display());
    return Ok(existing.unwrap_or_default());
  }

  let merged = match existing.as_deref() {
    Some(prior) if !prior.is_empty() => format!("{}\n\n{batch}", prior.trim_end()),
    _ => batch.to_string(),
  };

  if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }
  fs::write(target, &merged)?;
  info!("Updated citation file {}", target.display());
  Ok(merged)
}

/// Collects the keys of every entry already present in the citation file.
///
/// A missing file has no keys.
pub fn existing_keys(target: impl AsRef<Path>) -> Result<HashSet<String>> {
  let content = read_existing(target.as_ref())?.unwrap_or_default();
  Ok(
    ENTRY_KEY
      .captures_iter(&content)
      .filter_map(|captures| captures.get(1))
      .map(|key| key.as_str().to_string())
      .collect(),
  )
}

/// Reads the citation file, mapping a missing file to `None`.
fn read_existing(target: &Path) -> Result<Option<String>> {
  match fs::read_to_string(target) {
    Ok(content) => Ok(Some(content)),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e.into()),
  }
}
