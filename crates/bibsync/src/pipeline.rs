//! Per-archive orchestration: extract, read metadata, synthesize, merge, clean up.
//!
//! A [`Pipeline`] holds everything that stays fixed across archives of one run: where documents
//! are extracted to, which citation file receives the entries, and how keys and cleanup are
//! handled. [`Pipeline::process_archive`] then runs one archive through the whole chain:
//!
//! 1. [`archive::extract`] writes the archive's documents to the output directory
//! 2. [`archive::documents`] re-reads the documents and [`metadata::read_metadata`] inspects each
//! 3. [`citation::synthesize`] builds one record per document that has metadata
//! 4. [`bibliography::merge`] appends the batch to the citation file
//! 5. extracted documents are deleted, and the output directory too if that leaves it empty
//!
//! Documents without metadata, unreadable documents, and failed deletions are logged and
//! skipped. Only an unreadable archive or a failed write to the citation file is an error.
//!
//! # Examples
//!
//! ```no_run
//! use bibsync::{citation::FixedClock, pipeline::Pipeline};
//!
//! # fn example() -> Result<(), bibsync::error::BibsyncError> {
//! let bytes = std::fs::read("papers.zip")?;
//! let pipeline = Pipeline::new("extracted_pdfs", "library.bib")
//!   .with_cleanup(false)
//!   .with_clock(FixedClock(2025));
//! let report = pipeline.process_archive(&bytes)?;
//! for path in report.extracted_paths() {
//!   println!("- {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::{collections::HashSet, io::ErrorKind};

use super::*;

/// Processes archives into a citation file.
pub struct Pipeline {
  /// Where documents are extracted to
  output_dir:        PathBuf,
  /// Citation file new entries are appended to
  bibliography_path: PathBuf,
  /// Whether extracted documents are removed after merging
  cleanup:           bool,
  /// How repeated citation keys are treated
  key_policy:        KeyPolicy,
  /// Year source for documents without a creation date
  clock:             Box<dyn Clock + Send + Sync>,
}

/// Everything one [`Pipeline::process_archive`] call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
  /// Documents written to the output directory, in archive order
  pub extracted:   Vec<ExtractedDocument>,
  /// Citation records synthesized for this archive
  pub records:     Vec<CitationRecord>,
  /// BibTeX text of just this archive's records
  pub batch_text:  String,
  /// Full content of the citation file after the merge
  pub merged_text: String,
}

impl ProcessReport {
  /// Paths of the extracted documents.
  pub fn extracted_paths(&self) -> Vec<&Path> {
    self.extracted.iter().map(|document| document.path.as_path()).collect()
  }
}

impl Pipeline {
  /// Creates a pipeline with cleanup enabled, duplicate keys allowed, and the system clock.
  pub fn new(output_dir: impl AsRef<Path>, bibliography_path: impl AsRef<Path>) -> Self {
    Self {
      output_dir:        output_dir.as_ref().to_path_buf(),
      bibliography_path: bibliography_path.as_ref().to_path_buf(),
      cleanup:           true,
      key_policy:        KeyPolicy::default(),
      clock:             Box::new(SystemClock),
    }
  }

  /// Creates a pipeline from the output, cleanup, and key settings of a [`Config`].
  pub fn from_config(config: &Config) -> Self {
    Self::new(&config.output_dir, &config.bibliography_path)
      .with_cleanup(config.cleanup)
      .with_key_policy(config.key_policy)
  }

  /// Chooses whether extracted documents are deleted after merging.
  pub fn with_cleanup(mut self, cleanup: bool) -> Self {
    self.cleanup = cleanup;
    self
  }

  /// Sets the policy for repeated citation keys.
  pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
    self.key_policy = key_policy;
    self
  }

  /// Replaces the clock used for the year fallback.
  pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
    self.clock = Box::new(clock);
    self
  }

  /// Directory documents are extracted to.
  pub fn output_dir(&self) -> &Path { &self.output_dir }

  /// Citation file entries are appended to.
  pub fn bibliography_path(&self) -> &Path { &self.bibliography_path }

  /// Runs one archive through extraction, citation synthesis, merge, and cleanup.
  ///
  /// # Errors
  ///
  /// Returns [`BibsyncError::ArchiveFormat`] for an unreadable archive and
  /// [`BibsyncError::Path`] when the output directory or citation file cannot be written.
  /// Extracted documents are cleaned up even if the merge fails.
  pub fn process_archive(&self, bytes: &[u8]) -> Result<ProcessReport> {
    let extracted = archive::extract(bytes, &self.output_dir)?;
    debug!("Extracted {} documents to {}", extracted.len(), self.output_dir.display());

    let merged = self.citations(bytes).and_then(|mut records| {
      if self.key_policy == KeyPolicy::Disambiguate {
        let existing: HashSet<String> = bibliography::existing_keys(&self.bibliography_path)?;
        citation::disambiguate(&mut records, &existing);
      }
      let batch_text = bibliography::batch_text(&records);
      let merged_text = bibliography::merge_text(&batch_text, &self.bibliography_path)?;
      Ok((records, batch_text, merged_text))
    });

    if self.cleanup {
      self.clean_up(&extracted);
    }

    let (records, batch_text, merged_text) = merged?;
    Ok(ProcessReport { extracted, records, batch_text, merged_text })
  }

  /// Synthesizes one citation record per document in the archive that carries metadata.
  ///
  /// # Errors
  ///
  /// Returns [`BibsyncError::ArchiveFormat`] for an unreadable archive. Documents that cannot
  /// be parsed or have no information dictionary are logged and skipped.
  pub fn citations(&self, bytes: &[u8]) -> Result<Vec<CitationRecord>> {
    let mut records = Vec::new();
    for ArchiveEntry { name, bytes: document } in archive::documents(bytes)? {
      match metadata::read_metadata(&document) {
        Ok(Some(metadata)) => {
          let record = citation::synthesize(&metadata, &name, &*self.clock);
          debug!("Synthesized citation {} for {name}", record.key);
          records.push(record);
        },
        Ok(None) => info!("Skipping {name}: no document metadata"),
        Err(e) => warn!("Error processing {name}: {e}"),
      }
    }
    Ok(records)
  }

  /// Deletes extracted documents, then the output directory if nothing else is left in it.
  fn clean_up(&self, documents: &[ExtractedDocument]) {
    for document in documents {
      match fs::remove_file(&document.path) {
        Ok(()) => info!("Cleaned up: {}", document.path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => (),
        Err(e) => warn!("Error deleting {}: {e}", document.path.display()),
      }
    }

    let is_empty = match fs::read_dir(&self.output_dir) {
      Ok(mut entries) => entries.next().is_none(),
      Err(e) if e.kind() == ErrorKind::NotFound => false,
      Err(e) => {
        warn!("Error reading directory {}: {e}", self.output_dir.display());
        false
      },
    };
    if is_empty {
      match fs::remove_dir(&self.output_dir) {
        Ok(()) => info!("Removed empty directory: {}", self.output_dir.display()),
        Err(e) => warn!("Error removing directory {}: {e}", self.output_dir.display()),
      }
    }
  }
}
