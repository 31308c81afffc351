//! The sync loop: list remote archives and push each through a [`Pipeline`].
//!
//! Archives are processed one after another in listing order. Failing to list the remote store
//! ends the run, while a failed download or an unreadable archive only ends that archive's turn;
//! its error is kept in the [`SyncReport`] and the loop moves on.

use crate::pipeline::{Pipeline, ProcessReport};

use super::*;

/// A place archives are listed and downloaded from.
#[async_trait]
pub trait RemoteStore: Send + Sync {
  /// Names of the archives currently available, in the order they should be processed.
  async fn list_archives(&self) -> Result<Vec<String>>;

  /// Full bytes of the archive `name` as returned by [`RemoteStore::list_archives`].
  async fn download(&self, name: &str) -> Result<Vec<u8>>;
}

/// What happened to a single archive.
#[derive(Debug)]
pub struct ArchiveReport {
  /// Archive name as listed by the store
  pub name:    String,
  /// The pipeline's report, or the error that stopped this archive
  pub outcome: Result<ProcessReport>,
}

/// What happened during one [`sync`] run.
#[derive(Debug, Default)]
pub struct SyncReport {
  /// One report per listed archive, in processing order
  pub archives: Vec<ArchiveReport>,
}

impl SyncReport {
  /// Reports of archives that were processed successfully.
  pub fn succeeded(&self) -> impl Iterator<Item = (&str, &ProcessReport)> {
    self.archives.iter().filter_map(|archive| match &archive.outcome {
      Ok(report) => Some((archive.name.as_str(), report)),
      Err(_) => None,
    })
  }

  /// Errors of archives that could not be processed.
  pub fn failed(&self) -> impl Iterator<Item = (&str, &BibsyncError)> {
    self.archives.iter().filter_map(|archive| match &archive.outcome {
      Ok(_) => None,
      Err(e) => Some((archive.name.as_str(), e)),
    })
  }

  /// Total number of citation records written across all archives.
  pub fn record_count(&self) -> usize {
    self.succeeded().map(|(_, report)| report.records.len()).sum()
  }
}

/// Downloads every archive `store` lists and runs it through `pipeline`.
///
/// # Errors
///
/// Only a failure to list the store is returned. Per-archive failures are logged and recorded in
/// the returned [`SyncReport`].
pub async fn sync<S: RemoteStore + ?Sized>(store: &S, pipeline: &Pipeline) -> Result<SyncReport> {
  let names = store.list_archives().await?;
  info!("Processing {} archives", names.len());

  let mut report = SyncReport::default();
  for name in names {
    info!("Processing archive: {name}");
    let outcome = match store.download(&name).await {
      Ok(bytes) => pipeline.process_archive(&bytes),
      Err(e) => Err(e),
    };
    match &outcome {
      Ok(processed) => {
        debug!("Archive {name}: {} citations", processed.records.len())
      },
      Err(e) => warn!("Error processing archive {name}: {e}"),
    }
    report.archives.push(ArchiveReport { name, outcome });
  }
  Ok(report)
}
