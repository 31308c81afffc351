use std::collections::BTreeMap;

use async_trait::async_trait;
use bibsync::{error::Result, sync::sync};

use super::*;

/// Remote store backed by a map; listed names missing from it fail to download.
struct MemoryStore {
  listed:   Vec<String>,
  archives: BTreeMap<String, Vec<u8>>,
}

#[async_trait]
impl RemoteStore for MemoryStore {
  async fn list_archives(&self) -> Result<Vec<String>> { Ok(self.listed.clone()) }

  async fn download(&self, name: &str) -> Result<Vec<u8>> {
    self
      .archives
      .get(name)
      .cloned()
      .ok_or_else(|| BibsyncError::ApiError(format!("Failed to download {name}: 404 Not Found")))
  }
}

#[tokio::test]
#[traced_test]
async fn test_sync_appends_every_archive() -> TestResult<()> {
  let dir = tempdir()?;
  let pipeline = test_pipeline(&dir);
  let store = MemoryStore {
    listed:   vec!["A.zip".into(), "gone.zip".into(), "B.zip".into()],
    archives: BTreeMap::from([
      ("A.zip".to_string(), zip_of(&[("a.pdf", &pdf(Some(&[("Title", "Alpha")])))])),
      ("B.zip".to_string(), zip_of(&[("b.pdf", &pdf(Some(&[("Title", "Beta")])))])),
    ]),
  };

  let report = sync(&store, &pipeline).await?;

  assert_eq!(report.archives.len(), 3);
  assert_eq!(report.record_count(), 2);
  let failed: Vec<_> = report.failed().map(|(name, _)| name).collect();
  assert_eq!(failed, ["gone.zip"]);

  let written = fs::read_to_string(pipeline.bibliography_path())?;
  let alpha = written.find(&format!("alpha{TEST_YEAR}")).unwrap();
  let beta = written.find(&format!("beta{TEST_YEAR}")).unwrap();
  assert!(alpha < beta);
  assert!(logs_contain("Error processing archive gone.zip"));
  Ok(())
}

#[tokio::test]
async fn test_sync_nothing_listed() -> TestResult<()> {
  let dir = tempdir()?;
  let pipeline = test_pipeline(&dir);
  let store = MemoryStore { listed: Vec::new(), archives: BTreeMap::new() };

  let report = sync(&store, &pipeline).await?;

  assert!(report.archives.is_empty());
  assert!(!pipeline.bibliography_path().exists());
  Ok(())
}
