use super::*;

#[traced_test]
#[test]
fn test_papers_archive() -> TestResult<()> {
  let dir = tempdir()?;
  let pipeline = test_pipeline(&dir);
  let archive =
    zip_of(&[("draft1.pdf", &pdf(Some(&[("Author", "A. Student")]))), ("notes.txt", b"todo")]);

  let report = pipeline.process_archive(&archive)?;

  let expected = dir.path().join("extracted_pdfs").join("draft1.pdf");
  assert_eq!(report.extracted_paths(), vec![expected.as_path()]);
  assert!(!dir.path().join("extracted_pdfs").join("notes.txt").exists());

  assert_eq!(report.records.len(), 1);
  let record = &report.records[0];
  assert_eq!(record.key, format!("draft1{TEST_YEAR}"));
  assert_eq!(record.title, "draft1");
  assert_eq!(record.year, TEST_YEAR.to_string());
  assert_eq!(record.author, "A. Student");
  assert_eq!(record.publisher, "Unknown");

  let written = fs::read_to_string(pipeline.bibliography_path())?;
  assert_eq!(written, report.batch_text);
  assert_eq!(written, report.merged_text);
  assert!(!written.contains("notes"));
  assert!(logs_contain("Extracted: draft1.pdf"));
  Ok(())
}

#[test]
fn test_creation_date_sets_year() -> TestResult<()> {
  let dir = tempdir()?;
  let document = pdf(Some(&[
    ("Title", "Succinct Arguments from Folding"),
    ("Producer", "LaTeX with hyperref"),
    ("CreationDate", "D:20190304101010Z"),
  ]));

  let report = test_pipeline(&dir).process_archive(&zip_of(&[("storage/a.pdf", &document)]))?;

  assert_eq!(
    report.batch_text,
    "@article{succinct2019,\n  title = {Succinct Arguments from Folding},\n  author = \
     {Unknown},\n  year = {2019},\n  publisher = {LaTeX with hyperref},\n}"
  );
  Ok(())
}

#[test]
fn test_same_title_same_year_keys_collide() -> TestResult<()> {
  let dir = tempdir()?;
  let document = pdf(Some(&[("Title", "Systems"), ("CreationDate", "D:20220101")]));
  let archive = zip_of(&[("one.pdf", &document), ("two.pdf", &document)]);

  let report = test_pipeline(&dir).process_archive(&archive)?;

  let keys: Vec<_> = report.records.iter().map(|record| record.key.as_str()).collect();
  assert_eq!(keys, ["systems2022", "systems2022"]);
  Ok(())
}

#[test]
fn test_disambiguate_against_existing_file() -> TestResult<()> {
  let dir = tempdir()?;
  let pipeline = test_pipeline(&dir).with_key_policy(KeyPolicy::Disambiguate);
  fs::write(pipeline.bibliography_path(), "@article{systems2022,\n  title = {Old},\n}\n")?;
  let document = pdf(Some(&[("Title", "Systems"), ("CreationDate", "D:20220101")]));
  let archive = zip_of(&[("one.pdf", &document), ("two.pdf", &document)]);

  let report = pipeline.process_archive(&archive)?;

  let keys: Vec<_> = report.records.iter().map(|record| record.key.as_str()).collect();
  assert_eq!(keys, ["systems2022a", "systems2022b"]);
  assert!(report.merged_text.starts_with("@article{systems2022,\n  title = {Old},\n}\n\n@article"));
  Ok(())
}

#[traced_test]
#[test]
fn test_document_without_info_is_skipped() -> TestResult<()> {
  let dir = tempdir()?;
  let archive = zip_of(&[("bare.pdf", &pdf(None)), ("full.pdf", &pdf(Some(&[("Title", "Full")])))]);

  let report = test_pipeline(&dir).process_archive(&archive)?;

  assert_eq!(report.extracted.len(), 2);
  assert_eq!(report.records.len(), 1);
  assert_eq!(report.records[0].key, format!("full{TEST_YEAR}"));
  assert!(logs_contain("Skipping bare.pdf"));
  Ok(())
}

#[test]
fn test_merge_preserves_existing_content() -> TestResult<()> {
  let dir = tempdir()?;
  let pipeline = test_pipeline(&dir);
  let existing = "% my library\n@book{knuth1984,\n  title = {The TeXbook},\n}\n\n\n";
  fs::write(pipeline.bibliography_path(), existing)?;

  let report = pipeline.process_archive(&zip_of(&[("x.pdf", &pdf(Some(&[("Title", "X")])))]))?;

  let written = fs::read_to_string(pipeline.bibliography_path())?;
  assert_eq!(written, format!("{}\n\n{}", existing.trim_end(), report.batch_text));
  Ok(())
}

#[test]
fn test_cleanup_after_merge() -> TestResult<()> {
  let dir = tempdir()?;
  let pipeline = test_pipeline(&dir).with_cleanup(true);

  let report = pipeline.process_archive(&zip_of(&[("x.pdf", &pdf(Some(&[("Title", "X")])))]))?;

  assert_eq!(report.records.len(), 1);
  assert!(!pipeline.output_dir().exists());
  assert!(pipeline.bibliography_path().exists());
  Ok(())
}
