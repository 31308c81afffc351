//! Citation record synthesis.
//!
//! Turns the loosely filled [`DocumentMetadata`] of one PDF into a [`CitationRecord`] whose
//! fields are always present. Missing values fall back as follows:
//!
//! | Field     | Source                       | Fallback                                |
//! |-----------|------------------------------|-----------------------------------------|
//! | title     | `/Title`                     | entry file name without `.pdf`          |
//! | year      | `D:YYYY` in `/CreationDate`  | current year according to the [`Clock`] |
//! | author    | `/Author`                    | `Unknown`                               |
//! | publisher | `/Producer`                  | `Unknown`                               |
//!
//! The key is the first word of the title, lower-cased and reduced to word characters, followed
//! directly by the year. An empty title gives the stem `unknown`; a first word with no word
//! characters at all (`"?! Notes"`) gives an empty stem, leaving only the year. Keys are not
//! unique: two papers whose titles start with the same word and share a year get the same key
//! unless [`KeyPolicy::Disambiguate`] is selected.
//!
//! # Examples
//!
//! ```
//! use bibsync::{
//!   citation::{synthesize, FixedClock},
//!   metadata::DocumentMetadata,
//! };
//!
//! let metadata = DocumentMetadata {
//!   title: Some("Attention Is All You Need".into()),
//!   creation_date: Some("D:20170612000000Z".into()),
//!   ..Default::default()
//! };
//! let record = synthesize(&metadata, "storage/1706.03762.pdf", &FixedClock(2025));
//! assert_eq!(record.key, "attention2017");
//! assert_eq!(record.author, "Unknown");
//! ```

use std::collections::HashSet;

use super::*;

/// Key stem used when the title is empty.
pub const UNKNOWN_KEY: &str = "unknown";

/// Placeholder for author and publisher when the document does not name one.
pub const UNKNOWN_FIELD: &str = "Unknown";

lazy_static! {
  /// Year following the `D:` prefix of a PDF date string.
  static ref CREATION_YEAR: Regex = Regex::new(r"D:([0-9]{4})").unwrap();
  /// Anything that may not appear in a citation key.
  static ref NON_WORD: Regex = Regex::new(r"[^\w]").unwrap();
}

/// Source of the current calendar year for records without a creation date.
pub trait Clock {
  /// The current calendar year.
  fn current_year(&self) -> i32;
}

/// [`Clock`] backed by the local system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn current_year(&self) -> i32 { Local::now().year() }
}

/// [`Clock`] pinned to a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
  fn current_year(&self) -> i32 { self.0 }
}

/// How citation keys that already exist are treated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
  /// Keep synthesized keys as they are, even when they repeat.
  #[default]
  AllowDuplicates,
  /// Append `a`, `b`, … to keys already present in the citation file or earlier in the batch.
  Disambiguate,
}

/// Normalized bibliographic fields for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
  /// Citation key, the key stem immediately followed by the year
  pub key:       String,
  /// Document title
  pub title:     String,
  /// Author line as written in the document
  pub author:    String,
  /// Four digit year
  pub year:      String,
  /// Producing software or publisher
  pub publisher: String,
}

/// Builds the citation record for one document.
///
/// `entry_name` is the document's path inside its archive and only feeds the title fallback.
pub fn synthesize(
  metadata: &DocumentMetadata,
  entry_name: &str,
  clock: &dyn Clock,
) -> CitationRecord {
  let title = match non_empty(metadata.title.as_deref()) {
    Some(title) => title.to_string(),
    None => title_from_entry(entry_name).to_string(),
  };
  let year = resolve_year(metadata.creation_date.as_deref(), clock);
  let key = format!("{}{year}", key_stem(&title));

  CitationRecord {
    key,
    title,
    author: non_empty(metadata.author.as_deref()).unwrap_or(UNKNOWN_FIELD).to_string(),
    year,
    publisher: non_empty(metadata.producer.as_deref()).unwrap_or(UNKNOWN_FIELD).to_string(),
  }
}

/// Makes every key in `records` distinct from `existing` and from each other.
///
/// Records are visited in order, so the first holder of a key keeps it and later ones receive
/// suffixes.
pub fn disambiguate(records: &mut [CitationRecord], existing: &HashSet<String>) {
  let mut taken = existing.clone();
  for record in records.iter_mut() {
    if taken.contains(&record.key) {
      let base = record.key.clone();
      let mut n = 0;
      while taken.contains(&record.key) {
        record.key = format!("{base}{}", key_suffix(n));
        n += 1;
      }
      debug!("Renamed duplicate citation key {base} to {}", record.key);
    }
    taken.insert(record.key.clone());
  }
}

/// Lower-case letter suffix for the `n`th duplicate: `a`..`z`, then `aa`, `ab`, ….
fn key_suffix(mut n: usize) -> String {
  let mut letters = Vec::new();
  loop {
    letters.push(char::from(b'a' + (n % 26) as u8));
    if n < 26 {
      break;
    }
    n = n / 26 - 1;
  }
  letters.iter().rev().collect()
}

/// Discards `value` if it is blank, otherwise keeps it as written.
fn non_empty(value: Option<&str>) -> Option<&str> {
  value.filter(|value| !value.trim().is_empty())
}

/// Last path segment of an entry name with the document extension removed.
fn title_from_entry(entry_name: &str) -> &str {
  let name = archive::basename(entry_name);
  let split = name.len().saturating_sub(DOCUMENT_EXTENSION.len());
  match (name.get(..split), name.get(split..)) {
    (Some(stem), Some(extension)) if extension.eq_ignore_ascii_case(DOCUMENT_EXTENSION) => stem,
    _ => name,
  }
}

/// First word of the title reduced to lower-case word characters, `unknown` for an empty title.
///
/// A first word made only of punctuation reduces to an empty stem.
fn key_stem(title: &str) -> String {
  match title.split_whitespace().next() {
    Some(word) => NON_WORD.replace_all(&word.to_lowercase(), "").into_owned(),
    None => UNKNOWN_KEY.to_string(),
  }
}

/// Year from a PDF creation date, or the clock's year when there is none.
fn resolve_year(creation_date: Option<&str>, clock: &dyn Clock) -> String {
  creation_date
    .and_then(|date| CREATION_YEAR.captures(date))
    .and_then(|captures| captures.get(1))
    .map(|year| year.as_str().to_string())
    .unwrap_or_else(|| format!("{:04}", clock.current_year()))
}
