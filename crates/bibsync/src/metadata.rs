//! PDF document information dictionary reading.
//!
//! Only the `/Info` dictionary referenced from the document trailer is consulted. XMP metadata
//! streams are not read.

use lopdf::{Dictionary, Document, Object};

use super::*;

/// Fields taken from a PDF's document information dictionary.
///
/// Every field is optional; a document may carry an information dictionary with none of them
/// filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
  /// `/Title`
  pub title:         Option<String>,
  /// `/Author`
  pub author:        Option<String>,
  /// `/Producer`, the software that wrote the PDF
  pub producer:      Option<String>,
  /// `/CreationDate` in raw PDF date form, e.g. `D:20230415120000Z`
  pub creation_date: Option<String>,
}

/// Reads the information dictionary of the PDF in `bytes`.
///
/// Returns `Ok(None)` when the document has no information dictionary at all.
///
/// # Errors
///
/// Returns [`BibsyncError::DocumentParse`] if the bytes are not a readable PDF.
///
/// # Examples
///
/// ```no_run
/// # fn example() -> Result<(), bibsync::error::BibsyncError> {
/// let bytes = std::fs::read("paper.pdf")?;
/// if let Some(metadata) = bibsync::metadata::read_metadata(&bytes)? {
///   println!("Title: {:?}", metadata.title);
/// }
/// # Ok(())
/// # }
/// ```
pub fn read_metadata(bytes: &[u8]) -> Result<Option<DocumentMetadata>> {
  let doc = Document::load_mem(bytes)?;

  let info = match doc.trailer.get(b"Info") {
    Ok(Object::Reference(id)) => doc.get_dictionary(*id)?,
    Ok(Object::Dictionary(dict)) => dict,
    _ => {
      trace!("Document has no information dictionary");
      return Ok(None);
    },
  };

  Ok(Some(DocumentMetadata {
    title:         text_field(&doc, info, b"Title"),
    author:        text_field(&doc, info, b"Author"),
    producer:      text_field(&doc, info, b"Producer"),
    creation_date: text_field(&doc, info, b"CreationDate"),
  }))
}

/// Looks up a text string in `dict`, following one level of indirection.
///
/// Text strings are decoded as UTF-16BE or UTF-8 when they start with the matching byte order
/// mark and as PDFDocEncoding otherwise.
fn text_field(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
  let object = match dict.get(key).ok()? {
    Object::Reference(id) => doc.get_object(*id).ok()?,
    object => object,
  };
  match lopdf::decode_text_string(object) {
    Ok(text) => Some(text),
    Err(e) => {
      trace!("Ignoring /{}: {e}", String::from_utf8_lossy(key));
      None
    },
  }
}

#[cfg(test)]
mod tests {
  use lopdf::{dictionary, StringFormat};

  use super::*;
  use crate::citation::{synthesize, FixedClock};

  /// Builds a one-page-tree PDF, attaching `info` as the trailer's `/Info` when given.
  fn pdf_with_info(info: Option<Dictionary>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let pages = dictionary! {
      "Type" => "Pages",
      "Kids" => Vec::<Object>::new(),
      "Count" => 0,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    if let Some(info) = info {
      let info_id = doc.add_object(info);
      doc.trailer.set("Info", info_id);
    }
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
  }

  #[test]
  fn test_read_all_fields() {
    let bytes = pdf_with_info(Some(dictionary! {
      "Title" => Object::string_literal("Analysis of PDF Extraction Methods"),
      "Author" => Object::string_literal("Alice Researcher and Bob Scholar"),
      "Producer" => Object::string_literal("pdfTeX-1.40.25"),
      "CreationDate" => Object::string_literal("D:20230415120000Z"),
    }));

    let metadata = read_metadata(&bytes).unwrap().unwrap();

    assert_eq!(metadata, DocumentMetadata {
      title:         Some("Analysis of PDF Extraction Methods".into()),
      author:        Some("Alice Researcher and Bob Scholar".into()),
      producer:      Some("pdfTeX-1.40.25".into()),
      creation_date: Some("D:20230415120000Z".into()),
    });
  }

  #[test]
  fn test_missing_fields_are_none() {
    let bytes = pdf_with_info(Some(dictionary! {
      "Producer" => Object::string_literal("Microsoft Word"),
    }));

    let metadata = read_metadata(&bytes).unwrap().unwrap();

    assert_eq!(metadata.title, None);
    assert_eq!(metadata.author, None);
    assert_eq!(metadata.creation_date, None);
    assert_eq!(metadata.producer.as_deref(), Some("Microsoft Word"));
  }

  #[test]
  fn test_no_information_dictionary() {
    let bytes = pdf_with_info(None);
    assert_eq!(read_metadata(&bytes).unwrap(), None);
  }

  #[test]
  fn test_utf16_title() {
    let mut title = vec![0xFE, 0xFF];
    for unit in "Über Systeme".encode_utf16() {
      title.extend_from_slice(&unit.to_be_bytes());
    }
    let bytes = pdf_with_info(Some(dictionary! {
      "Title" => Object::String(title, StringFormat::Hexadecimal),
    }));

    let metadata = read_metadata(&bytes).unwrap().unwrap();

    assert_eq!(metadata.title.as_deref(), Some("Über Systeme"));
  }

  #[test]
  fn test_unreadable_document() {
    let result = read_metadata(b"%PDF-1.4\nthis is not really a pdf");
    assert!(matches!(result, Err(BibsyncError::DocumentParse(_))));
  }

  #[test]
  fn test_pdfdoc_encoded_title() {
    let bytes = pdf_with_info(Some(dictionary! {
      "Title" => Object::String(b"\xC9tude sur les r\xE9seaux".to_vec(), StringFormat::Literal),
    }));

    let metadata = read_metadata(&bytes).unwrap().unwrap();
    assert_eq!(metadata.title.as_deref(), Some("\u{c9}tude sur les r\u{e9}seaux"));

    let record = synthesize(&metadata, "a.pdf", &FixedClock(2020));
    assert_eq!(record.key, "\u{e9}tude2020");
  }

  #[test]
  fn test_non_string_field_is_none() {
    let bytes = pdf_with_info(Some(dictionary! {
      "Title" => 42,
      "Author" => Object::string_literal("Someone"),
    }));

    let metadata = read_metadata(&bytes).unwrap().unwrap();

    assert_eq!(metadata.title, None);
    assert_eq!(metadata.author.as_deref(), Some("Someone"));
  }
}
