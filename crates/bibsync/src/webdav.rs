//! WebDAV listing and download.
//!
//! Listing issues a `PROPFIND` with `Depth: 1` against a folder and reads the `href` of every
//! `response` in the returned multistatus document. Downloads are plain `GET`s. Both use HTTP
//! basic authentication.
//!
//! Reference manager WebDAV targets are frequently self-hosted behind self-signed certificates,
//! so certificate verification is off unless [`Config::verify_tls`] is set. The choice is made
//! once, when the [`WebDavClient`] is built, and only affects that client.
//!
//! # Examples
//!
//! ```no_run
//! use bibsync::{webdav::WebDavClient, Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default()
//!   .with_webdav_url("https://dav.example.org/zotero")
//!   .with_credentials("alice", "hunter2");
//! let client = WebDavClient::new(&config)?;
//!
//! for name in client.list_files("").await? {
//!   let bytes = client.download_file(&name).await?;
//!   println!("{name}: {} bytes", bytes.len());
//! }
//! # Ok(())
//! # }
//! ```

use quick_xml::{events::Event, Reader};
use reqwest::{Client, Method};

use crate::sync::RemoteStore;

use super::*;

lazy_static! {
  /// WebDAV property lookup method.
  static ref PROPFIND: Method = Method::from_bytes(b"PROPFIND").unwrap();
}

/// Client for one WebDAV folder.
#[derive(Debug, Clone)]
pub struct WebDavClient {
  /// Base URL without a trailing slash
  base_url:  String,
  /// Folder below the base URL that [`RemoteStore`] operations use
  subpath:   String,
  /// Extension a listed file needs to count as an archive
  extension: String,
  /// Basic auth user name
  username:  String,
  /// Basic auth password
  password:  String,
  /// Underlying HTTP client
  client:    Client,
}

impl WebDavClient {
  /// Builds a client for the WebDAV folder described by `config`.
  ///
  /// # Errors
  ///
  /// Returns [`BibsyncError::InvalidUrl`] if the configured URL does not parse and
  /// [`BibsyncError::Network`] if the HTTP client cannot be constructed.
  pub fn new(config: &Config) -> Result<Self> {
    let base_url = config.webdav_url.trim().trim_end_matches('/').to_string();
    Url::parse(&base_url)?;

    if !config.verify_tls {
      debug!("TLS certificate verification disabled for {base_url}");
    }
    let client = Client::builder().danger_accept_invalid_certs(!config.verify_tls).build()?;

    Ok(Self {
      base_url,
      subpath: config.subpath.trim_matches('/').to_string(),
      extension: config.archive_extension.clone(),
      username: config.username.clone(),
      password: config.password.clone(),
      client,
    })
  }

  /// Lists the archive names in the folder `path` below the base URL.
  ///
  /// # Errors
  ///
  /// Returns [`BibsyncError::Network`] when the request fails, [`BibsyncError::ApiError`] for a
  /// non-success status, and [`BibsyncError::Listing`] if the response body is not XML.
  pub async fn list_files(&self, path: &str) -> Result<Vec<String>> {
    let url = self.url_for(path)?;
    debug!("Listing {url}");

    let response = self
      .client
      .request(PROPFIND.clone(), url.clone())
      .header("Depth", "1")
      .basic_auth(&self.username, Some(&self.password))
      .send()
      .await?;

    if !response.status().is_success() {
      trace!("PROPFIND response: {response:?}");
      return Err(BibsyncError::ApiError(format!(
        "Failed to list {url}: {}",
        response.status()
      )));
    }

    let body = response.bytes().await?;
    let names = parse_multistatus(&body, &self.extension)?;
    info!("Found {} archives at {url}", names.len());
    Ok(names)
  }

  /// Downloads the file at `path` below the base URL.
  ///
  /// # Errors
  ///
  /// Returns [`BibsyncError::Network`] when the request fails and [`BibsyncError::ApiError`]
  /// for a non-success status.
  pub async fn download_file(&self, path: &str) -> Result<Vec<u8>> {
    let url = self.url_for(path)?;
    debug!("Downloading {url}");

    let response =
      self.client.get(url.clone()).basic_auth(&self.username, Some(&self.password)).send().await?;

    if response.status().is_success() {
      let bytes = response.bytes().await?;
      debug!("Downloaded {} bytes from {url}", bytes.len());
      Ok(bytes.to_vec())
    } else {
      trace!("GET response: {response:?}");
      Err(BibsyncError::ApiError(format!("Failed to download {url}: {}", response.status())))
    }
  }

  /// Joins `path` onto the base URL.
  fn url_for(&self, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))?)
  }
}

#[async_trait]
impl RemoteStore for WebDavClient {
  async fn list_archives(&self) -> Result<Vec<String>> { self.list_files(&self.subpath).await }

  async fn download(&self, name: &str) -> Result<Vec<u8>> {
    if self.subpath.is_empty() {
      self.download_file(name).await
    } else {
      self.download_file(&format!("{}/{name}", self.subpath)).await
    }
  }
}

/// Extracts file names ending in `extension` from a `DAV:` multistatus document.
///
/// Each `href` contributes its last path segment. Collections, whose `href` ends in `/`, are
/// skipped, and the extension comparison ignores case. Names are returned exactly as the server
/// wrote them, so percent-encoding is preserved.
pub fn parse_multistatus(body: &[u8], extension: &str) -> Result<Vec<String>> {
  let mut reader = Reader::from_reader(body);
  reader.config_mut().trim_text(true);
  let extension = extension.to_lowercase();

  let mut names = Vec::new();
  let mut in_href = false;
  let mut buf = Vec::new();
  loop {
    match reader.read_event_into(&mut buf)? {
      Event::Start(e) if e.local_name().as_ref() == b"href" => in_href = true,
      Event::End(e) if e.local_name().as_ref() == b"href" => in_href = false,
      Event::Text(e) if in_href => {
        let href = e.unescape()?;
        let name = href.trim().rsplit('/').next().unwrap_or_default();
        // collections end in '/', leaving an empty last segment
        if !name.is_empty() && name.to_lowercase().ends_with(&extension) {
          names.push(name.to_string());
        }
      },
      Event::Eof => break,
      _ => (),
    }
    buf.clear();
  }
  Ok(names)
}
