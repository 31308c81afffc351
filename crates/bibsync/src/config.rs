//! Serializable configuration for a sync run.
//!
//! Configuration can be built in code with the `with_*` methods or loaded from a TOML file.
//! Every key is optional in the file; missing keys take their [`Default`] values.
//!
//! ```toml
//! webdav_url = "https://dav.example.org/zotero"
//! username = "alice"
//! password = "hunter2"
//! output_dir = "extracted_pdfs"
//! bibliography_path = "library.bib"
//! cleanup = true
//! key_policy = "disambiguate"
//! ```

use super::*;

/// Default folder extracted documents are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_pdfs";

/// Default extension of the archives picked up from the remote store.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = ".zip";

/// Settings shared by the remote store client and the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base URL of the WebDAV folder holding the archives
  pub webdav_url:        String,
  /// WebDAV user name
  pub username:          String,
  /// WebDAV password
  pub password:          String,
  /// Folder below `webdav_url` to list, empty for the base folder itself
  pub subpath:           String,
  /// Only remote files ending with this are treated as archives
  pub archive_extension: String,
  /// Where documents are extracted to while they are processed
  pub output_dir:        PathBuf,
  /// BibTeX file new citations are appended to
  pub bibliography_path: PathBuf,
  /// Delete extracted documents once their citations are written
  pub cleanup:           bool,
  /// Reject servers presenting invalid TLS certificates
  pub verify_tls:        bool,
  /// How to treat repeated citation keys
  pub key_policy:        KeyPolicy,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      webdav_url:        String::new(),
      username:          String::new(),
      password:          String::new(),
      subpath:           String::new(),
      archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
      output_dir:        PathBuf::from(DEFAULT_OUTPUT_DIR),
      bibliography_path: PathBuf::new(),
      cleanup:           true,
      verify_tls:        false,
      key_policy:        KeyPolicy::default(),
    }
  }
}

impl Config {
  /// Returns the default location of the configuration file.
  ///
  /// - On Unix: `~/.config/bibsync/config.toml`
  /// - On macOS: `~/Library/Application Support/bibsync/config.toml`
  /// - On Windows: `%APPDATA%\bibsync\config.toml`
  /// - Fallback: `./bibsync/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("bibsync").join("config.toml")
  }

  /// Loads a configuration from a TOML file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
  }

  /// Sets the WebDAV base URL.
  pub fn with_webdav_url(mut self, url: impl Into<String>) -> Self {
    self.webdav_url = url.into();
    self
  }

  /// Sets the WebDAV user name and password.
  pub fn with_credentials(
    mut self,
    username: impl Into<String>,
    password: impl Into<String>,
  ) -> Self {
    self.username = username.into();
    self.password = password.into();
    self
  }

  /// Sets the folder below the base URL to list.
  pub fn with_subpath(mut self, subpath: impl Into<String>) -> Self {
    self.subpath = subpath.into();
    self
  }

  /// Sets the extension remote archives must carry.
  pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
    self.archive_extension = extension.into();
    self
  }

  /// Sets the folder documents are extracted to.
  pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.output_dir = dir.as_ref().to_path_buf();
    self
  }

  /// Sets the BibTeX file citations are appended to.
  pub fn with_bibliography_path(mut self, path: impl AsRef<Path>) -> Self {
    self.bibliography_path = path.as_ref().to_path_buf();
    self
  }

  /// Chooses whether extracted documents are deleted after processing.
  pub fn with_cleanup(mut self, cleanup: bool) -> Self {
    self.cleanup = cleanup;
    self
  }

  /// Chooses whether server certificates are verified.
  pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
    self.verify_tls = verify_tls;
    self
  }

  /// Sets the policy for repeated citation keys.
  pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
    self.key_policy = key_policy;
    self
  }

  /// Checks that everything a sync run needs is present.
  pub fn validate(&self) -> Result<()> {
    if self.webdav_url.trim().is_empty() {
      return Err(BibsyncError::Config("No WebDAV URL configured.".to_string()));
    }
    if self.bibliography_path.as_os_str().is_empty() {
      return Err(BibsyncError::Config("No BibTeX output path configured.".to_string()));
    }
    if self.output_dir.as_os_str().is_empty() {
      return Err(BibsyncError::Config("No output directory configured.".to_string()));
    }
    Ok(())
  }
}
