//! Command line front end for bibsync.
//!
//! Lists the ZIP archives in a WebDAV folder, pulls the PDFs out of each one, and appends a BibTeX
//! entry per PDF to a citation file.
//!
//! # Usage
//!
//! ```bash
//! # One-off run with everything on the command line
//! bibsync --webdav-url https://dav.example.org/zotero \
//!   --username alice --password hunter2 --bibtex-path library.bib
//!
//! # Settings from a TOML file, keeping the extracted PDFs around
//! bibsync --config bibsync.toml --no-cleanup -vv
//! ```
//!
//! Without `--config`, the platform configuration file (see [`Config::default_path`]) is read if
//! it exists. Flags always take precedence over file values.
//!
//! Errors are printed rather than turned into a failing exit status.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use bibsync::{
  citation::KeyPolicy, pipeline::Pipeline, sync::sync, webdav::WebDavClient, Config,
};
use clap::{builder::ArgAction, Parser};
use console::style;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod error;

use crate::error::*;

/// Prefix for information messages
static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
static WARNING_PREFIX: &str = "⚠️ ";
/// Prefix for error messages
static ERROR_PREFIX: &str = "✗ ";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Update a BibTeX file from PDF archives on a WebDAV share")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
  verbose: u8,

  /// TOML configuration file. Flags override its values.
  #[arg(long, short)]
  config: Option<PathBuf>,

  /// WebDAV server URL
  #[arg(long)]
  webdav_url: Option<String>,

  /// WebDAV username
  #[arg(long)]
  username: Option<String>,

  /// WebDAV password
  #[arg(long)]
  password: Option<String>,

  /// Directory to extract PDFs to [default: extracted_pdfs]
  #[arg(long)]
  output_dir: Option<PathBuf>,

  /// BibTeX file to update
  #[arg(long)]
  bibtex_path: Option<PathBuf>,

  /// Folder below the WebDAV URL holding the archives
  #[arg(long)]
  subpath: Option<String>,

  /// Extension of the remote archives [default: .zip]
  #[arg(long)]
  extension: Option<String>,

  /// Keep extracted PDFs after the BibTeX file is updated
  #[arg(long)]
  no_cleanup: bool,

  /// Reject servers with invalid TLS certificates
  #[arg(long)]
  verify_tls: bool,

  /// Suffix repeated citation keys with a, b, c, ...
  #[arg(long)]
  unique_keys: bool,
}

impl Cli {
  /// Builds the run configuration: file values first, then flag overrides.
  fn config(&self) -> Result<Config> {
    let mut config = match &self.config {
      Some(path) if !path.exists() => {
        return Err(CliError::MissingConfig(path.display().to_string()))
      },
      Some(path) => Config::load(path)?,
      None if Config::default_path().exists() => Config::load(Config::default_path())?,
      None => Config::default(),
    };

    if let Some(url) = &self.webdav_url {
      config = config.with_webdav_url(url);
    }
    if let Some(username) = &self.username {
      config.username = username.clone();
    }
    if let Some(password) = &self.password {
      config.password = password.clone();
    }
    if let Some(dir) = &self.output_dir {
      config = config.with_output_dir(dir);
    }
    if let Some(path) = &self.bibtex_path {
      config = config.with_bibliography_path(path);
    }
    if let Some(subpath) = &self.subpath {
      config = config.with_subpath(subpath);
    }
    if let Some(extension) = &self.extension {
      config = config.with_archive_extension(extension);
    }
    if self.no_cleanup {
      config = config.with_cleanup(false);
    }
    if self.verify_tls {
      config = config.with_verify_tls(true);
    }
    if self.unique_keys {
      config = config.with_key_policy(KeyPolicy::Disambiguate);
    }

    config.validate()?;
    Ok(config)
  }
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Runs one sync and prints what each archive produced.
async fn run(cli: &Cli) -> Result<()> {
  let config = cli.config()?;
  trace!("Effective configuration: {:?}", Config { password: "***".into(), ..config.clone() });

  let client = WebDavClient::new(&config)?;
  let pipeline = Pipeline::from_config(&config);
  let report = sync(&client, &pipeline).await?;

  if report.archives.is_empty() {
    println!(
      "{} No archives found at {}",
      style(INFO_PREFIX).blue(),
      style(&config.webdav_url).yellow()
    );
    return Ok(());
  }

  for archive in &report.archives {
    println!("\n{} Archive {}", style(INFO_PREFIX).blue(), style(&archive.name).cyan());
    match &archive.outcome {
      Ok(processed) => {
        println!("\n{}", style("Extracted PDFs:").bold());
        for path in processed.extracted_paths() {
          println!("- {}", path.display());
        }
        println!("\n{}", style("Generated BibTeX:").bold());
        println!("{}", processed.batch_text);
      },
      Err(e) => {
        println!("{} Skipped {}: {}", style(WARNING_PREFIX).yellow(), archive.name, e);
      },
    }
  }

  debug!("{} of {} archives failed", report.failed().count(), report.archives.len());
  println!(
    "\n{} Added {} citations to {}",
    style(SUCCESS_PREFIX).green(),
    style(report.record_count()).bold(),
    style(pipeline.bibliography_path().display()).yellow()
  );
  Ok(())
}

/// Entry point for the bibsync CLI.
///
/// Any error is printed as `Error: ...`; the exit status stays successful.
#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  if let Err(e) = run(&cli).await {
    println!("{} Error: {e}", style(ERROR_PREFIX).red());
  }
}
