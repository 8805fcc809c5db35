//! Errors surfaced by the command-line tool.

use std::io;
use std::path::PathBuf;

use dom_to_markdown::ConversionError;

/// Everything that can stop the CLI before Markdown is written.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Standard input could not be read.
    #[error("failed to read stdin: {0}")]
    ReadStdin(#[source] io::Error),

    /// The HTTP request failed.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The URL uses a scheme this tool does not load.
    #[error("unsupported URL scheme `{0}` (expected http, https or file)")]
    UnsupportedScheme(String),

    /// A `file:` URL that does not map to a local path.
    #[error("invalid file URL `{0}`")]
    InvalidFileUrl(String),

    /// Conversion could not start.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The Markdown could not be written.
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}
