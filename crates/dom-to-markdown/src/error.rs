//! Error types for the conversion pipeline.

use std::io;

/// Errors that can occur before or around a conversion.
///
/// The tree walk itself never fails; these cover configuration and input
/// acquisition.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// An `exclude` selector could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        /// The selector as supplied by the caller.
        selector: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Reading HTML from its source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;
