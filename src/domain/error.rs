//! Error types for the medshelf plugin.
//!
//! [`MedshelfError`] is the single error type used inside the crate. Fetch
//! outcomes that cross the store or worker boundary carry plain strings
//! instead, produced with `to_string()` from this type.

use thiserror::Error;

/// The main error type for medshelf operations.
///
/// # Examples
///
/// ```
/// use medshelf::MedshelfError;
///
/// fn require_title(title: &str) -> Result<(), MedshelfError> {
///     if title.is_empty() {
///         return Err(MedshelfError::Validation("Missing required field: title".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(require_title("").is_err());
/// ```
#[derive(Debug, Error)]
pub enum MedshelfError {
    /// Reading or writing the local catalog cache failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Theme parsing failed.
    #[error("Theme error: {0}")]
    Theme(String),

    /// Communication with the background worker failed.
    ///
    /// Raised when a worker message cannot be serialized or parsed.
    #[error("Worker communication error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The catalog service answered with an error or an unreadable body.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A product submission was rejected before any side effect happened.
    ///
    /// The message is shown to the user verbatim, so it carries no prefix.
    #[error("{0}")]
    Validation(String),

    /// Uploading a media file failed.
    #[error("Upload failed: {0}")]
    Upload(String),
}

/// A specialized `Result` type for medshelf operations.
pub type Result<T> = std::result::Result<T, MedshelfError>;
