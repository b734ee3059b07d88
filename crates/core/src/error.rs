//! Error types for document rewriting.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading rules or rewriting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// The replacement table could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The file format is not one of the handled containers.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// ZIP container error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error inside a part.
    #[error("XML error: {0}")]
    XmlError(String),

    /// A part the document model requires is absent from the package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// The package is structurally invalid.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),
}
