//! Error types for the portal core.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;

/// Errors that can occur in the portal core.
#[derive(Debug, Error)]
pub enum PortalError {
    /// An identifier was empty or malformed.
    #[error("Invalid identifier: {identifier:?}")]
    InvalidIdentifier {
        /// The rejected identifier.
        identifier: String,
    },

    /// A display name or value was empty.
    #[error("Invalid name for {identifier:?}: {name:?}")]
    InvalidName {
        /// Identifier the name belongs to.
        identifier: String,
        /// The rejected name.
        name: String,
    },

    /// The same identifier was supplied twice.
    #[error("Duplicate identifier: {identifier}")]
    DuplicateIdentifier {
        /// The repeated identifier.
        identifier: String,
    },

    /// A bounding box was malformed or out of range.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// A temporal range was malformed or inverted.
    #[error("Invalid temporal range: {0}")]
    InvalidTemporalRange(String),

    /// No distribution with the given id.
    #[error("Distribution not found: {id}")]
    DistributionNotFound {
        /// The unknown distribution id.
        id: String,
    },

    /// Failed to read a catalog file.
    #[error("Failed to read catalog: {path}")]
    CatalogRead {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An endpoint URL could not be parsed.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Failed to access clipboard.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be written or read.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PortalError {
    /// Create an InvalidIdentifier error.
    pub fn invalid_identifier(identifier: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
        }
    }

    /// Create an InvalidName error.
    pub fn invalid_name(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self::InvalidName {
            identifier: identifier.into(),
            name: name.into(),
        }
    }

    /// Create a DuplicateIdentifier error.
    pub fn duplicate_identifier(identifier: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            identifier: identifier.into(),
        }
    }

    /// Create a DistributionNotFound error.
    pub fn distribution_not_found(id: impl Into<String>) -> Self {
        Self::DistributionNotFound { id: id.into() }
    }

    /// Create a CatalogRead error.
    pub fn catalog_read(path: PathBuf, source: std::io::Error) -> Self {
        Self::CatalogRead { path, source }
    }
}
