//! Error types for bhumibandhu.
//!
//! This module defines all error types used throughout the bhumibandhu crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bhumibandhu operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The persisted record snapshot could not be decoded.
    #[error("record snapshot in slot '{slot}' is malformed: {source}")]
    SnapshotCorrupt {
        /// Name of the slot holding the snapshot.
        slot: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Record Store Errors ===
    /// The record store was used before it finished initializing.
    #[error("record store is not ready (state: {state})")]
    StoreNotReady {
        /// The state the store was in.
        state: String,
    },

    /// A record violates one of the data model invariants.
    #[error("invalid land record '{land_id}': {reason}")]
    InvalidRecord {
        /// Identifier of the offending record.
        land_id: String,
        /// Which invariant was violated.
        reason: String,
    },

    /// A record with the same land id already exists.
    #[error("a land record with id '{0}' already exists")]
    DuplicateLandId(String),

    /// No record carries the requested land id.
    #[error("no land record with id '{0}'")]
    RecordNotFound(String),

    // === Conversion Errors ===
    /// The area unit key is not in the conversion table.
    #[error("unknown area unit '{0}'")]
    UnknownUnit(String),

    // === Document Errors ===
    /// A document could not be fetched from its link.
    #[error("failed to fetch document from {link}: {message}")]
    DocumentFetch {
        /// The document link.
        link: String,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for bhumibandhu operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid record error.
    #[must_use]
    pub fn invalid_record(land_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            land_id: land_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a document fetch error.
    #[must_use]
    pub fn document_fetch(link: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentFetch {
            link: link.into(),
            message: message.into(),
        }
    }

    /// Check if this error indicates the store was used before it was ready.
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::StoreNotReady { .. })
    }

    /// Check if this error is a record invariant violation.
    #[must_use]
    pub fn is_invalid_record(&self) -> bool {
        matches!(self, Self::InvalidRecord { .. })
    }
}
