//! Error types for metadata operations
//!
//! This module defines the error conditions surfaced by the metadata model,
//! the XMP packet codec and the write policy.

use crate::types::key::Namespace;
use thiserror::Error;

/// Error types for metadata operations
#[derive(Debug, Error)]
pub enum MetaError {
    /// A date field could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A value or key violates a Value Model invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// The XMP packet is not well-formed XML/RDF
    #[error("Malformed XMP: {0}")]
    MalformedXmp(String),

    /// A write-back was attempted against read-only namespaces
    #[error("Unsupported write for format '{format}': read-only namespaces {rejected:?}")]
    UnsupportedWrite {
        /// Target file format identifier
        format: String,
        /// Namespaces holding entries that the format cannot store
        rejected: Vec<Namespace>,
    },

    /// Bad parameter provided to a function
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The external metadata backend reported a failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetaError {
    /// Whether a caller may reasonably absorb this condition
    ///
    /// Malformed XMP can be treated as "no XMP present" and an invalid date
    /// can be kept as raw text; everything else should abort the operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MetaError::MalformedXmp(_) | MetaError::InvalidDate(_))
    }
}

/// Result type alias for metadata operations
pub type MetaResult<T> = Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetaError::Validation("list inside list".to_string());
        assert!(err.to_string().contains("Validation error: list inside list"));
    }

    #[test]
    fn test_unsupported_write_display() {
        let err = MetaError::UnsupportedWrite {
            format: "cr2".to_string(),
            rejected: vec![Namespace::Iptc],
        };
        let msg = err.to_string();
        assert!(msg.contains("cr2"));
        assert!(msg.contains("Iptc"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MetaError = io_err.into();
        assert!(matches!(err, MetaError::Io(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable() {
        assert!(MetaError::MalformedXmp("eof".to_string()).is_recoverable());
        assert!(MetaError::InvalidDate("x".to_string()).is_recoverable());
        assert!(!MetaError::Validation("x".to_string()).is_recoverable());
    }
}
