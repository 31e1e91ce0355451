//! Error types for toth.

use thiserror::Error;

/// Result type alias using toth's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for toth operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document record not found
    #[error("Document not found: {0}")]
    DocumentNotFound(i64),

    /// A supplied or stored filename resolves outside the storage root
    #[error("Path traversal rejected: {0}")]
    PathTraversal(String),

    /// The storage root could not be created at startup
    #[error("Storage initialization failed: {0}")]
    StorageInit(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the "record or blob is absent" family.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::DocumentNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_document_not_found() {
        let err = Error::DocumentNotFound(999);
        assert_eq!(err.to_string(), "Document not found: 999");
    }

    #[test]
    fn test_error_display_path_traversal() {
        let err = Error::PathTraversal("../../etc/passwd".to_string());
        assert_eq!(
            err.to_string(),
            "Path traversal rejected: ../../etc/passwd"
        );
    }

    #[test]
    fn test_error_display_storage_init() {
        let err = Error::StorageInit("permission denied".to_string());
        assert_eq!(
            err.to_string(),
            "Storage initialization failed: permission denied"
        );
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty filename".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty filename");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(Error::DocumentNotFound(1).is_not_found());
        assert!(!Error::PathTraversal("..".into()).is_not_found());
        assert!(!Error::Internal("x".into()).is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
