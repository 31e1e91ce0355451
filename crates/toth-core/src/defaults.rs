//! Centralized default constants for toth.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list endpoints.
pub const PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const PAGE_SIZE_MAX: i64 = 100;

/// Default (first) page index. Pages are zero-based.
pub const PAGE_INDEX: i64 = 0;

// =============================================================================
// FILE STORAGE
// =============================================================================

/// Storage root used when `FILE_STORAGE_PATH` is not set.
pub const FILE_STORAGE_PATH: &str = "./uploads";

/// Maximum upload size in bytes (50 MiB).
///
/// Configurable via `TOTH_MAX_UPLOAD_SIZE_BYTES`.
pub const MAX_UPLOAD_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Read buffer size used when streaming a stored blob back to a client.
pub const BLOB_READ_CHUNK_BYTES: usize = 64 * 1024;

/// Content type served when the filename gives no better hint.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// =============================================================================
// SERVER
// =============================================================================

/// Default bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const SERVER_PORT: u16 = 8080;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_within_max() {
        assert!(PAGE_SIZE <= PAGE_SIZE_MAX);
        assert!(PAGE_SIZE > 0);
    }

    #[test]
    fn test_read_chunk_smaller_than_upload_limit() {
        assert!(BLOB_READ_CHUNK_BYTES < MAX_UPLOAD_SIZE_BYTES);
    }
}
