//! Structured logging schema and field name constants for toth.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue or known inconsistency (orphaned blob, record/disk drift) |
//! | INFO  | Lifecycle events (startup, shutdown), completed uploads |
//! | DEBUG | Decision points, resolved paths, config choices |
//! | TRACE | Per-chunk streaming |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request. Format: UUIDv7.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "storage"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "path_resolver", "blob_store", "binder", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "store", "load", "write", "open", "initialize"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document id being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Cleaned filename as stored on disk and in the record.
pub const FILENAME: &str = "filename";

/// Absolute path of a blob or of the storage root.
pub const STORAGE_PATH: &str = "storage_path";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Payload size in bytes.
pub const SIZE_BYTES: &str = "size_bytes";

/// Number of results returned by a list query.
pub const RESULT_COUNT: &str = "result_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
