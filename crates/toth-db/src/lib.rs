//! # toth-db
//!
//! PostgreSQL database layer and local document file storage for toth.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for documents, CCPs and evaluations
//! - Document file storage bound to `Document` records
//!
//! ## Example
//!
//! ```rust,ignore
//! use toth_db::{Database, DocumentKind, DocumentRepository, NewDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/toth").await?;
//!
//!     let doc = db.documents.insert(NewDocument {
//!         title: "Intro to Rust".to_string(),
//!         kind: DocumentKind::Course,
//!     }).await?;
//!
//!     println!("Created document: {}", doc.id);
//!     Ok(())
//! }
//! ```
pub mod ccps;
pub mod documents;
pub mod evaluations;
pub mod file_storage;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use the in-memory repositories
pub mod test_fixtures;

use std::sync::Arc;

// Re-export core types
pub use toth_core::*;

pub use ccps::PgCcpRepository;
pub use documents::PgDocumentRepository;
pub use evaluations::PgEvaluationRepository;
pub use file_storage::{
    BlobReader, DocumentFileStorage, FilesystemBackend, StorageBackend, StoredFile,
};
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub documents: Arc<PgDocumentRepository>,
    pub ccps: Arc<PgCcpRepository>,
    pub evaluations: Arc<PgEvaluationRepository>,
    /// Document file storage (requires backend configuration).
    /// Use `with_file_storage` to configure.
    pub file_storage: Option<DocumentFileStorage>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            documents: Arc::new(PgDocumentRepository::new(pool.clone())),
            ccps: Arc::new(PgCcpRepository::new(pool.clone())),
            evaluations: Arc::new(PgEvaluationRepository::new(pool.clone())),
            file_storage: None,
            pool,
        }
    }

    /// Configure document file storage with a backend and upload size limit.
    pub fn with_file_storage(
        mut self,
        backend: impl StorageBackend + 'static,
        max_upload_bytes: usize,
    ) -> Self {
        self.file_storage = Some(DocumentFileStorage::new(
            self.documents.clone(),
            backend,
            max_upload_bytes,
        ));
        self
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
