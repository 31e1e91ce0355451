//! Core traits for toth abstractions.
//!
//! These traits define the relational-store surface the rest of the system
//! consumes, so the file-storage binder and the HTTP layer can run against
//! PostgreSQL or an in-memory fixture.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, id: i64) -> Result<Option<Document>>;

    /// Insert a new document; the store assigns the id.
    async fn insert(&self, document: NewDocument) -> Result<Document>;

    /// Persist every mutable field of an existing document.
    ///
    /// Returns `Error::DocumentNotFound` if no row has `document.id`.
    async fn save(&self, document: &Document) -> Result<Document>;

    /// Delete a document. Returns `Error::DocumentNotFound` if absent.
    async fn delete(&self, id: i64) -> Result<()>;

    /// List documents ordered by id.
    async fn list(&self, page: PageRequest) -> Result<Page<Document>>;
}

// =============================================================================
// CCP REPOSITORY
// =============================================================================

#[async_trait]
pub trait CcpRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Ccp>>;

    async fn insert(&self, ccp: NewCcp) -> Result<Ccp>;

    /// Replace title and document membership of an existing CCP.
    async fn save(&self, ccp: &Ccp) -> Result<Ccp>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn list(&self, page: PageRequest) -> Result<Page<Ccp>>;
}

// =============================================================================
// EVALUATION REPOSITORY
// =============================================================================

#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Evaluation>>;

    async fn insert(&self, evaluation: NewEvaluation) -> Result<Evaluation>;

    async fn save(&self, evaluation: &Evaluation) -> Result<Evaluation>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn list(&self, page: PageRequest) -> Result<Page<Evaluation>>;
}
