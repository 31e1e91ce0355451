//! Domain models for toth.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// DOCUMENT
// =============================================================================

/// Closed set of document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Course,
    Exercise,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Course => write!(f, "COURSE"),
            Self::Exercise => write!(f, "EXERCISE"),
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "COURSE" => Ok(Self::Course),
            "EXERCISE" => Ok(Self::Exercise),
            _ => Err(format!("Invalid document type: {}", s)),
        }
    }
}

/// A document record. `filename` names the blob under the storage root and is
/// only ever set by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    #[serde(default)]
    pub filename: Option<String>,
}

impl Document {
    /// The stored filename, treating an empty string the same as absent.
    pub fn stored_filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }
}

/// Fields needed to insert a new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub title: String,
    pub kind: DocumentKind,
}

/// Request body for creating or updating a document.
///
/// Creation requires `id` to be absent, update requires it to be present.
/// The filename is not part of the body; it is owned by the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
}

impl DocumentRequest {
    pub fn validate(&self) -> Result<()> {
        require_title(&self.title)
    }

    pub fn into_new(self) -> NewDocument {
        NewDocument {
            title: self.title.trim().to_string(),
            kind: self.kind,
        }
    }
}

// =============================================================================
// CCP
// =============================================================================

/// A CCP groups documents (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ccp {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub documents: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCcp {
    pub title: String,
    pub documents: Vec<i64>,
}

/// Request body for creating or updating a CCP.
#[derive(Debug, Clone, Deserialize)]
pub struct CcpRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub documents: Vec<i64>,
}

impl CcpRequest {
    pub fn validate(&self) -> Result<()> {
        require_title(&self.title)
    }

    pub fn into_new(self) -> NewCcp {
        let mut documents = self.documents;
        documents.sort_unstable();
        documents.dedup();
        NewCcp {
            title: self.title.trim().to_string(),
            documents,
        }
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub ccp_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvaluation {
    pub title: String,
    pub ccp_id: Option<i64>,
}

/// Request body for creating or updating an evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub ccp_id: Option<i64>,
}

impl EvaluationRequest {
    pub fn validate(&self) -> Result<()> {
        require_title(&self.title)
    }

    pub fn into_new(self) -> NewEvaluation {
        NewEvaluation {
            title: self.title.trim().to_string(),
            ccp_id: self.ccp_id,
        }
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("title must not be empty".to_string()));
    }
    Ok(())
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Zero-based page request, deserializable from `?page=&size=`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    /// Page index, never negative.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(defaults::PAGE_INDEX).max(0)
    }

    /// Page size clamped to `1..=PAGE_SIZE_MAX`.
    pub fn size(&self) -> i64 {
        self.size
            .unwrap_or(defaults::PAGE_SIZE)
            .clamp(1, defaults::PAGE_SIZE_MAX)
    }

    pub fn offset(&self) -> i64 {
        self.page().saturating_mul(self.size())
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            size: request.size(),
        }
    }

    /// Number of pages needed to show `total` rows; at least 1.
    pub fn total_pages(&self) -> i64 {
        ((self.total + self.size - 1) / self.size).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }
}
