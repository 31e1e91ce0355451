//! PostgreSQL implementation of DocumentRepository.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;

use toth_core::{
    Document, DocumentKind, DocumentRepository, Error, NewDocument, Page, PageRequest, Result,
};

const DOCUMENT_COLUMNS: &str = r#"id, title, "type", filename"#;

pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn get(&self, id: i64) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM document WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn insert(&self, document: NewDocument) -> Result<Document> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO document (title, "type") VALUES ($1, $2) RETURNING {}"#,
            DOCUMENT_COLUMNS
        ))
        .bind(&document.title)
        .bind(document.kind.to_string())
        .fetch_one(&self.pool)
        .await?;

        let created = document_from_row(&row)?;
        debug!(
            subsystem = "db",
            db_table = "document",
            op = "insert",
            document_id = created.id,
            "Document created"
        );
        Ok(created)
    }

    async fn save(&self, document: &Document) -> Result<Document> {
        let row = sqlx::query(&format!(
            r#"UPDATE document SET title = $2, "type" = $3, filename = $4
               WHERE id = $1
               RETURNING {}"#,
            DOCUMENT_COLUMNS
        ))
        .bind(document.id)
        .bind(&document.title)
        .bind(document.kind.to_string())
        .bind(&document.filename)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::DocumentNotFound(document.id))?;

        document_from_row(&row)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM document WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::DocumentNotFound(id));
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Document>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM document ORDER BY id LIMIT $1 OFFSET $2",
            DOCUMENT_COLUMNS
        ))
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(document_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, &page))
    }
}

fn document_from_row(row: &PgRow) -> Result<Document> {
    let kind: String = row.get("type");
    Ok(Document {
        id: row.get("id"),
        title: row.get("title"),
        kind: kind.parse::<DocumentKind>().map_err(Error::Internal)?,
        filename: row.get("filename"),
    })
}
