//! PostgreSQL implementation of CcpRepository.
//!
//! Document membership lives in the `ccp_documents` join table and is
//! replaced wholesale on every save.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row, Transaction};

use toth_core::{Ccp, CcpRepository, Error, NewCcp, Page, PageRequest, Result};

const CCP_SELECT: &str = r#"
    SELECT c.id, c.title,
           COALESCE(
               array_agg(cd.documents_id ORDER BY cd.documents_id)
                   FILTER (WHERE cd.documents_id IS NOT NULL),
               '{}'
           ) AS documents
    FROM ccp c
    LEFT JOIN ccp_documents cd ON cd.ccp_id = c.id
"#;

pub struct PgCcpRepository {
    pool: Pool<Postgres>,
}

impl PgCcpRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn replace_documents_tx(
        tx: &mut Transaction<'_, Postgres>,
        ccp_id: i64,
        documents: &[i64],
    ) -> Result<()> {
        sqlx::query("DELETE FROM ccp_documents WHERE ccp_id = $1")
            .bind(ccp_id)
            .execute(&mut **tx)
            .await?;

        if !documents.is_empty() {
            sqlx::query(
                r#"INSERT INTO ccp_documents (ccp_id, documents_id)
                   SELECT $1, unnest($2::BIGINT[])
                   ON CONFLICT DO NOTHING"#,
            )
            .bind(ccp_id)
            .bind(documents)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CcpRepository for PgCcpRepository {
    async fn get(&self, id: i64) -> Result<Option<Ccp>> {
        let row = sqlx::query(&format!("{} WHERE c.id = $1 GROUP BY c.id", CCP_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(ccp_from_row))
    }

    async fn insert(&self, ccp: NewCcp) -> Result<Ccp> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar("INSERT INTO ccp (title) VALUES ($1) RETURNING id")
            .bind(&ccp.title)
            .fetch_one(&mut *tx)
            .await?;
        Self::replace_documents_tx(&mut tx, id, &ccp.documents).await?;

        tx.commit().await?;
        Ok(Ccp {
            id,
            title: ccp.title,
            documents: ccp.documents,
        })
    }

    async fn save(&self, ccp: &Ccp) -> Result<Ccp> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE ccp SET title = $2 WHERE id = $1")
            .bind(ccp.id)
            .bind(&ccp.title)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!("CCP {} not found", ccp.id)));
        }
        Self::replace_documents_tx(&mut tx, ccp.id, &ccp.documents).await?;

        tx.commit().await?;
        Ok(ccp.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM ccp WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("CCP {} not found", id)));
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Ccp>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ccp")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "{} GROUP BY c.id ORDER BY c.id LIMIT $1 OFFSET $2",
            CCP_SELECT
        ))
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.iter().map(ccp_from_row).collect(), total, &page))
    }
}

fn ccp_from_row(row: &PgRow) -> Ccp {
    Ccp {
        id: row.get("id"),
        title: row.get("title"),
        documents: row.get("documents"),
    }
}
