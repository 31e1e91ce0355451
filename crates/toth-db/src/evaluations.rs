//! PostgreSQL implementation of EvaluationRepository.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use toth_core::{
    Error, Evaluation, EvaluationRepository, NewEvaluation, Page, PageRequest, Result,
};

pub struct PgEvaluationRepository {
    pool: Pool<Postgres>,
}

impl PgEvaluationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationRepository for PgEvaluationRepository {
    async fn get(&self, id: i64) -> Result<Option<Evaluation>> {
        let row = sqlx::query("SELECT id, title, ccp_id FROM evaluation WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(evaluation_from_row))
    }

    async fn insert(&self, evaluation: NewEvaluation) -> Result<Evaluation> {
        let row = sqlx::query(
            r#"INSERT INTO evaluation (title, ccp_id) VALUES ($1, $2)
               RETURNING id, title, ccp_id"#,
        )
        .bind(&evaluation.title)
        .bind(evaluation.ccp_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(evaluation_from_row(&row))
    }

    async fn save(&self, evaluation: &Evaluation) -> Result<Evaluation> {
        let row = sqlx::query(
            r#"UPDATE evaluation SET title = $2, ccp_id = $3
               WHERE id = $1
               RETURNING id, title, ccp_id"#,
        )
        .bind(evaluation.id)
        .bind(&evaluation.title)
        .bind(evaluation.ccp_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Evaluation {} not found", evaluation.id)))?;
        Ok(evaluation_from_row(&row))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM evaluation WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Evaluation {} not found", id)));
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Evaluation>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM evaluation")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT id, title, ccp_id FROM evaluation ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(
            rows.iter().map(evaluation_from_row).collect(),
            total,
            &page,
        ))
    }
}

fn evaluation_from_row(row: &PgRow) -> Evaluation {
    Evaluation {
        id: row.get("id"),
        title: row.get("title"),
        ccp_id: row.get("ccp_id"),
    }
}
