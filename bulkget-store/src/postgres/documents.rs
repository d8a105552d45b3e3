use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::error::StoreError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub key: String,
    pub value: JsonValue,
    pub revision: i64,
    pub updated_at: DateTime<Utc>,
}

pub async fn get_document(pool: &PgPool, key: &str) -> Result<Option<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
SELECT key, value, revision, updated_at
FROM documents
WHERE key = $1
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

/// Inserts or replaces each document in one transaction. Returns the new revisions in input order.
pub async fn upsert_documents(
    pool: &PgPool,
    docs: &[(String, JsonValue)],
) -> Result<Vec<i64>, StoreError> {
    let mut tx = pool.begin().await?;
    let mut revisions = Vec::with_capacity(docs.len());

    for (key, value) in docs {
        let revision: i64 = sqlx::query_scalar(
            r#"
INSERT INTO documents (key, value, revision, updated_at)
VALUES ($1, $2, 1, now())
ON CONFLICT (key) DO UPDATE
  SET value = EXCLUDED.value,
      revision = documents.revision + 1,
      updated_at = now()
RETURNING revision
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&mut *tx)
        .await?;
        revisions.push(revision);
    }

    tx.commit().await?;
    tracing::debug!(documents = revisions.len(), "upserted documents");
    Ok(revisions)
}

pub async fn count_documents(pool: &PgPool) -> Result<i64, StoreError> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
