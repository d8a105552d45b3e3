use std::time::Duration;

use async_trait::async_trait;
use bulkget_core::{ClientError, Document, KeyValueClient};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::error::StoreError;

use super::documents;

/// Documents stored in a Postgres `documents` table, keyed by text.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn upsert_many(&self, docs: &[(String, JsonValue)]) -> Result<Vec<i64>, StoreError> {
        documents::upsert_documents(&self.pool, docs).await
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        documents::count_documents(&self.pool).await
    }
}

#[async_trait]
impl KeyValueClient for PostgresClient {
    async fn get(&self, key: &str, timeout: Duration) -> Result<Document, ClientError> {
        match tokio::time::timeout(timeout, documents::get_document(&self.pool, key)).await {
            Err(_) => Err(ClientError::Timeout),
            Ok(Ok(Some(row))) => Ok(Document {
                value: row.value,
                revision: Some(row.revision.to_string()),
            }),
            Ok(Ok(None)) => Err(ClientError::NotFound),
            Ok(Err(e)) => Err(map_sqlx_error(e)),
        }
    }
}

fn map_sqlx_error(e: sqlx::Error) -> ClientError {
    match e {
        sqlx::Error::PoolTimedOut => ClientError::Timeout,
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
            ClientError::Connection(e.to_string())
        }
        other => ClientError::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_map_to_client_errors() {
        assert_eq!(map_sqlx_error(sqlx::Error::PoolTimedOut), ClientError::Timeout);
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            ClientError::Connection(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            ClientError::Other(_)
        ));
    }
}
