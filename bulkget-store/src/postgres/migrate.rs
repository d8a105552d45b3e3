use sqlx::PgPool;

use crate::error::StoreError;

pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("store migrations applied");
    Ok(())
}
