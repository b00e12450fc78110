use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use stocktake_core::KeyValueStore;

pub async fn connect_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Hosted backend: one row per (owner, collection) holding the JSON array.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    owner_id: String,
}

impl PostgresStore {
    pub fn new(pool: PgPool, owner_id: impl Into<String>) -> Self {
        Self {
            pool,
            owner_id: owner_id.into(),
        }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                owner_id TEXT NOT NULL,
                collection_key TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (owner_id, collection_key)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create collections table")?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            "SELECT payload FROM collections WHERE owner_id = $1 AND collection_key = $2",
        )
        .bind(&self.owner_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load collection {key}"))?;

        row.map(|row| row.try_get::<String, _>("payload"))
            .transpose()
            .map_err(Into::into)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO collections (owner_id, collection_key, payload, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (owner_id, collection_key)
            DO UPDATE SET payload = EXCLUDED.payload, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&self.owner_id)
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to store collection {key}"))?;

        Ok(())
    }
}
