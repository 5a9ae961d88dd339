use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{FeatureToggle, FeatureToggleRepository};
use crate::error::Result;

const COLUMNS: &str = "id, name, toggle, created_at, updated_at, deleted_at";

/// PostgreSQL-backed feature toggle storage.
#[derive(Clone)]
pub struct PostgresFeatureToggleRepository {
    pool: PgPool,
}

impl PostgresFeatureToggleRepository {
    /// Creates a repository on top of an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    fn row_to_toggle(row: PgRow) -> Result<FeatureToggle> {
        Ok(FeatureToggle {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            toggle: row.try_get("toggle")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

#[async_trait]
impl FeatureToggleRepository for PostgresFeatureToggleRepository {
    async fn save(&self, name: &str, toggle: bool) -> Result<FeatureToggle> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO feature_toggle (name, toggle)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
                SET toggle = EXCLUDED.toggle, updated_at = NOW(), deleted_at = NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(name)
        .bind(toggle)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_toggle(row)
    }

    async fn find_all(&self) -> Result<Vec<FeatureToggle>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM feature_toggle WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_toggle).collect()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<FeatureToggle>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM feature_toggle WHERE name = $1 AND deleted_at IS NULL"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_toggle).transpose()
    }

    async fn delete(&self, name: &str) -> Result<Option<FeatureToggle>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE feature_toggle
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE name = $1 AND deleted_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_toggle).transpose()
    }
}
