use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::StoreRepository;
use crate::domain::{
    Cancellation, IntegrationPlatform, NewStore, Store, StoreHistory, StoreIntegration, StoreStatus,
};
use crate::error::Result;

const STORE_COLUMNS: &str = "id, name, description, user_id, email, phone, status, registered_at, \
     confirmed_at, updated_at, deleted_at, registered_by, deleted_by";

/// PostgreSQL-backed store repository.
#[derive(Clone)]
pub struct PostgresStoreRepository {
    pool: PgPool,
}

impl PostgresStoreRepository {
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

    fn row_to_store(row: &PgRow) -> Result<Store> {
        let status: String = row.try_get("status")?;
        Ok(Store {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            status: status.parse::<StoreStatus>().map_err(decode_error)?,
            registered_at: row.try_get("registered_at")?,
            confirmed_at: row.try_get("confirmed_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            registered_by: row.try_get("registered_by")?,
            deleted_by: row.try_get("deleted_by")?,
            integrations: Vec::new(),
            histories: Vec::new(),
        })
    }

    /// Fills integrations and histories of the given stores.
    async fn load_children(&self, mut stores: Vec<Store>) -> Result<Vec<Store>> {
        if stores.is_empty() {
            return Ok(stores);
        }
        let ids: Vec<i64> = stores.iter().map(|s| s.id).collect();

        let integrations = sqlx::query(
            "SELECT id, store_id, platform, platform_id FROM store_integration \
             WHERE store_id = ANY($1) ORDER BY id",
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        for row in integrations {
            let store_id: i64 = row.try_get("store_id")?;
            let platform: String = row.try_get("platform")?;
            let integration = StoreIntegration {
                id: row.try_get("id")?,
                platform: platform
                    .parse::<IntegrationPlatform>()
                    .map_err(decode_error)?,
                platform_id: row.try_get("platform_id")?,
            };
            if let Some(store) = stores.iter_mut().find(|s| s.id == store_id) {
                store.integrations.push(integration);
            }
        }

        let histories = sqlx::query(
            "SELECT id, store_id, history, created_at FROM store_history \
             WHERE store_id = ANY($1) ORDER BY id",
        )
        .bind(ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        for row in histories {
            let store_id: i64 = row.try_get("store_id")?;
            let history = StoreHistory {
                id: row.try_get("id")?,
                history: row.try_get("history")?,
                created_at: row.try_get("created_at")?,
            };
            if let Some(store) = stores.iter_mut().find(|s| s.id == store_id) {
                store.histories.push(history);
            }
        }

        Ok(stores)
    }
}

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

#[async_trait]
impl StoreRepository for PostgresStoreRepository {
    async fn save(&self, store: NewStore) -> Result<Store> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO store (name, description, user_id, email, phone, status,
                               registered_at, confirmed_at, updated_at, registered_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $9)
            RETURNING {STORE_COLUMNS}
            "#
        ))
        .bind(&store.name)
        .bind(&store.description)
        .bind(store.user_id)
        .bind(&store.email)
        .bind(&store.phone)
        .bind(store.status.as_str())
        .bind(store.registered_at)
        .bind(store.confirmed_at)
        .bind(store.registered_by)
        .fetch_one(&mut *tx)
        .await?;
        let mut saved = Self::row_to_store(&row)?;

        let integration_id: i64 = sqlx::query_scalar(
            "INSERT INTO store_integration (store_id, platform, platform_id) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(saved.id)
        .bind(store.integration.platform.as_str())
        .bind(&store.integration.platform_id)
        .fetch_one(&mut *tx)
        .await?;

        let history_id: i64 = sqlx::query_scalar(
            "INSERT INTO store_history (store_id, history, created_at) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(saved.id)
        .bind(&store.history)
        .bind(store.registered_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        saved.integrations.push(StoreIntegration {
            id: integration_id,
            platform: store.integration.platform,
            platform_id: store.integration.platform_id,
        });
        saved.histories.push(StoreHistory {
            id: history_id,
            history: store.history,
            created_at: store.registered_at,
        });
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Store>> {
        let row = sqlx::query(&format!("SELECT {STORE_COLUMNS} FROM store WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let store = Self::row_to_store(&row)?;
        Ok(self.load_children(vec![store]).await?.pop())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Store>> {
        let rows = sqlx::query(&format!(
            "SELECT {STORE_COLUMNS} FROM store \
             WHERE user_id = $1 AND deleted_at IS NULL ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let stores = rows
            .iter()
            .map(Self::row_to_store)
            .collect::<Result<Vec<_>>>()?;
        self.load_children(stores).await
    }

    async fn cancel(&self, id: i64, cancellation: &Cancellation) -> Result<Option<Store>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE store
            SET deleted_at = $2, deleted_by = $3, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(cancellation.deleted_at)
        .bind(cancellation.deleted_by)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("INSERT INTO store_history (store_id, history, created_at) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&cancellation.history)
            .bind(cancellation.deleted_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_by_id(id).await
    }
}
