use sqlx::PgPool;
use uuid::Uuid;

use super::UserLookup;
use crate::error::StoreResult;
use crate::models::User;

/// PostgreSQL-backed user lookup
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserLookup for PgUserRepository {
    async fn get_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users ORDER BY username ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
