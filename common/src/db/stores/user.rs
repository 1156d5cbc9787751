// PostgreSQL store for user accounts

use async_trait::async_trait;
use tracing::instrument;

use super::queries::user_queries::SELECT_ALL_COLUMNS;
use super::UserStore;
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{NewUser, User, UserId};

/// Store for user-related database operations
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    /// Create a new PgUserStore
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    /// Find a user by username for login
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            SELECT_ALL_COLUMNS
        ))
        .bind(username)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            SELECT_ALL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            SELECT_ALL_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .fetch_one(self.pool.pool())
        .await?;

        tracing::info!(user_id = created.id, username = %created.username, "User created");
        Ok(created)
    }
}
