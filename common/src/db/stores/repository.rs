// PostgreSQL store for repository records

use async_trait::async_trait;
use tracing::instrument;

use super::queries::repository_queries::SELECT_ALL_COLUMNS;
use super::RepositoryStore;
use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{NewRepository, Repository, RepositoryId, UserId};

/// Store for repository records backed by the `repositories` table
#[derive(Clone)]
pub struct PgRepositoryStore {
    pool: DbPool,
}

impl PgRepositoryStore {
    /// Create a new PgRepositoryStore
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepositoryStore for PgRepositoryStore {
    #[instrument(skip(self, repository), fields(user_id = repository.user_id))]
    async fn insert(&self, repository: NewRepository) -> Result<Repository, DatabaseError> {
        let created = sqlx::query_as::<_, Repository>(&format!(
            r#"
            INSERT INTO repositories (url, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            SELECT_ALL_COLUMNS
        ))
        .bind(&repository.url)
        .bind(&repository.description)
        .bind(repository.user_id)
        .fetch_one(self.pool.pool())
        .await?;

        tracing::info!(repository_id = created.id, user_id = created.user_id, "Repository inserted");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: RepositoryId) -> Result<Option<Repository>, DatabaseError> {
        let repository = sqlx::query_as::<_, Repository>(&format!(
            "SELECT {} FROM repositories WHERE id = $1",
            SELECT_ALL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(repository)
    }

    #[instrument(skip(self))]
    async fn find_all_by_owner(&self, owner_id: UserId) -> Result<Vec<Repository>, DatabaseError> {
        let repositories = sqlx::query_as::<_, Repository>(&format!(
            "SELECT {} FROM repositories WHERE user_id = $1 ORDER BY id",
            SELECT_ALL_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(self.pool.pool())
        .await?;

        tracing::debug!(owner_id = owner_id, count = repositories.len(), "Listed repositories");
        Ok(repositories)
    }

    #[instrument(skip(self, repository), fields(repository_id = repository.id))]
    async fn save(&self, repository: &Repository) -> Result<Repository, DatabaseError> {
        // Only url and description are writable; id and user_id stay as stored.
        let saved = sqlx::query_as::<_, Repository>(&format!(
            r#"
            UPDATE repositories
            SET url = $2,
                description = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_ALL_COLUMNS
        ))
        .bind(repository.id)
        .bind(&repository.url)
        .bind(&repository.description)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or_else(|| {
            DatabaseError::NotFound(format!("Repository not found: {}", repository.id))
        })?;

        tracing::info!(repository_id = saved.id, "Repository updated");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: RepositoryId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM repositories WHERE id = $1")
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Repository not found: {}",
                id
            )));
        }

        tracing::info!(repository_id = id, "Repository deleted");
        Ok(())
    }
}
