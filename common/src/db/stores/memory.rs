// In-process stores with the same contract as the PostgreSQL ones.
// Used by the test suites and by the `memory` storage backend.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{RepositoryStore, UserStore};
use crate::errors::DatabaseError;
use crate::models::{NewRepository, NewUser, Repository, RepositoryId, User, UserId};

#[derive(Debug)]
struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    // Ids are never reused, even after deletes.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Repository records held in memory, keyed by id
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepositoryStore {
    table: Arc<RwLock<Table<Repository>>>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn insert(&self, repository: NewRepository) -> Result<Repository, DatabaseError> {
        let mut table = self.table.write().await;
        let id = table.next_id();
        let now = Utc::now();

        let created = Repository {
            id,
            url: repository.url,
            description: repository.description,
            user_id: repository.user_id,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: RepositoryId) -> Result<Option<Repository>, DatabaseError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_all_by_owner(&self, owner_id: UserId) -> Result<Vec<Repository>, DatabaseError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .filter(|repository| repository.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn save(&self, repository: &Repository) -> Result<Repository, DatabaseError> {
        let mut table = self.table.write().await;
        let stored = table.rows.get_mut(&repository.id).ok_or_else(|| {
            DatabaseError::NotFound(format!("Repository not found: {}", repository.id))
        })?;

        stored.url = repository.url.clone();
        stored.description = repository.description.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: RepositoryId) -> Result<(), DatabaseError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("Repository not found: {}", id)))
    }
}

/// User accounts held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    table: Arc<RwLock<Table<User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::DuplicateKey(format!(
                "Username already exists: {}",
                user.username
            )));
        }

        let id = table.next_id();
        let now = Utc::now();
        let created = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            email: user.email,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, created.clone());

        Ok(created)
    }
}
