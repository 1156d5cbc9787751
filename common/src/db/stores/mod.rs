// Persistence contracts consumed by the services, plus their implementations
//
// `Pg*` stores talk to PostgreSQL through sqlx. `InMemory*` stores keep the
// same contract in process and back the test suites and the `memory` storage
// backend.

pub mod memory;
pub mod queries;
pub mod repository;
pub mod user;

use async_trait::async_trait;

use crate::errors::DatabaseError;
use crate::models::{NewRepository, NewUser, Repository, RepositoryId, User, UserId};

pub use memory::{InMemoryRepositoryStore, InMemoryUserStore};
pub use repository::PgRepositoryStore;
pub use user::PgUserStore;

/// Storage contract for repository records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Persist a new record and return it with its assigned id
    async fn insert(&self, repository: NewRepository) -> Result<Repository, DatabaseError>;

    /// Look up a record by id
    async fn find_by_id(&self, id: RepositoryId) -> Result<Option<Repository>, DatabaseError>;

    /// All records owned by `owner_id`, in insertion order
    async fn find_all_by_owner(&self, owner_id: UserId) -> Result<Vec<Repository>, DatabaseError>;

    /// Persist url/description of an existing record.
    ///
    /// Returns `DatabaseError::NotFound` if the record no longer exists.
    async fn save(&self, repository: &Repository) -> Result<Repository, DatabaseError>;

    /// Remove a record permanently.
    ///
    /// Returns `DatabaseError::NotFound` if there was nothing to delete.
    async fn delete_by_id(&self, id: RepositoryId) -> Result<(), DatabaseError>;
}

/// Storage contract for user accounts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError>;

    /// Returns `DatabaseError::DuplicateKey` if the username is taken
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;
}
