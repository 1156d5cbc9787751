// Repository use cases: validation, ownership enforcement and store calls
//
// Each operation is one unit of work against the store. Failures are
// reported as-is; nothing here retries or recovers.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::RepositoryStore;
use crate::errors::RepositoryError;
use crate::models::{Actor, NewRepository, Repository, RepositoryId, RepositoryInput};
use crate::ownership::check_ownership;
use crate::telemetry;

/// Orchestrates the CRUD use cases for repository records
#[derive(Clone)]
pub struct RepositoryService {
    store: Arc<dyn RepositoryStore>,
}

impl RepositoryService {
    pub fn new(store: Arc<dyn RepositoryStore>) -> Self {
        Self { store }
    }

    /// All records owned by the actor. An empty list is a valid result.
    #[instrument(skip(self, actor), fields(user_id = actor.id))]
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Repository>, RepositoryError> {
        let result = async {
            let repositories = self.store.find_all_by_owner(actor.id).await?;
            tracing::debug!(count = repositories.len(), "Listed repositories");
            Ok::<_, RepositoryError>(repositories)
        }
        .await;

        observe("list", result)
    }

    /// Create a record owned by the actor from exactly the submitted fields
    #[instrument(skip(self, actor, input), fields(user_id = actor.id))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: RepositoryInput,
    ) -> Result<Repository, RepositoryError> {
        let result = async {
            let fields = input.validate()?;

            let repository = self
                .store
                .insert(NewRepository {
                    url: fields.url,
                    description: fields.description,
                    user_id: actor.id,
                })
                .await?;

            info!(repository_id = repository.id, "Repository created");
            Ok::<_, RepositoryError>(repository)
        }
        .await;

        observe("create", result)
    }

    /// Read a single record owned by the actor
    #[instrument(skip(self, actor), fields(user_id = actor.id))]
    pub async fn get(&self, actor: &Actor, id: RepositoryId) -> Result<Repository, RepositoryError> {
        let result = async {
            let repository = self.load(id).await?;
            check_ownership(actor, &repository)?;
            Ok::<_, RepositoryError>(repository)
        }
        .await;

        observe("get", result)
    }

    /// Overwrite url and description of a record owned by the actor.
    ///
    /// A missing record is reported first. Input is validated before the
    /// ownership check, so a non-owner submitting invalid input gets a
    /// validation error, not `Forbidden`.
    #[instrument(skip(self, actor, input), fields(user_id = actor.id))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: RepositoryId,
        input: RepositoryInput,
    ) -> Result<Repository, RepositoryError> {
        let result = async {
            let mut repository = self.load(id).await?;
            let fields = input.validate()?;
            check_ownership(actor, &repository)?;

            repository.url = fields.url;
            repository.description = fields.description;
            let saved = self.store.save(&repository).await?;

            info!(repository_id = saved.id, "Repository updated");
            Ok::<_, RepositoryError>(saved)
        }
        .await;

        observe("update", result)
    }

    /// Permanently remove a record owned by the actor
    #[instrument(skip(self, actor), fields(user_id = actor.id))]
    pub async fn delete(&self, actor: &Actor, id: RepositoryId) -> Result<(), RepositoryError> {
        let result = async {
            let repository = self.load(id).await?;
            check_ownership(actor, &repository)?;

            self.store.delete_by_id(repository.id).await?;

            info!(repository_id = id, "Repository deleted");
            Ok::<_, RepositoryError>(())
        }
        .await;

        observe("delete", result)
    }

    async fn load(&self, id: RepositoryId) -> Result<Repository, RepositoryError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }
}

fn observe<T>(
    operation: &'static str,
    result: Result<T, RepositoryError>,
) -> Result<T, RepositoryError> {
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => {
            if let RepositoryError::Store(err) = e {
                tracing::error!(operation, error = %err, "Repository store failure");
            }
            e.kind()
        }
    };
    telemetry::record_repository_operation(operation, outcome);
    result
}
