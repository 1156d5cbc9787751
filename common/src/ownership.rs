// Ownership policy for user-owned records
//
// get, update and delete all go through `check_ownership`; nothing else in
// the crate compares owner ids.

use tracing::warn;

use crate::errors::RepositoryError;
use crate::models::{Actor, Repository, RepositoryId, UserId};

/// A record with exactly one owning user
pub trait OwnedByUser {
    /// Id of the user who owns this record
    fn owner_id(&self) -> UserId;

    /// Id of the record itself, reported when access is denied
    fn record_id(&self) -> RepositoryId;

    /// `true` iff the actor is the owner
    fn is_owned_by(&self, actor: &Actor) -> bool {
        self.owner_id() == actor.id
    }
}

impl OwnedByUser for Repository {
    fn owner_id(&self) -> UserId {
        self.user_id
    }

    fn record_id(&self) -> RepositoryId {
        self.id
    }
}

/// Allow iff `actor.id == record.owner_id()`, otherwise `Forbidden`.
pub fn check_ownership<R: OwnedByUser>(actor: &Actor, record: &R) -> Result<(), RepositoryError> {
    if record.is_owned_by(actor) {
        tracing::debug!(
            user_id = actor.id,
            repository_id = record.record_id(),
            "Ownership check passed"
        );
        return Ok(());
    }

    warn!(
        user_id = actor.id,
        username = %actor.username,
        repository_id = record.record_id(),
        owner_id = record.owner_id(),
        "Access denied: actor does not own record"
    );

    Err(RepositoryError::Forbidden {
        repository_id: record.record_id(),
        actor_id: actor.id,
    })
}
