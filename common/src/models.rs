// Core domain models for users and repository records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

pub type UserId = i64;
pub type RepositoryId = i64;

// ============================================================================
// Users
// ============================================================================

/// A user account as stored by the auth collaborator
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
}

/// UserClaims represents JWT token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,      // Subject (user ID)
    pub username: String, // Username
    pub exp: i64,         // Expiration time (Unix timestamp)
    pub iat: i64,         // Issued at (Unix timestamp)
}

/// The authenticated identity making the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub username: String,
}

impl Actor {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

impl TryFrom<&UserClaims> for Actor {
    type Error = AuthError;

    fn try_from(claims: &UserClaims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken(format!("Invalid subject: {}", claims.sub)))?;

        Ok(Self {
            id,
            username: claims.username.clone(),
        })
    }
}

// ============================================================================
// Repository records
// ============================================================================

/// A repository record: a URL plus a description, owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Repository {
    pub id: RepositoryId,
    pub url: String,
    pub description: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A repository about to be inserted. The owner comes from the actor, never
/// from submitted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub url: String,
    pub description: String,
    pub user_id: UserId,
}

/// Caller-writable repository fields.
///
/// This is the complete allow-list of what a request may set. Anything else
/// submitted alongside (`id`, `user_id`, ...) is dropped during
/// deserialization. Both fields are optional here so a missing field can be
/// reported as a validation error instead of a malformed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInput {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RepositoryInput {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            description: Some(description.into()),
        }
    }
}

/// Repository fields that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFields {
    pub url: String,
    pub description: String,
}
