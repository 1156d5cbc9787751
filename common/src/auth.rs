// Authentication and JWT token handling

use crate::db::UserStore;
use crate::errors::{AuthError, DatabaseError};
use crate::models::{Actor, NewUser, User, UserClaims, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// JWT token service for encoding and decoding tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    expiration_hours: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and expiration
    #[instrument(skip(secret))]
    pub fn new(secret: &str, expiration_hours: u64) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            expiration_hours: expiration_hours as i64,
        }
    }

    /// Encode a session token for the given user
    #[instrument(skip(self))]
    pub fn encode_token(&self, user_id: UserId, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = UserClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: (now + Duration::hours(self.expiration_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to encode JWT token");
            AuthError::AuthenticationFailed(format!("Failed to encode token: {}", e))
        })
    }

    /// Decode and validate a JWT token
    #[instrument(skip(self, token))]
    pub fn decode_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data =
            decode::<UserClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                warn!(error = %e, "Rejected JWT token");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(format!("Token validation failed: {}", e)),
                }
            })?;

        Ok(token_data.claims)
    }
}

/// Database authentication service for validating credentials and managing users
#[derive(Clone)]
pub struct DatabaseAuthService {
    jwt_service: JwtService,
    users: Arc<dyn UserStore>,
    hash_cost: u32,
}

impl DatabaseAuthService {
    /// Create a new database authentication service
    pub fn new(jwt_service: JwtService, users: Arc<dyn UserStore>) -> Self {
        Self {
            jwt_service,
            users,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost used when hashing new passwords
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Authenticate a user with username and password, returning a session token
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!(error = %e, username = %username, "Database error during login");
                AuthError::AuthenticationFailed(format!("Database error: {}", e))
            })?
            .ok_or_else(|| {
                warn!(username = %username, "User not found");
                AuthError::InvalidCredentials
            })?;

        let password_valid = bcrypt::verify(password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            AuthError::AuthenticationFailed(format!("Password verification failed: {}", e))
        })?;

        if !password_valid {
            warn!(username = %username, "Invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt_service.encode_token(user.id, &user.username)?;

        tracing::info!(
            user_id = user.id,
            username = %user.username,
            "User logged in successfully"
        );

        Ok(token)
    }

    /// Create a new user with hashed password
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> Result<User, AuthError> {
        let password_hash = bcrypt::hash(password, self.hash_cost).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            AuthError::AuthenticationFailed(format!("Password hashing failed: {}", e))
        })?;

        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                email,
            })
            .await
            .map_err(|e| {
                error!(error = %e, username = %username, "Failed to create user");
                match e {
                    DatabaseError::DuplicateKey(_) => {
                        AuthError::AuthenticationFailed("Username already exists".to_string())
                    }
                    _ => AuthError::AuthenticationFailed(format!("Failed to create user: {}", e)),
                }
            })?;

        Ok(user)
    }

    /// Create the user unless one with the same username already exists
    #[instrument(skip(self, password))]
    pub async fn ensure_user(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> Result<User, AuthError> {
        let existing = self.users.find_by_username(username).await.map_err(|e| {
            AuthError::AuthenticationFailed(format!("Database error: {}", e))
        })?;

        match existing {
            Some(user) => {
                tracing::debug!(user_id = user.id, "User already present");
                Ok(user)
            }
            None => self.create_user(username, password, email).await,
        }
    }

    /// Validate a session token and resolve the acting user
    #[instrument(skip(self, token))]
    pub fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let claims = self.validate_token(token)?;
        Actor::try_from(&claims)
    }

    /// Validate a JWT token and return claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        self.jwt_service.decode_token(token)
    }
}
