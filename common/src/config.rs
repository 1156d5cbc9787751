// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_true() -> bool {
    true
}

/// Which store implementation backs the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    /// Mark the session cookie `Secure`; enable behind TLS
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Accounts created at startup when missing
    #[serde(default)]
    pub seed_users: Vec<SeedUser>,
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    pub tracing_endpoint: Option<String>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // APP__DATABASE__URL overrides database.url, and so on
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.server.request_timeout_seconds == 0 {
            return Err("Server request_timeout_seconds must be greater than 0".to_string());
        }

        // The database section only matters for the postgres backend
        if self.storage.backend == StorageBackend::Postgres {
            if self.database.url.is_empty() {
                return Err("Database URL cannot be empty".to_string());
            }
            if self.database.max_connections == 0 {
                return Err("Database max_connections must be greater than 0".to_string());
            }
            if self.database.min_connections > self.database.max_connections {
                return Err(
                    "Database min_connections cannot exceed max_connections".to_string(),
                );
            }
        }

        if self.auth.jwt_secret.is_empty() {
            return Err("JWT secret cannot be empty".to_string());
        }
        if self.auth.jwt_expiration_hours == 0 {
            return Err("JWT expiration must be greater than 0".to_string());
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err("bcrypt cost must be between 4 and 31".to_string());
        }
        if let Some(seed) = self
            .auth
            .seed_users
            .iter()
            .find(|u| u.username.trim().is_empty() || u.password.is_empty())
        {
            return Err(format!(
                "Seed user '{}' needs a username and a password",
                seed.username
            ));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_seconds: default_request_timeout_seconds(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/repohub".to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_seconds: 30,
                run_migrations: true,
            },
            storage: StorageConfig::default(),
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                jwt_expiration_hours: 24,
                cookie_secure: false,
                bcrypt_cost: default_bcrypt_cost(),
                seed_users: Vec::new(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Json,
                tracing_endpoint: None,
            },
        }
    }
}
