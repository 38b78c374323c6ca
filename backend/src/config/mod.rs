//! Configuration management for SkillSwap
//!
//! Loads and validates configuration from environment variables, with
//! support for different environments (development, staging, production)
//! and for choosing the record store and object storage adapters.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Which record store adapter backs the services
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory { latency: Duration },
}

/// Which object storage adapter receives verification uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectStorageBackend {
    Local { root: PathBuf },
    Http { base_url: String, api_key: Option<String> },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,

    /// Server port
    pub port: u16,

    pub store: StoreBackend,

    /// Maximum database connections
    pub db_max_connections: u32,

    pub object_storage: ObjectStorageBackend,

    /// Shared secret used to verify session tokens (HS256)
    pub jwt_secret: String,

    /// CORS allowed origins, comma separated
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Upper bound for a verification upload request body
    pub max_upload_bytes: usize,
}

const DEV_JWT_SECRET: &str = "development-secret-change-in-production";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let store = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => StoreBackend::Postgres {
                database_url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            },
            "memory" => {
                let latency_ms = env::var("MOCK_LATENCY_MS")
                    .unwrap_or_else(|_| "0".to_string())
                    .parse::<u64>()
                    .map_err(|_| {
                        ConfigError::InvalidValue("MOCK_LATENCY_MS must be a number".to_string())
                    })?;
                StoreBackend::Memory {
                    latency: Duration::from_millis(latency_ms),
                }
            }
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid STORE_BACKEND: '{}'. Expected: postgres or memory",
                    other
                )))
            }
        };

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .unwrap_or(5);

        let object_storage = match env::var("OBJECT_STORAGE_URL") {
            Ok(base_url) if !base_url.trim().is_empty() => ObjectStorageBackend::Http {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: env::var("OBJECT_STORAGE_KEY").ok(),
            },
            _ => ObjectStorageBackend::Local {
                root: PathBuf::from(
                    env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string()),
                ),
            },
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment.is_production() => {
                return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()))
            }
            Err(_) => DEV_JWT_SECRET.to_string(),
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse::<usize>()
            .unwrap_or(10 * 1024 * 1024);

        Ok(Config {
            environment,
            port,
            store,
            db_max_connections,
            object_storage,
            jwt_secret,
            cors_allowed_origins,
            log_level,
            max_upload_bytes,
        })
    }

    /// Database URL with the password masked, for logging
    pub fn database_url_masked(&self) -> Option<String> {
        let StoreBackend::Postgres { database_url } = &self.store else {
            return None;
        };
        if let Some(at_pos) = database_url.find('@') {
            if let Some(colon_pos) = database_url[..at_pos].rfind(':') {
                let prefix = &database_url[..colon_pos + 1];
                let suffix = &database_url[at_pos..];
                return Some(format!("{}****{}", prefix, suffix));
            }
        }
        Some(database_url.clone())
    }
}
