use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";
pub const PASSWORD_PLACEHOLDER: &str = "${DB_PASSWORD}";
pub const DEFAULT_MIGRATION_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_MIGRATION_RETRY_DELAY_SECS: u64 = 10;

/// Application runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    /// Returns the canonical name used for logging/metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// Connection settings for the catalog database.
///
/// The password is kept next to the resolved URL only so that the URL can be
/// logged with the secret masked out.
#[derive(Clone)]
pub struct DatabaseConfig {
    url: String,
    password: Option<String>,
}

impl DatabaseConfig {
    /// Substitutes [`PASSWORD_PLACEHOLDER`] in `template` when a password is provided.
    pub fn resolve(template: &str, password: Option<String>) -> Self {
        let password = password.filter(|value| !value.is_empty());
        let url = match &password {
            Some(secret) => template.replace(PASSWORD_PLACEHOLDER, secret),
            None => template.to_string(),
        };
        Self { url, password }
    }

    /// Full connection string, secret included.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connection string safe for logs.
    pub fn masked_url(&self) -> String {
        match &self.password {
            Some(secret) => self.url.replace(secret.as_str(), "***"),
            None => self.url.clone(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.masked_url())
            .finish()
    }
}

/// Startup retry policy for applying schema migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for MigrationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MIGRATION_MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_MIGRATION_RETRY_DELAY_SECS),
        }
    }
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub migrations: MigrationPolicy,
}

impl AppConfig {
    /// Constructs the configuration by reading and validating environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let environment = Environment::from_str(&env_value)?;
        let bind_value =
            env::var("APP_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::BindAddress {
                value: bind_value.clone(),
                source,
            })?;

        let template =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let database = DatabaseConfig::resolve(&template, env::var("DB_PASSWORD").ok());

        let max_attempts = parse_var("MIGRATION_MAX_ATTEMPTS", DEFAULT_MIGRATION_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::ZeroMigrationAttempts);
        }
        let retry_delay_secs = parse_var(
            "MIGRATION_RETRY_DELAY_SECS",
            DEFAULT_MIGRATION_RETRY_DELAY_SECS,
        )?;

        Ok(Self {
            bind_addr,
            environment,
            database,
            migrations: MigrationPolicy {
                max_attempts,
                retry_delay: Duration::from_secs(retry_delay_secs),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_ENV must be one of 'development', 'production', or 'test' (got {0})")]
    InvalidEnvironment(String),
    #[error("invalid APP_BIND_ADDR value {value:?}: {source}")]
    BindAddress {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("{name} must be a non-negative integer (got {value})")]
    InvalidNumber { name: &'static str, value: String },
    #[error("MIGRATION_MAX_ATTEMPTS must be at least 1")]
    ZeroMigrationAttempts,
}
