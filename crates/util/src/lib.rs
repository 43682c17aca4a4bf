pub mod config;

pub use config::{
    AppConfig, ConfigError, DatabaseConfig, Environment, MigrationPolicy, DEFAULT_BIND_ADDR,
};

/// Loads environment variables from `.env` when available; a missing file is
/// not an error.
pub fn load_env_file() {
    let _ = dotenvy::dotenv();
}
