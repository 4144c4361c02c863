use std::{str::FromStr, time::Duration};

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct Config{
    pub address: String,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match std::env::var(key) {
        Ok(val) => val.parse::<T>().map_err(|_| AppError::Config(format!("{key} has an invalid value: {val}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Reads settings from the process environment. Call `dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL must be set".to_string()))?;

        Ok(Config{
            address: parse_var("SERVER_ADDRESS", "127.0.0.1:8080".to_string())?,
            environment: parse_var("APP_ENV", "development".to_string())?,
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 5)?),
        })
    }
}
