use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use tracing::Level;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,

    // Logging
    pub log_dir: String,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parse_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))?,
        })
    }
}

fn parse_level(value: &str) -> Result<Level> {
    value
        .trim()
        .parse::<Level>()
        .with_context(|| format!("LOG_LEVEL must be a tracing level, got {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_levels_case_insensitively() {
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" warn ").unwrap(), Level::WARN);
        assert_eq!(parse_level("5").unwrap(), Level::TRACE);
        assert!(parse_level("verbose").is_err());
    }
}
