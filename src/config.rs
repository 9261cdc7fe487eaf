use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Browser origin allowed to call the API with credentials.
    pub cors_origin: String,
    /// Largest page size a listing may request.
    pub max_page_limit: u32,
    pub db_max_connections: u32,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: env_or("PORT", 3000)
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            cors_origin: std::env::var("CORS_ORIGIN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            max_page_limit: env_or("MAX_PAGE_LIMIT", 100)
                .map_err(|_| anyhow::anyhow!("MAX_PAGE_LIMIT must be a positive integer"))
                .and_then(|limit| {
                    if limit == 0 {
                        anyhow::bail!("MAX_PAGE_LIMIT must be at least 1");
                    }
                    Ok(limit)
                })?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a positive integer"))?,
            rate_limit_per_second: env_or("RATE_LIMIT_PER_SECOND", 10)
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a positive integer"))?,
            rate_limit_burst: env_or("RATE_LIMIT_BURST", 20)
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive integer"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", log_prefix(&config.database_url));
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("CORS origin: {}", config.cors_origin);

        Ok(config)
    }
}

/// First 20 characters of a secret-bearing value, for logs.
fn log_prefix(value: &str) -> String {
    value.chars().take(20).collect()
}

/// Reads and parses an optional variable, falling back to `default` when unset.
fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, T::Err> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse(),
        _ => Ok(default),
    }
}
