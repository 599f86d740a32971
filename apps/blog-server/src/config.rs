//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_core::BlogConfig;
use quill_infra::DatabaseConfig;

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub blog: BlogConfig,
    /// Mail relay endpoint; shares are only logged when unset.
    pub mail_webhook_url: Option<String>,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 10),
        });

        let defaults = BlogConfig::default();
        let blog = BlogConfig {
            posts_per_page: parse_var("POSTS_PER_PAGE", defaults.posts_per_page).max(1),
            similar_posts_limit: parse_var("SIMILAR_POSTS_LIMIT", defaults.similar_posts_limit),
            mail_from: env::var("MAIL_FROM").unwrap_or(defaults.mail_from),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            database,
            blog,
            mail_webhook_url: env::var("MAIL_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

/// Read and parse `key`, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
