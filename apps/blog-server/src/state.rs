//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::Mailer;
use quill_core::{BlogConfig, BlogService, Repositories};
use quill_infra::{ConsoleMailer, DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresAuthorRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresTagRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = build_repositories(config.database.as_ref()).await;
        let mailer = build_mailer(config.mail_webhook_url.as_deref());

        tracing::info!(
            posts_per_page = config.blog.posts_per_page,
            similar_posts_limit = config.blog.similar_posts_limit,
            "Application state initialized"
        );

        Self::from_parts(repos, mailer, config.blog.clone())
    }

    pub fn from_parts(repos: Repositories, mailer: Arc<dyn Mailer>, blog: BlogConfig) -> Self {
        Self {
            blog: Arc::new(BlogService::new(repos, mailer, blog)),
        }
    }
}

/// All four repositories over one shared in-memory store.
pub fn in_memory_repositories(store: InMemoryStore) -> Repositories {
    Repositories {
        authors: Arc::new(store.clone()),
        posts: Arc::new(store.clone()),
        tags: Arc::new(store.clone()),
        comments: Arc::new(store),
    }
}

#[cfg(feature = "postgres")]
async fn build_repositories(db_config: Option<&DatabaseConfig>) -> Repositories {
    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_repositories(InMemoryStore::new());
    };

    match DatabaseConnections::init(config).await {
        Ok(connections) => {
            let db = connections.main;
            Repositories {
                authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
                posts: Arc::new(PostgresPostRepository::new(db.clone())),
                tags: Arc::new(PostgresTagRepository::new(db.clone())),
                comments: Arc::new(PostgresCommentRepository::new(db)),
            }
        }
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            in_memory_repositories(InMemoryStore::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_repositories(_db_config: Option<&DatabaseConfig>) -> Repositories {
    tracing::info!("Running without postgres feature - using in-memory repository");
    in_memory_repositories(InMemoryStore::new())
}

#[cfg(feature = "webhook-mail")]
fn build_mailer(webhook_url: Option<&str>) -> Arc<dyn Mailer> {
    match webhook_url {
        Some(url) => {
            tracing::info!("Mail webhook configured");
            Arc::new(quill_infra::WebhookMailer::new(url.to_string()))
        }
        None => Arc::new(ConsoleMailer),
    }
}

#[cfg(not(feature = "webhook-mail"))]
fn build_mailer(webhook_url: Option<&str>) -> Arc<dyn Mailer> {
    if webhook_url.is_some() {
        tracing::warn!("MAIL_WEBHOOK_URL ignored: built without webhook-mail feature");
    }
    Arc::new(ConsoleMailer)
}
