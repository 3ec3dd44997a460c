//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use quill_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtConfig,
    JwtTokenService, MemoryStore, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

fn memory_repos() -> (Arc<dyn UserRepository>, Arc<dyn PostRepository>) {
    let store = MemoryStore::new();
    (
        Arc::new(InMemoryUserRepository::new(store.clone())),
        Arc::new(InMemoryPostRepository::new(store)),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
            match &config.database {
                Some(db_config) => match quill_infra::connect(db_config).await {
                    Ok(conn) => {
                        let conn = Arc::new(conn);
                        (
                            Arc::new(PostgresUserRepository::new(conn.clone())),
                            Arc::new(PostgresPostRepository::new(conn)),
                        )
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        memory_repos()
                    }
                },
                None => {
                    tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                    memory_repos()
                }
            };

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            tokens: Arc::new(JwtTokenService::from_env()),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    /// In-memory state with an explicit JWT config. Used by the
    /// handler tests.
    pub fn in_memory(jwt: JwtConfig) -> Self {
        let (users, posts) = memory_repos();
        Self {
            users,
            posts,
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }
}
