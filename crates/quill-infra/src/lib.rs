//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! JWT tokens, Argon2 password hashing, and the Postgres and in-memory
//! repositories. The in-memory variants back the no-database mode and
//! the handler tests.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository, MemoryStore,
    PostgresPostRepository, PostgresUserRepository, connect,
};
