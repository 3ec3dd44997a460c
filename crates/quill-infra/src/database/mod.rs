//! Database adapters: connection setup, SeaORM entities, the Postgres
//! repositories, and the in-memory repositories.

mod connections;
pub mod entity;
mod memory;
mod postgres;

pub use connections::{DatabaseConfig, connect};
pub use memory::{InMemoryPostRepository, InMemoryUserRepository, MemoryStore};
pub use postgres::{PostgresPostRepository, PostgresUserRepository};
