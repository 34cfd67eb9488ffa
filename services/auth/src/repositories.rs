//! Repositories for database operations

pub mod user;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use user::{PgUserRepository, UserRepository};
