//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{AuthorSummary, NewUser, Principal, ProfileUpdate, User};
