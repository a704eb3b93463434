// crates/backend-lib/src/middleware/mod.rs

//! Request middleware for the identity API.

pub mod auth;

pub use auth::{require_admin, require_identity};
