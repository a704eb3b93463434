// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod guard;
pub mod lockout;
pub mod password;
pub mod token;
mod service;
mod service_impl;

pub use guard::{bearer_token, ensure_owner, require_admin, Principal, SessionGuard, BEARER_SCHEME};
pub use lockout::{FailureOutcome, LockoutEngine};
pub use password::{hash_password, verify_password, validate_password_strength, PasswordRequirements, MIN_PASSWORD_LENGTH};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{Claims, TokenService};
