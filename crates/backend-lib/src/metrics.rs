// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SIGNUP_CREATED: &str = "identity.signup.created";
pub const LOGIN_SUCCEEDED: &str = "identity.login.succeeded";
pub const LOGIN_FAILED: &str = "identity.login.failed";
pub const LOCKOUT_TRIGGERED: &str = "identity.lockout.triggered";
pub const TOKEN_REJECTED: &str = "identity.token.rejected";
pub const LOGOUT: &str = "identity.logout";
