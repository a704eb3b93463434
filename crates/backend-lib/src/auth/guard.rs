// ============================
// crates/backend-lib/src/auth/guard.rs
// ============================
//! Request authentication.
//!
//! A request is authenticated when its bearer token both verifies
//! cryptographically and equals the live token stored on the account it
//! names. The second check is what makes logout and single-session
//! supersession effective.

use std::sync::Arc;

use identity_common::Role;
use metrics::counter;

use super::token::{Claims, TokenService};
use crate::error::AppError;
use crate::metrics::TOKEN_REJECTED;
use crate::storage::AccountStore;

/// Expected authorization scheme
pub const BEARER_SCHEME: &str = "Bearer";

/// Authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
            first_name: claims.first_name,
            last_name: claims.last_name,
        }
    }
}

/// Split an `Authorization` header value into its bearer token
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(AppError::MissingAuthHeader)?;

    let (scheme, rest) = header.split_once(' ').unwrap_or((header, ""));
    if scheme != BEARER_SCHEME {
        return Err(AppError::InvalidAuthScheme);
    }

    let token = rest.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AppError::InvalidToken);
    }
    Ok(token)
}

/// Composes token verification with the live-token comparison
#[derive(Clone)]
pub struct SessionGuard {
    tokens: Arc<TokenService>,
    accounts: Arc<dyn AccountStore>,
}

impl SessionGuard {
    pub fn new(tokens: Arc<TokenService>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { tokens, accounts }
    }

    /// Authenticate a request from its raw `Authorization` header
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AppError> {
        let result = self.check(header).await;
        if let Err(err) = &result {
            counter!(TOKEN_REJECTED).increment(1);
            tracing::debug!(error = %err, "request authentication rejected");
        }
        result
    }

    async fn check(&self, header: Option<&str>) -> Result<Principal, AppError> {
        let token = bearer_token(header)?;
        let claims = self.tokens.verify(token)?;

        let account = self
            .accounts
            .find_by_id(&claims.id)
            .await?
            .ok_or(AppError::InvalidToken)?;
        if !account.holds_token(token) {
            // logged out, or superseded by a newer login
            return Err(AppError::InvalidToken);
        }

        Ok(claims.into())
    }
}

/// Admin gate, composed after authentication
pub fn require_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Non-admin update rule: only the account itself may be changed
pub fn ensure_owner(principal: &Principal, target_id: &str) -> Result<(), AppError> {
    if principal.id == target_id {
        Ok(())
    } else {
        Err(AppError::ActionNotAllowed(
            "Only personal details can be updated".to_string(),
        ))
    }
}
