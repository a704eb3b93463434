// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed session tokens (JWT, HS256).
//!
//! A token that verifies here is only half of a valid session: the
//! session guard additionally requires it to equal the account's stored
//! live token, which is how logout and "login elsewhere" revoke it.

use std::sync::Arc;
use std::time::Duration;

use identity_common::Role;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::storage::Account;

/// Default token lifetime (one hour)
pub const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Claims carried by every session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account id
    pub id: String,
    pub role: Role,
    /// Display-only
    pub first_name: String,
    /// Display-only
    pub last_name: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issuance so two logins in the same second differ
    pub jti: String,
}

/// Issues and verifies session tokens with a server-held secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], issuer: impl Into<String>, expiry: Duration) -> Self {
        Self::with_clock(secret, issuer, expiry, Arc::new(SystemClock))
    }

    pub fn with_clock(
        secret: &[u8],
        issuer: impl Into<String>,
        expiry: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            expiry,
            clock,
        }
    }

    /// Build and sign claims for `account`. Persists nothing.
    pub fn issue(&self, account: &Account) -> Result<String, AppError> {
        let now = self.clock.now().timestamp();
        let expiry = i64::try_from(self.expiry.as_secs())
            .map_err(|_| AppError::Internal("token expiry out of range".to_string()))?;
        let claims = Claims {
            id: account.id.clone(),
            role: account.role,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(expiry),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// Check signature, issuer and expiry, then return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        // expiry is judged against the injected clock below
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token failed verification");
            AppError::InvalidToken
        })?;

        if data.claims.exp <= self.clock.now().timestamp() {
            tracing::debug!(id = %data.claims.id, "token expired");
            return Err(AppError::InvalidToken);
        }
        Ok(data.claims)
    }
}
