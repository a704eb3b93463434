// ============================
// crates/backend-lib/src/auth/lockout.rs
// ============================
//! Failed-login counting and lockout.
//!
//! Two keys per email live in the counter store:
//! - `login:tries:<email>`: consecutive failures inside the rolling window
//! - `locked_out:limit:<email>`: present while the account is locked out
//!
//! The lockout check must run before any password comparison, and
//! `reset` only after a password has been verified.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;

use crate::counter::CounterStore;
use crate::error::AppError;
use crate::metrics::LOCKOUT_TRIGGERED;

/// Default number of failed attempts before lockout
pub const DEFAULT_FAILED_LOGIN_THRESHOLD: u32 = 5;

/// Default lockout window (one day)
pub const DEFAULT_LOCKOUT_WINDOW: Duration = Duration::from_secs(60 * 60 * 24);

const LOGIN_TRIES_KEY: &str = "login:tries";
const LOCKED_OUT_KEY: &str = "locked_out:limit";

/// What a recorded failure amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The password was wrong, `remaining` attempts are left
    Remaining(u32),
    /// This failure reached the threshold and locked the account
    LockedOut { threshold: u32 },
}

impl From<FailureOutcome> for AppError {
    fn from(outcome: FailureOutcome) -> Self {
        match outcome {
            FailureOutcome::Remaining(remaining) => AppError::InvalidPassword { remaining },
            FailureOutcome::LockedOut { threshold } => AppError::LockedOut { threshold },
        }
    }
}

/// Lockout state machine over an injected counter store
#[derive(Clone)]
pub struct LockoutEngine {
    store: Arc<dyn CounterStore>,
    threshold: u32,
    window: Duration,
}

impl std::fmt::Debug for LockoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockoutEngine")
            .field("threshold", &self.threshold)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl LockoutEngine {
    pub fn new(store: Arc<dyn CounterStore>, threshold: u32, window: Duration) -> Self {
        Self {
            store,
            threshold: threshold.max(1),
            window,
        }
    }

    pub fn with_defaults(store: Arc<dyn CounterStore>) -> Self {
        Self::new(store, DEFAULT_FAILED_LOGIN_THRESHOLD, DEFAULT_LOCKOUT_WINDOW)
    }

    fn tries_key(email: &str) -> String {
        format!("{LOGIN_TRIES_KEY}:{email}")
    }

    fn locked_key(email: &str) -> String {
        format!("{LOCKED_OUT_KEY}:{email}")
    }

    /// Whether the lockout flag is present. Never mutates state.
    pub async fn is_locked_out(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.store.get(&Self::locked_key(email)).await?.is_some())
    }

    /// Fail with `LockedOut` while the flag is present
    pub async fn ensure_not_locked_out(&self, email: &str) -> Result<(), AppError> {
        if self.is_locked_out(email).await? {
            tracing::info!(%email, "login rejected, account locked out");
            return Err(AppError::LockedOut {
                threshold: self.threshold,
            });
        }
        Ok(())
    }

    /// Current failure count, 0 when absent
    pub async fn failed_attempts(&self, email: &str) -> Result<u32, AppError> {
        let raw = self.store.get(&Self::tries_key(email)).await?;
        Ok(match raw {
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(%email, %value, "unreadable login tries counter, treating as 0");
                0
            }),
            None => 0,
        })
    }

    /// Record a confirmed password mismatch.
    ///
    /// The new state is persisted before the outcome is returned; the
    /// caller turns the outcome into the error it raises.
    pub async fn record_failure(&self, email: &str) -> Result<FailureOutcome, AppError> {
        let attempts = self.failed_attempts(email).await?.saturating_add(1);

        if attempts >= self.threshold {
            self.store
                .set(&Self::locked_key(email), "true", self.window)
                .await?;
            // the flag alone gates further attempts
            self.store.delete(&Self::tries_key(email)).await?;

            counter!(LOCKOUT_TRIGGERED).increment(1);
            tracing::warn!(%email, attempts, "account locked out after repeated login failures");
            return Ok(FailureOutcome::LockedOut {
                threshold: self.threshold,
            });
        }

        self.store
            .set(&Self::tries_key(email), &attempts.to_string(), self.window)
            .await?;
        let remaining = self.threshold - attempts;
        tracing::info!(%email, attempts, remaining, "failed login attempt");
        Ok(FailureOutcome::Remaining(remaining))
    }

    /// Clear the failure counter and lockout flag. Idempotent.
    pub async fn reset(&self, email: &str) -> Result<(), AppError> {
        self.store.delete(&Self::tries_key(email)).await?;
        self.store.delete(&Self::locked_key(email)).await?;
        Ok(())
    }
}
