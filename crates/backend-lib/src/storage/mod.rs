// ============================
// crates/backend-lib/src/storage/mod.rs
// ============================
//! Account storage abstraction.
//!
//! The store is the single source of truth for each account's live
//! session token. Email uniqueness is enforced here, not by callers.

mod flat_file;
mod memory;

pub use flat_file::FlatFileAccountStore;
pub use memory::MemoryAccountStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use identity_common::{IdentityView, Role};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Persisted account record, secret fields included
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    pub role: Role,
    pub password_hash: String,
    /// The only token honoured for this account; `None` after logout
    #[serde(default)]
    pub current_token: Option<String>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Projection without the password hash or the live token
    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            dob: self.dob,
            role: self.role,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Whether `token` is byte-for-byte the account's live token
    pub fn holds_token(&self, token: &str) -> bool {
        matches!(&self.current_token, Some(current) if !current.is_empty() && current == token)
    }
}

/// Fields required to create an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub role: Role,
    pub password_hash: String,
}

/// Partial update. `current_token: Some(None)` clears the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub current_token: Option<Option<String>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl AccountPatch {
    /// Supersede the live token after a successful login
    pub fn login(token: String, at: DateTime<Utc>) -> Self {
        Self {
            current_token: Some(Some(token)),
            last_login: Some(at),
            ..Self::default()
        }
    }

    /// Install a token without touching `last_login`
    pub fn token(token: String) -> Self {
        Self {
            current_token: Some(Some(token)),
            ..Self::default()
        }
    }

    pub fn logout() -> Self {
        Self {
            current_token: Some(None),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, account: &mut Account, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            account.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            account.last_name = last_name;
        }
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(dob) = self.dob {
            account.dob = Some(dob);
        }
        if let Some(token) = self.current_token {
            account.current_token = token;
        }
        if let Some(last_login) = self.last_login {
            account.last_login = Some(last_login);
        }
        account.updated_at = now;
    }
}

/// Trait for account storage backends
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look an account up by its normalised email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    /// Look an account up by id
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AppError>;

    /// Persist a new account, failing with `IdentityExists` on a taken email
    async fn create(&self, account: NewAccount) -> Result<Account, AppError>;

    /// Apply `patch` as one atomic write and return the updated record.
    /// Fails with `AccountNotFound` for unknown ids and `IdentityExists`
    /// when moving to an email owned by another account.
    async fn update(&self, id: &str, patch: AccountPatch) -> Result<Account, AppError>;

    /// Whether some account already owns `email`
    async fn email_in_use(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

fn build_account(new: NewAccount, now: DateTime<Utc>) -> Account {
    Account {
        id: uuid::Uuid::new_v4().to_string(),
        first_name: new.first_name,
        last_name: new.last_name,
        email: new.email,
        dob: new.dob,
        role: new.role,
        password_hash: new.password_hash,
        current_token: None,
        last_login: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub(crate) fn sample_account(email: &str, role: Role) -> NewAccount {
    NewAccount {
        first_name: "Han".to_string(),
        last_name: "Solo".to_string(),
        email: email.to_string(),
        dob: NaiveDate::from_ymd_opt(1977, 5, 25),
        role,
        password_hash: "$scrypt$not-a-real-hash".to_string(),
    }
}
