//! In-memory account store. Used by tests and single-process deployments.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use super::{build_account, Account, AccountPatch, AccountStore, NewAccount};
use crate::clock::{Clock, SystemClock};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct MemoryAccountStore {
    accounts: Arc<DashMap<String, Account>>,
    /// email -> account id; the uniqueness constraint
    emails: Arc<DashMap<String, String>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryAccountStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            emails: Arc::new(DashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn claim_email(&self, email: &str, id: &str) -> Result<(), AppError> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(owner) if owner.get() != id => Err(AppError::IdentityExists),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            },
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let Some(id) = self.emails.get(email).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.get(id).map(|a| a.value().clone()))
    }

    async fn create(&self, new: NewAccount) -> Result<Account, AppError> {
        let account = build_account(new, self.clock.now());
        self.claim_email(&account.email, &account.id)?;
        self.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn update(&self, id: &str, patch: AccountPatch) -> Result<Account, AppError> {
        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))?;

        let previous_email = account.email.clone();
        if let Some(email) = patch.email.as_deref() {
            if email != previous_email {
                self.claim_email(email, id)?;
            }
        }

        patch.apply(&mut *account, self.clock.now());
        if account.email != previous_email {
            self.emails.remove_if(&previous_email, |_, owner| owner == id);
        }
        Ok(account.clone())
    }
}
