// ============================
// crates/backend-lib/src/storage/flat_file.rs
// ============================
//! Flat-file account store: one JSON document per account.
//!
//! Layout under the root directory:
//! ```text
//! accounts/<id>.json
//! ```
//! The email index is rebuilt from disk on open. Writes are serialised
//! through one lock so the index and the documents never disagree.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::Mutex};

use super::{build_account, Account, AccountPatch, AccountStore, NewAccount};
use crate::clock::{Clock, SystemClock};
use crate::error::AppError;

/// Flat-file implementation of the `AccountStore` trait
#[derive(Clone, Debug)]
pub struct FlatFileAccountStore {
    root: PathBuf,
    /// email -> account id
    index: Arc<Mutex<HashMap<String, String>>>,
    clock: Arc<dyn Clock>,
}

impl FlatFileAccountStore {
    pub async fn open<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        Self::open_with_clock(root, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock<P: AsRef<Path>>(
        root: P,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let accounts_dir = root.join("accounts");
        tokio_fs::create_dir_all(&accounts_dir).await?;

        let mut index = HashMap::new();
        let mut entries = tokio_fs::read_dir(&accounts_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio_fs::read_to_string(&path).await?;
            let account: Account = serde_json::from_str(&content)?;
            if let Some(other) = index.insert(account.email.clone(), account.id.clone()) {
                anyhow::bail!(
                    "email {} is claimed by both {} and {}",
                    account.email,
                    other,
                    account.id
                );
            }
        }
        tracing::info!(accounts = index.len(), root = %root.display(), "opened account store");

        Ok(Self {
            root,
            index: Arc::new(Mutex::new(index)),
            clock,
        })
    }

    fn account_path(&self, id: &str) -> Option<PathBuf> {
        // ids are generated UUIDs; anything else never names a file
        uuid::Uuid::parse_str(id).ok()?;
        Some(self.root.join("accounts").join(format!("{id}.json")))
    }

    async fn read_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        let Some(path) = self.account_path(id) else {
            return Ok(None);
        };
        match tokio_fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a temp file and rename so readers never see a torn document
    async fn write_account(&self, account: &Account) -> Result<(), AppError> {
        let path = self
            .account_path(&account.id)
            .ok_or_else(|| AppError::Internal(format!("invalid account id {}", account.id)))?;
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(account)?;
        let mut file = tokio_fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FlatFileAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let id = self.index.lock().await.get(email).cloned();
        match id {
            Some(id) => self.read_account(&id).await,
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AppError> {
        self.read_account(id).await
    }

    async fn create(&self, new: NewAccount) -> Result<Account, AppError> {
        let mut index = self.index.lock().await;
        if index.contains_key(&new.email) {
            return Err(AppError::IdentityExists);
        }

        let account = build_account(new, self.clock.now());
        self.write_account(&account).await?;
        index.insert(account.email.clone(), account.id.clone());
        Ok(account)
    }

    async fn update(&self, id: &str, patch: AccountPatch) -> Result<Account, AppError> {
        let mut index = self.index.lock().await;
        let mut account = self
            .read_account(id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))?;

        let previous_email = account.email.clone();
        if let Some(email) = patch.email.as_deref() {
            if email != previous_email && index.contains_key(email) {
                return Err(AppError::IdentityExists);
            }
        }

        patch.apply(&mut account, self.clock.now());
        self.write_account(&account).await?;
        if account.email != previous_email {
            index.remove(&previous_email);
            index.insert(account.email.clone(), account.id.clone());
        }
        Ok(account)
    }
}
