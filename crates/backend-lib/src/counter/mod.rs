//! Key-value store with per-key expiry.
//!
//! The lockout engine keeps its attempt counters and lockout flags here.
//! Keys are namespaced by purpose (`login:tries:*`, `locked_out:limit:*`).
//! Each call is atomic per key; no cross-key transactions are offered.

mod memory;

pub use memory::MemoryCounterStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::AppError;

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current value, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Store `value` under `key`, replacing any previous value and TTL
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
