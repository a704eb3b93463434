// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core functionality for the identity backend: account storage, login
//! lockout, session tokens and the HTTP surface over them.

pub mod auth;
pub mod clock;
pub mod config;
pub mod counter;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth};
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::counter::{CounterStore, MemoryCounterStore};
use crate::storage::{AccountStore, MemoryAccountStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings the server was started with
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state over the given stores
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        counters: Arc<dyn CounterStore>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let auth = Arc::new(DefaultAuth::new(accounts, counters, &settings, clock));
        Self {
            auth,
            settings: Arc::new(settings),
        }
    }

    /// State backed entirely by in-memory stores and the system clock
    pub fn in_memory(settings: Settings) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::new(
            Arc::new(MemoryAccountStore::new(clock.clone())),
            Arc::new(MemoryCounterStore::new(clock.clone())),
            settings,
            clock,
        )
    }
}
