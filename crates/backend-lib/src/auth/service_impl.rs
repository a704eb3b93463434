use std::sync::Arc;

use async_trait::async_trait;
use identity_common::{AuthPayload, IdentityView, LoginRequest, SignupRequest, UpdateIdentityRequest};
use metrics::counter;

use super::guard::{ensure_owner, require_admin, Principal, SessionGuard};
use super::lockout::LockoutEngine;
use super::password::{hash_password, verify_password, PasswordRequirements};
use super::token::TokenService;
use super::AuthService;
use crate::clock::Clock;
use crate::config::Settings;
use crate::counter::CounterStore;
use crate::error::AppError;
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED, LOGOUT, SIGNUP_CREATED};
use crate::storage::{AccountPatch, AccountStore, NewAccount};
use crate::validation::{validate_login, validate_signup, validate_update};

pub struct DefaultAuth {
    accounts: Arc<dyn AccountStore>,
    lockout: LockoutEngine,
    tokens: Arc<TokenService>,
    guard: SessionGuard,
    password: PasswordRequirements,
    clock: Arc<dyn Clock>,
}

impl DefaultAuth {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        counters: Arc<dyn CounterStore>,
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = Arc::new(TokenService::with_clock(
            settings.auth.jwt_secret.as_bytes(),
            settings.auth.token_issuer.clone(),
            settings.auth.token_expiry(),
            clock.clone(),
        ));
        let lockout = LockoutEngine::new(
            counters,
            settings.auth.failed_login_threshold,
            settings.auth.lockout_window(),
        );
        let guard = SessionGuard::new(tokens.clone(), accounts.clone());

        Self {
            accounts,
            lockout,
            tokens,
            guard,
            password: settings.password.clone(),
            clock,
        }
    }

    pub fn lockout(&self) -> &LockoutEngine {
        &self.lockout
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    async fn apply_update(
        &self,
        target_id: &str,
        update: UpdateIdentityRequest,
    ) -> Result<IdentityView, AppError> {
        if update.is_empty() {
            return Err(AppError::ActionNotAllowed(
                "At least one field should be updated".to_string(),
            ));
        }
        let update = validate_update(update, self.clock.now().date_naive())?;

        if let Some(email) = update.email.as_deref() {
            if let Some(owner) = self.accounts.find_by_email(email).await? {
                if owner.id != target_id {
                    return Err(AppError::IdentityExists);
                }
            }
        }

        let patch = AccountPatch {
            first_name: update.first_name,
            last_name: update.last_name,
            email: update.email,
            dob: update.dob,
            ..AccountPatch::default()
        };
        let account = self.accounts.update(target_id, patch).await?;
        tracing::info!(id = %account.id, "identity updated");
        Ok(account.view())
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn signup(&self, request: SignupRequest) -> Result<AuthPayload, AppError> {
        let request = validate_signup(request, &self.password, self.clock.now().date_naive())?;
        if self.accounts.email_in_use(&request.email).await? {
            return Err(AppError::IdentityExists);
        }

        let log_n = self.password.scrypt_log_n;
        let plain = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&plain, log_n))
            .await?
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let account = self
            .accounts
            .create(NewAccount {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                dob: Some(request.dob),
                role: request.role,
                password_hash,
            })
            .await?;

        let token = self.tokens.issue(&account)?;
        let account = self
            .accounts
            .update(&account.id, AccountPatch::token(token.clone()))
            .await?;

        counter!(SIGNUP_CREATED).increment(1);
        tracing::info!(id = %account.id, role = %account.role, "identity created");
        Ok(AuthPayload {
            identity: account.view(),
            token,
        })
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthPayload, AppError> {
        let request = validate_login(request)?;
        let account = self
            .accounts
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(request.email.clone()))?;

        // a locked-out account is rejected before any hashing work
        self.lockout.ensure_not_locked_out(&account.email).await?;

        let hash = account.password_hash.clone();
        let plain = request.password;
        let valid = tokio::task::spawn_blocking(move || verify_password(&hash, &plain)).await?;
        if !valid {
            counter!(LOGIN_FAILED).increment(1);
            let outcome = self.lockout.record_failure(&account.email).await?;
            return Err(outcome.into());
        }

        self.lockout.reset(&account.email).await?;

        let token = self.tokens.issue(&account)?;
        let account = self
            .accounts
            .update(&account.id, AccountPatch::login(token.clone(), self.clock.now()))
            .await?;

        counter!(LOGIN_SUCCEEDED).increment(1);
        tracing::info!(id = %account.id, "login succeeded");
        Ok(AuthPayload {
            identity: account.view(),
            token,
        })
    }

    async fn logout(&self, principal: &Principal) -> Result<(), AppError> {
        self.accounts
            .update(&principal.id, AccountPatch::logout())
            .await?;
        counter!(LOGOUT).increment(1);
        tracing::info!(id = %principal.id, "logged out");
        Ok(())
    }

    async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AppError> {
        self.guard.authenticate(header).await
    }

    async fn profile(&self, principal: &Principal) -> Result<IdentityView, AppError> {
        self.accounts
            .find_by_id(&principal.id)
            .await?
            .map(|account| account.view())
            .ok_or_else(|| AppError::AccountNotFound(principal.id.clone()))
    }

    async fn update_own(
        &self,
        principal: &Principal,
        target_id: &str,
        update: UpdateIdentityRequest,
    ) -> Result<IdentityView, AppError> {
        ensure_owner(principal, target_id)?;
        self.apply_update(target_id, update).await
    }

    async fn admin_profile(&self, principal: &Principal, target_id: &str) -> Result<IdentityView, AppError> {
        require_admin(principal)?;
        self.accounts
            .find_by_id(target_id)
            .await?
            .map(|account| account.view())
            .ok_or_else(|| AppError::AccountNotFound(target_id.to_string()))
    }

    async fn admin_update(
        &self,
        principal: &Principal,
        target_id: &str,
        update: UpdateIdentityRequest,
    ) -> Result<IdentityView, AppError> {
        require_admin(principal)?;
        self.apply_update(target_id, update).await
    }
}
