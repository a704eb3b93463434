use async_trait::async_trait;
use identity_common::{AuthPayload, IdentityView, LoginRequest, SignupRequest, UpdateIdentityRequest};

use super::Principal;
use crate::error::AppError;

/// Identity operations exposed to the HTTP layer
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and open its first session
    async fn signup(&self, request: SignupRequest) -> Result<AuthPayload, AppError>;

    /// Check credentials under the lockout rules and open a new session,
    /// superseding any previous one
    async fn login(&self, request: LoginRequest) -> Result<AuthPayload, AppError>;

    /// Close the caller's session
    async fn logout(&self, principal: &Principal) -> Result<(), AppError>;

    /// Resolve a raw `Authorization` header to a principal
    async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AppError>;

    /// The caller's own profile
    async fn profile(&self, principal: &Principal) -> Result<IdentityView, AppError>;

    /// Update the caller's own profile; `target_id` must be the caller
    async fn update_own(
        &self,
        principal: &Principal,
        target_id: &str,
        update: UpdateIdentityRequest,
    ) -> Result<IdentityView, AppError>;

    /// Admin: any account's profile
    async fn admin_profile(&self, principal: &Principal, target_id: &str) -> Result<IdentityView, AppError>;

    /// Admin: update any account's profile
    async fn admin_update(
        &self,
        principal: &Principal,
        target_id: &str,
        update: UpdateIdentityRequest,
    ) -> Result<IdentityView, AppError>;
}
