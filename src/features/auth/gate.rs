use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::{AppError, StoreError};
use crate::features::auth::model::{SessionUser, VerifiedUser};
use crate::features::users::models::UserRole;

/// Role lookup against the persisted user records.
///
/// Abstracted behind a trait so the gate can be exercised in tests
/// without a database.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<VerifiedUser>, StoreError>;
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// No session, or the session's user no longer exists.
    Unauthenticated,
    /// The user exists but lacks the required role.
    Forbidden,
    /// The user exists and satisfies the role requirement.
    Authorized(VerifiedUser),
}

/// Central authorization gate.
///
/// Session tokens carry a role claim, but the claim is only as fresh as
/// the token (up to 30 days old). The gate re-reads the role from the
/// store on every check, so a demoted admin loses access immediately.
/// Without a session the store is never consulted.
pub struct AuthGate {
    store: Arc<dyn RoleStore>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Resolve the caller's verified identity and check it against the
    /// required roles, if any. `None` for `required_roles` means any
    /// authenticated user passes.
    pub async fn authorize(
        &self,
        session: Option<&SessionUser>,
        required_roles: Option<&[UserRole]>,
    ) -> Result<Authorization, StoreError> {
        let Some(session) = session else {
            return Ok(Authorization::Unauthenticated);
        };

        let Some(user) = self.store.find_by_email(&session.email).await? else {
            // Token outlived the account
            return Ok(Authorization::Unauthenticated);
        };

        if let Some(roles) = required_roles {
            if !roles.contains(&user.role) {
                return Ok(Authorization::Forbidden);
            }
        }

        Ok(Authorization::Authorized(user))
    }

    /// Like [`authorize`](Self::authorize) but converts refusals into
    /// ready-to-return errors.
    pub async fn require(
        &self,
        session: Option<&SessionUser>,
        required_roles: Option<&[UserRole]>,
    ) -> Result<VerifiedUser, AppError> {
        match self.authorize(session, required_roles).await? {
            Authorization::Authorized(user) => Ok(user),
            Authorization::Forbidden => {
                Err(AppError::Forbidden("Insufficient permissions".to_string()))
            }
            Authorization::Unauthenticated => {
                Err(AppError::Unauthorized("Authentication required".to_string()))
            }
        }
    }

    /// Pass if the verified caller owns the resource or is an admin.
    pub async fn require_owner_or_admin(
        &self,
        session: Option<&SessionUser>,
        owner_id: i64,
    ) -> Result<VerifiedUser, AppError> {
        let user = self.require(session, None).await?;

        if user.id != owner_id && !user.is_admin() {
            return Err(AppError::Forbidden(
                "You do not have access to this resource".to_string(),
            ));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::shared::test_helpers::{session_user as session, FakeRoleStore};

    #[tokio::test]
    async fn missing_session_short_circuits_without_a_lookup() {
        let store = Arc::new(FakeRoleStore::with_user(1, UserRole::Admin));
        let gate = AuthGate::new(store.clone());

        let result = gate.authorize(None, Some(&[UserRole::Admin])).await.unwrap();

        assert_eq!(result, Authorization::Unauthenticated);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deleted_account_is_treated_as_unauthenticated() {
        let gate = AuthGate::new(Arc::new(FakeRoleStore::empty()));

        let result = gate
            .authorize(Some(&session(1, UserRole::Admin)), None)
            .await
            .unwrap();

        assert_eq!(result, Authorization::Unauthenticated);
    }

    #[tokio::test]
    async fn stale_admin_claim_does_not_grant_admin_access() {
        // Token still says admin, but the store says the role was revoked
        let gate = AuthGate::new(Arc::new(FakeRoleStore::with_user(1, UserRole::User)));

        let result = gate
            .authorize(Some(&session(1, UserRole::Admin)), Some(&[UserRole::Admin]))
            .await
            .unwrap();

        assert_eq!(result, Authorization::Forbidden);
    }

    #[tokio::test]
    async fn verified_role_comes_from_the_store_not_the_token() {
        let gate = AuthGate::new(Arc::new(FakeRoleStore::with_user(1, UserRole::Admin)));

        let verified = gate
            .require(Some(&session(1, UserRole::User)), Some(&[UserRole::Admin]))
            .await
            .unwrap();

        assert_eq!(verified.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn store_failure_is_an_error_not_a_forbidden() {
        let gate = AuthGate::new(Arc::new(FakeRoleStore::failing()));

        let result = gate
            .authorize(Some(&session(1, UserRole::Admin)), Some(&[UserRole::Admin]))
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, crate::core::error::StoreErrorKind::Connection);
    }

    #[tokio::test]
    async fn owner_check_allows_owner_and_admin_only() {
        let gate = AuthGate::new(Arc::new(FakeRoleStore::with_user(5, UserRole::User)));
        assert!(gate
            .require_owner_or_admin(Some(&session(5, UserRole::User)), 5)
            .await
            .is_ok());
        assert!(gate
            .require_owner_or_admin(Some(&session(5, UserRole::User)), 7)
            .await
            .is_err());

        let gate = AuthGate::new(Arc::new(FakeRoleStore::with_user(1, UserRole::Admin)));
        assert!(gate
            .require_owner_or_admin(Some(&session(1, UserRole::User)), 7)
            .await
            .is_ok());
    }
}
