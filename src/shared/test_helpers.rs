#![cfg(test)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};

use crate::core::error::StoreError;
use crate::features::auth::gate::RoleStore;
use crate::features::auth::model::{SessionUser, VerifiedUser};
use crate::features::users::models::UserRole;

pub fn session_user(id: i64, role: UserRole) -> SessionUser {
    SessionUser {
        user_id: id,
        email: format!("user{}@example.com", id),
        role,
    }
}

/// In-memory [`RoleStore`] holding at most one user. Counts lookups so
/// tests can assert when the store was (not) consulted, and can be made
/// to fail like an unreachable database.
pub struct FakeRoleStore {
    user: Option<VerifiedUser>,
    fail: bool,
    pub lookups: AtomicUsize,
}

impl FakeRoleStore {
    pub fn with_user(id: i64, role: UserRole) -> Self {
        Self {
            user: Some(VerifiedUser {
                id,
                email: format!("user{}@example.com", id),
                role,
            }),
            fail: false,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            user: None,
            fail: false,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            user: None,
            fail: true,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RoleStore for FakeRoleStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<VerifiedUser>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::new(
                crate::core::error::Entity::User,
                crate::core::error::Operation::Get,
                crate::core::error::StoreErrorKind::Connection,
                "connection refused",
            ));
        }
        Ok(self.user.clone())
    }
}

async fn inject_admin_session_middleware(mut request: Request, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(session_user(1, UserRole::Admin));
    next.run(request).await
}

/// Wrap a router so every request carries an admin session claim, as if
/// it had passed the session token middleware.
pub fn with_admin_session(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_session_middleware))
}
