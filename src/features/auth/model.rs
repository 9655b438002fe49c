use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::features::users::models::UserRole;

/// Identity claimed by a decoded session token.
///
/// The role here is whatever the token was issued with and may be stale;
/// anything role-sensitive must go through [`AuthGate`] for a fresh
/// lookup against the users table.
///
/// [`AuthGate`]: crate::features::auth::gate::AuthGate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
}

/// Handlers take `SessionUser` as an argument; the session middleware
/// stashes it in request extensions after verifying the token.
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Identity confirmed against the users table at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl VerifiedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// JWT claims carried by the session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub email: String,
    pub role: UserRole,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    use crate::shared::test_helpers::with_admin_session;

    async fn whoami(session: SessionUser) -> String {
        session.email
    }

    #[tokio::test]
    async fn session_extractor_rejects_requests_without_a_session() {
        let server = TestServer::new(Router::new().route("/whoami", get(whoami))).unwrap();

        let response = server.get("/whoami").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_extractor_reads_the_stashed_identity() {
        let router = with_admin_session(Router::new().route("/whoami", get(whoami)));
        let server = TestServer::new(router).unwrap();

        let response = server.get("/whoami").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "user1@example.com");
    }
}
