use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::auth::handlers::{get_me, login};
use crate::features::auth::services::AuthService;

#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
}

/// Sign-in route; mounted outside the session middleware.
pub fn public_routes(state: AuthState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .with_state(state)
}

/// Session-bound routes, mounted behind the auth middleware.
pub fn protected_routes(state: AuthState) -> Router {
    Router::new()
        .route("/auth/me", get(get_me))
        .with_state(state)
}
