use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::users::clients::SlackAvatarClient;
use crate::features::users::handlers::{create_user, delete_user, list_users, update_user};
use crate::features::users::services::UserService;
use crate::modules::view_cache::ViewCache;

#[derive(Clone)]
pub struct UsersState {
    pub service: Arc<UserService>,
    pub avatars: Arc<SlackAvatarClient>,
    pub cache: Arc<ViewCache>,
}

/// Admin-only user management routes, nested under `/api/admin`.
pub fn admin_routes(state: UsersState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", patch(update_user).delete(delete_user))
        .with_state(state)
}
