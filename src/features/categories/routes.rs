use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::categories::handlers::{
    create_category, delete_category, get_category, list_categories, update_category,
};
use crate::features::categories::services::CategoryService;
use crate::modules::view_cache::ViewCache;

#[derive(Clone)]
pub struct CategoriesState {
    pub service: Arc<CategoryService>,
    pub cache: Arc<ViewCache>,
}

/// Read-only category routes for authenticated members.
pub fn protected_routes(state: CategoriesState) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
        .with_state(state)
}

/// Category management routes, nested under `/api/admin`.
pub fn admin_routes(state: CategoriesState) -> Router {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/{id}",
            patch(update_category).delete(delete_category),
        )
        .with_state(state)
}
