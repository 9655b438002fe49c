use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;

use crate::features::auth::gate::AuthGate;
use crate::features::submissions::dtos::MAX_PHOTO_SIZE;
use crate::features::submissions::handlers::{
    batch_delete_submissions, create_submission, delete_submission, get_submission,
    list_all_submissions, list_mine, list_submissions, list_this_week, update_submission,
};
use crate::features::submissions::services::SubmissionService;
use crate::modules::storage::MinIOClient;
use crate::modules::view_cache::ViewCache;

#[derive(Clone)]
pub struct SubmissionsState {
    pub service: Arc<SubmissionService>,
    pub storage: Arc<MinIOClient>,
    pub cache: Arc<ViewCache>,
    pub gate: Arc<AuthGate>,
    pub timezone: Tz,
}

/// Member-facing submission routes, mounted behind the auth middleware.
pub fn protected_routes(state: SubmissionsState) -> Router {
    Router::new()
        .route("/submissions", get(list_submissions).post(create_submission))
        .route("/submissions/this-week", get(list_this_week))
        .route("/submissions/mine", get(list_mine))
        .route(
            "/submissions/{id}",
            get(get_submission)
                .patch(update_submission)
                .delete(delete_submission),
        )
        // Allow the photo plus form fields and multipart framing
        .layer(DefaultBodyLimit::max(MAX_PHOTO_SIZE + 1024 * 1024))
        .with_state(state)
}

/// Admin submission routes, nested under `/api/admin`.
pub fn admin_routes(state: SubmissionsState) -> Router {
    Router::new()
        .route("/submissions", get(list_all_submissions))
        .route("/submissions/batch-delete", post(batch_delete_submissions))
        .with_state(state)
}
