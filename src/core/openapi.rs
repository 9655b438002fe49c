use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::config::SwaggerConfig;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health_check,
        crate::features::auth::handlers::login,
        crate::features::auth::handlers::get_me,
        crate::features::categories::handlers::list_categories,
        crate::features::categories::handlers::get_category,
        crate::features::categories::handlers::create_category,
        crate::features::categories::handlers::update_category,
        crate::features::categories::handlers::delete_category,
        crate::features::submissions::handlers::list_submissions,
        crate::features::submissions::handlers::list_this_week,
        crate::features::submissions::handlers::list_mine,
        crate::features::submissions::handlers::get_submission,
        crate::features::submissions::handlers::create_submission,
        crate::features::submissions::handlers::update_submission,
        crate::features::submissions::handlers::delete_submission,
        crate::features::submissions::handlers::list_all_submissions,
        crate::features::submissions::handlers::batch_delete_submissions,
        crate::features::users::handlers::list_users,
        crate::features::users::handlers::create_user,
        crate::features::users::handlers::update_user,
        crate::features::users::handlers::delete_user,
    ),
    components(schemas(
        crate::features::users::models::UserRole,
        crate::features::users::dtos::UserResponseDto,
        crate::features::users::dtos::CreateUserDto,
        crate::features::users::dtos::UpdateUserDto,
        crate::features::users::dtos::DeleteUserResponseDto,
        crate::features::auth::dtos::LoginRequestDto,
        crate::features::auth::dtos::LoginResponseDto,
        crate::features::categories::dtos::CategoryResponseDto,
        crate::features::categories::dtos::CreateCategoryDto,
        crate::features::categories::dtos::UpdateCategoryDto,
        crate::features::categories::dtos::DeleteCategoryResponseDto,
        crate::features::submissions::dtos::SubmissionResponseDto,
        crate::features::submissions::dtos::SubmissionListItemDto,
        crate::features::submissions::dtos::UpdateSubmissionDto,
        crate::features::submissions::dtos::BatchDeleteRequestDto,
        crate::features::submissions::dtos::BatchDeleteResponseDto,
        crate::features::submissions::dtos::DeleteSubmissionResponseDto,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Slack sign-in and session"),
        (name = "categories", description = "Contest categories"),
        (name = "submissions", description = "Contest entries"),
        (name = "admin-users", description = "User administration"),
        (name = "admin-categories", description = "Category administration"),
        (name = "admin-submissions", description = "Submission administration"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Overlay the configured title/version/description onto the generated
/// document.
pub fn api_doc(config: &SwaggerConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = config.title.clone();
    doc.info.version = config.version.clone();
    doc.info.description = Some(config.description.clone());
    doc
}
