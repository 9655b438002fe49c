use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::users::dtos::{
    CreateUserDto, DeleteUserResponseDto, UpdateUserDto, UserResponseDto,
};
use crate::features::users::routes::UsersState;
use crate::features::users::services::UserChanges;
use crate::shared::constants::VIEW_ADMIN_USERS;
use crate::shared::types::ApiResponse;

/// List all users (admin)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin-users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    if let Some(cached) = state.cache.get(VIEW_ADMIN_USERS).await {
        return Ok(Json(ApiResponse::success(Some(cached), None)));
    }

    let users = state.service.list().await?;
    let dtos: Vec<UserResponseDto> = users.into_iter().map(|u| u.into()).collect();
    let value = serde_json::to_value(dtos)
        .map_err(|e| AppError::Internal(format!("Failed to serialize users: {}", e)))?;

    state.cache.put(VIEW_ADMIN_USERS, value.clone()).await;
    Ok(Json(ApiResponse::success(Some(value), None)))
}

/// Create a user (admin)
///
/// Enriches the row with the member's Slack avatar when an avatar token
/// is configured; lookup failures are skipped silently.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Email already registered")
    ),
    tag = "admin-users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<UsersState>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let icon = state.avatars.lookup_avatar(&dto.email).await;

    let user = state
        .service
        .create(
            &dto.email,
            &dto.first_name,
            &dto.last_name,
            icon.as_deref(),
            dto.role,
        )
        .await?;

    state.cache.invalidate(&[VIEW_ADMIN_USERS]).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user.into()), None)),
    ))
}

/// Update a user (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin-users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<UsersState>,
    Path(user_id): Path<i64>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state
        .service
        .update(
            user_id,
            UserChanges {
                email: dto.email,
                first_name: dto.first_name,
                last_name: dto.last_name,
                icon: dto.icon,
                role: dto.role,
            },
        )
        .await?;

    state.cache.invalidate(&[VIEW_ADMIN_USERS]).await;

    Ok(Json(ApiResponse::success(Some(user.into()), None)))
}

/// Delete a user (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeleteUserResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still owns submissions")
    ),
    tag = "admin-users",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteUserResponseDto>>> {
    state.service.delete(user_id).await?;

    state.cache.invalidate(&[VIEW_ADMIN_USERS]).await;

    Ok(Json(ApiResponse::success(
        Some(DeleteUserResponseDto { deleted: true }),
        Some("User deleted successfully".to_string()),
    )))
}
