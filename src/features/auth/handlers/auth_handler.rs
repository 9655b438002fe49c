use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto};
use crate::features::auth::model::SessionUser;
use crate::features::auth::routes::AuthState;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::types::ApiResponse;

/// Complete the Slack sign-in flow and issue a session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Slack rejected the sign-in"),
        (status = 403, description = "Member of a different workspace")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, user) = state.service.login(&dto.code, &dto.redirect_uri).await?;

    Ok(Json(ApiResponse::success(
        Some(LoginResponseDto {
            token,
            user: user.into(),
        }),
        Some("Signed in successfully".to_string()),
    )))
}

/// Return the authenticated user's own record
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<AuthState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = state.service.me(&session).await?;
    Ok(Json(ApiResponse::success(Some(user.into()), None)))
}
