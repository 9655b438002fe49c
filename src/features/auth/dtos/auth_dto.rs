use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::dtos::UserResponseDto;

/// Request DTO for completing the Slack OAuth flow
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    /// OAuth authorization code returned by Slack
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    /// Redirect URI the code was issued for
    #[validate(url(message = "redirect_uri must be a valid URL"))]
    pub redirect_uri: String,
}

/// Response DTO for a successful sign-in
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponseDto {
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: UserResponseDto,
}
