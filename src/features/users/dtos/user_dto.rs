use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::{User, UserRole};

/// Maps a present field to `Some(value)` so that, combined with
/// `#[serde(default)]`, an omitted field and an explicit `null` stay
/// distinguishable.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Response DTO for a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub icon: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            icon: u.icon,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Request DTO for creating a user (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Request DTO for updating a user (admin only). All fields optional.
/// An omitted `icon` leaves the stored avatar untouched; an explicit
/// `"icon": null` clears it.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub icon: Option<Option<String>>,
    pub role: Option<UserRole>,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponseDto {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_dto_distinguishes_omitted_icon_from_explicit_null() {
        let omitted: UpdateUserDto = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(omitted.icon, None);

        let cleared: UpdateUserDto = serde_json::from_str(r#"{"icon":null}"#).unwrap();
        assert_eq!(cleared.icon, Some(None));

        let set: UpdateUserDto =
            serde_json::from_str(r#"{"icon":"https://avatars.example.com/a.png"}"#).unwrap();
        assert_eq!(
            set.icon,
            Some(Some("https://avatars.example.com/a.png".to_string()))
        );
    }
}
