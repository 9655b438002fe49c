use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::submissions::models::{Submission, SubmissionWithContext};

/// Content types accepted for contest photos.
pub const ALLOWED_IMAGE_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Maximum photo size: 20 MB.
pub const MAX_PHOTO_SIZE: usize = 20 * 1024 * 1024;

pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_IMAGE_MIME_TYPES.contains(&content_type)
}

/// File extension for an accepted content type.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Reject a photo before it touches storage.
pub fn validate_photo(size: usize, content_type: &str) -> Result<(), AppError> {
    if !is_mime_type_allowed(content_type) {
        return Err(AppError::Validation(format!(
            "Unsupported image type '{}'. Allowed: {}",
            content_type,
            ALLOWED_IMAGE_MIME_TYPES.join(", ")
        )));
    }

    if size > MAX_PHOTO_SIZE {
        return Err(AppError::Validation(format!(
            "Photo exceeds the maximum size of {} MB",
            MAX_PHOTO_SIZE / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Response DTO for a submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponseDto {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub image_link: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_winner: bool,
}

impl From<Submission> for SubmissionResponseDto {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            category_id: s.category_id,
            image_link: s.image_link,
            title: s.title,
            description: s.description,
            location: s.location,
            created_at: s.created_at,
            is_winner: s.is_winner,
        }
    }
}

/// Response DTO for list views: a submission with author and category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionListItemDto {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub image_link: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_winner: bool,
    pub author_name: String,
    pub category_name: String,
}

impl From<SubmissionWithContext> for SubmissionListItemDto {
    fn from(s: SubmissionWithContext) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            category_id: s.category_id,
            image_link: s.image_link,
            title: s.title,
            description: s.description,
            location: s.location,
            created_at: s.created_at,
            is_winner: s.is_winner,
            author_name: format!("{} {}", s.author_first_name, s.author_last_name),
            category_name: s.category_name,
        }
    }
}

/// Request DTO for editing a submission's metadata. The photo itself is
/// immutable; re-uploading means a new submission.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubmissionDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "description is limited to 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "location is limited to 200 characters"))]
    pub location: Option<String>,
    pub category_id: Option<i64>,
}

/// Request DTO for deleting several submissions at once (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BatchDeleteRequestDto {
    #[validate(length(min = 1, message = "ids must not be empty"))]
    pub ids: Vec<i64>,
}

/// Response DTO for batch deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchDeleteResponseDto {
    pub deleted_count: usize,
}

/// Response DTO for single deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteSubmissionResponseDto {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_at_the_size_limit_is_accepted() {
        assert!(validate_photo(MAX_PHOTO_SIZE, "image/png").is_ok());
    }

    #[test]
    fn photo_one_byte_over_the_limit_is_rejected() {
        assert!(validate_photo(MAX_PHOTO_SIZE + 1, "image/png").is_err());
    }

    #[test]
    fn unsupported_content_type_is_rejected_regardless_of_size() {
        assert!(validate_photo(1024, "image/gif").is_err());
        assert!(validate_photo(1024, "application/pdf").is_err());
    }

    #[test]
    fn accepted_content_types_map_to_extensions() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_content_type("image/jpg"), Some("jpg"));
        assert_eq!(extension_for_content_type("image/png"), Some("png"));
        assert_eq!(extension_for_content_type("image/webp"), Some("webp"));
        assert_eq!(extension_for_content_type("image/gif"), None);
    }

    #[test]
    fn list_item_joins_author_name() {
        let item: SubmissionListItemDto = SubmissionWithContext {
            id: 1,
            user_id: 2,
            category_id: 3,
            image_link: "http://localhost:9000/photo-contest/submissions/2_1.jpg".to_string(),
            title: "Sunrise".to_string(),
            description: None,
            location: Some("Harbor".to_string()),
            created_at: Utc::now(),
            is_winner: false,
            author_first_name: "Ada".to_string(),
            author_last_name: "Lovelace".to_string(),
            category_name: "Landscape".to_string(),
        }
        .into();

        assert_eq!(item.author_name, "Ada Lovelace");
        assert_eq!(item.category_name, "Landscape");
    }
}
