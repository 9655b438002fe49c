use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::SessionUser;
use crate::features::submissions::dtos::{
    extension_for_content_type, validate_photo, BatchDeleteRequestDto, BatchDeleteResponseDto,
    DeleteSubmissionResponseDto, SubmissionListItemDto, SubmissionResponseDto,
    UpdateSubmissionDto,
};
use crate::features::submissions::routes::SubmissionsState;
use crate::features::submissions::services::SubmissionChanges;
use crate::modules::storage::MinIOClient;
use crate::shared::constants::{VIEW_ADMIN_SUBMISSIONS, VIEW_HOME, VIEW_SUBMISSIONS};
use crate::shared::types::ApiResponse;
use crate::shared::week::week_start;

/// Parsed multipart form for a new submission.
struct NewSubmissionForm {
    photo: Vec<u8>,
    content_type: String,
    title: String,
    description: Option<String>,
    location: Option<String>,
    category_id: i64,
}

impl NewSubmissionForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut photo: Option<(Vec<u8>, String)> = None;
        let mut title: Option<String> = None;
        let mut description: Option<String> = None;
        let mut location: Option<String> = None;
        let mut category_id: Option<i64> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            match field.name() {
                Some("file") => {
                    let content_type = field
                        .content_type()
                        .map(|ct| ct.to_string())
                        .ok_or_else(|| {
                            AppError::Validation(
                                "The file part must declare a content type".to_string(),
                            )
                        })?;
                    let data = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read file part: {}", e))
                    })?;
                    photo = Some((data.to_vec(), content_type));
                }
                Some("title") => {
                    title = Some(Self::text(field).await?);
                }
                Some("description") => {
                    description = Some(Self::text(field).await?).filter(|s| !s.is_empty());
                }
                Some("location") => {
                    location = Some(Self::text(field).await?).filter(|s| !s.is_empty());
                }
                Some("category_id") => {
                    let raw = Self::text(field).await?;
                    category_id = Some(raw.parse::<i64>().map_err(|_| {
                        AppError::Validation("category_id must be a number".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let (photo, content_type) = photo
            .ok_or_else(|| AppError::Validation("A photo file is required".to_string()))?;
        let title = title
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("title is required".to_string()))?;
        let category_id = category_id
            .ok_or_else(|| AppError::Validation("category_id is required".to_string()))?;

        Ok(Self {
            photo,
            content_type,
            title,
            description,
            location,
            category_id,
        })
    }

    async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
        Ok(field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {}", e)))?
            .trim()
            .to_string())
    }
}

/// This week's entries for the homepage carousel
///
/// The week starts Monday 00:00 in the configured contest time zone.
#[utoipa::path(
    get,
    path = "/api/submissions/this-week",
    responses(
        (status = 200, description = "This week's submissions", body = ApiResponse<Vec<SubmissionListItemDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "submissions",
    security(("bearer_auth" = []))
)]
pub async fn list_this_week(
    State(state): State<SubmissionsState>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    if let Some(cached) = state.cache.get(VIEW_HOME).await {
        return Ok(Json(ApiResponse::success(Some(cached), None)));
    }

    let cutoff = week_start(Utc::now(), state.timezone);
    let submissions = state.service.list_since(cutoff).await?;
    let dtos: Vec<SubmissionListItemDto> = submissions.into_iter().map(|s| s.into()).collect();
    let value = serde_json::to_value(dtos)
        .map_err(|e| AppError::Internal(format!("Failed to serialize submissions: {}", e)))?;

    state.cache.put(VIEW_HOME, value.clone()).await;
    Ok(Json(ApiResponse::success(Some(value), None)))
}

/// All submissions for the member-facing grid view
#[utoipa::path(
    get,
    path = "/api/submissions",
    responses(
        (status = 200, description = "All submissions", body = ApiResponse<Vec<SubmissionListItemDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "submissions",
    security(("bearer_auth" = []))
)]
pub async fn list_submissions(
    State(state): State<SubmissionsState>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    if let Some(cached) = state.cache.get(VIEW_SUBMISSIONS).await {
        return Ok(Json(ApiResponse::success(Some(cached), None)));
    }

    let submissions = state.service.list_all().await?;
    let dtos: Vec<SubmissionListItemDto> = submissions.into_iter().map(|s| s.into()).collect();
    let value = serde_json::to_value(dtos)
        .map_err(|e| AppError::Internal(format!("Failed to serialize submissions: {}", e)))?;

    state.cache.put(VIEW_SUBMISSIONS, value.clone()).await;
    Ok(Json(ApiResponse::success(Some(value), None)))
}

/// The authenticated member's own submissions
#[utoipa::path(
    get,
    path = "/api/submissions/mine",
    responses(
        (status = 200, description = "Own submissions", body = ApiResponse<Vec<SubmissionListItemDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "submissions",
    security(("bearer_auth" = []))
)]
pub async fn list_mine(
    State(state): State<SubmissionsState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<Vec<SubmissionListItemDto>>>> {
    let user = state.gate.require(Some(&session), None).await?;

    let submissions = state.service.list_by_user(user.id).await?;
    let dtos: Vec<SubmissionListItemDto> = submissions.into_iter().map(|s| s.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None)))
}

/// Get a submission by id
#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(("id" = i64, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission", body = ApiResponse<SubmissionResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Submission not found")
    ),
    tag = "submissions",
    security(("bearer_auth" = []))
)]
pub async fn get_submission(
    State(state): State<SubmissionsState>,
    Path(submission_id): Path<i64>,
) -> Result<Json<ApiResponse<SubmissionResponseDto>>> {
    let submission = state.service.get_by_id(submission_id).await?;
    Ok(Json(ApiResponse::success(Some(submission.into()), None)))
}

/// Upload a new contest entry
///
/// Multipart form with parts `file`, `title`, `category_id` and
/// optionally `description` and `location`. The photo is validated
/// before anything is written to storage.
#[utoipa::path(
    post,
    path = "/api/submissions",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Submission created", body = ApiResponse<SubmissionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 409, description = "Unknown category")
    ),
    tag = "submissions",
    security(("bearer_auth" = []))
)]
pub async fn create_submission(
    State(state): State<SubmissionsState>,
    session: SessionUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionResponseDto>>)> {
    let user = state.gate.require(Some(&session), None).await?;

    let form = NewSubmissionForm::from_multipart(multipart).await?;
    validate_photo(form.photo.len(), &form.content_type)?;

    let extension = extension_for_content_type(&form.content_type).ok_or_else(|| {
        AppError::Validation(format!("Unsupported image type '{}'", form.content_type))
    })?;

    let key = MinIOClient::photo_key(user.id, Utc::now().timestamp(), extension);
    state
        .storage
        .upload(&key, form.photo, &form.content_type)
        .await?;
    let image_link = state.storage.public_url(&key);

    let submission = match state
        .service
        .create(
            user.id,
            form.category_id,
            &image_link,
            &form.title,
            form.description.as_deref(),
            form.location.as_deref(),
        )
        .await
    {
        Ok(submission) => submission,
        Err(e) => {
            // Don't leave an orphaned photo behind
            if let Err(cleanup) = state.storage.delete(&key).await {
                tracing::warn!("Failed to clean up orphaned photo '{}': {}", key, cleanup);
            }
            return Err(e.into());
        }
    };

    state
        .cache
        .invalidate(&[VIEW_HOME, VIEW_SUBMISSIONS, VIEW_ADMIN_SUBMISSIONS])
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(submission.into()),
            Some("Submission created successfully".to_string()),
        )),
    ))
}

/// Edit a submission's metadata (owner or admin)
#[utoipa::path(
    patch,
    path = "/api/submissions/{id}",
    params(("id" = i64, Path, description = "Submission id")),
    request_body = UpdateSubmissionDto,
    responses(
        (status = 200, description = "Submission updated", body = ApiResponse<SubmissionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Submission not found")
    ),
    tag = "submissions",
    security(("bearer_auth" = []))
)]
pub async fn update_submission(
    State(state): State<SubmissionsState>,
    session: SessionUser,
    Path(submission_id): Path<i64>,
    AppJson(dto): AppJson<UpdateSubmissionDto>,
) -> Result<Json<ApiResponse<SubmissionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let existing = state.service.get_by_id(submission_id).await?;
    state
        .gate
        .require_owner_or_admin(Some(&session), existing.user_id)
        .await?;

    let submission = state
        .service
        .update(
            submission_id,
            SubmissionChanges {
                title: dto.title,
                description: dto.description,
                location: dto.location,
                category_id: dto.category_id,
            },
        )
        .await?;

    state
        .cache
        .invalidate(&[VIEW_HOME, VIEW_SUBMISSIONS, VIEW_ADMIN_SUBMISSIONS])
        .await;

    Ok(Json(ApiResponse::success(Some(submission.into()), None)))
}

/// Delete a submission (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/submissions/{id}",
    params(("id" = i64, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission deleted", body = ApiResponse<DeleteSubmissionResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Submission not found")
    ),
    tag = "submissions",
    security(("bearer_auth" = []))
)]
pub async fn delete_submission(
    State(state): State<SubmissionsState>,
    session: SessionUser,
    Path(submission_id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteSubmissionResponseDto>>> {
    let existing = state.service.get_by_id(submission_id).await?;
    state
        .gate
        .require_owner_or_admin(Some(&session), existing.user_id)
        .await?;

    let deleted = state.service.delete(submission_id).await?;
    remove_stored_photo(&state, &deleted.image_link).await;

    state
        .cache
        .invalidate(&[VIEW_HOME, VIEW_SUBMISSIONS, VIEW_ADMIN_SUBMISSIONS])
        .await;

    Ok(Json(ApiResponse::success(
        Some(DeleteSubmissionResponseDto { deleted: true }),
        Some("Submission deleted successfully".to_string()),
    )))
}

/// All submissions with author context (admin)
#[utoipa::path(
    get,
    path = "/api/admin/submissions",
    responses(
        (status = 200, description = "All submissions", body = ApiResponse<Vec<SubmissionListItemDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin-submissions",
    security(("bearer_auth" = []))
)]
pub async fn list_all_submissions(
    State(state): State<SubmissionsState>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    if let Some(cached) = state.cache.get(VIEW_ADMIN_SUBMISSIONS).await {
        return Ok(Json(ApiResponse::success(Some(cached), None)));
    }

    let submissions = state.service.list_all().await?;
    let dtos: Vec<SubmissionListItemDto> = submissions.into_iter().map(|s| s.into()).collect();
    let value = serde_json::to_value(dtos)
        .map_err(|e| AppError::Internal(format!("Failed to serialize submissions: {}", e)))?;

    state.cache.put(VIEW_ADMIN_SUBMISSIONS, value.clone()).await;
    Ok(Json(ApiResponse::success(Some(value), None)))
}

/// Delete several submissions at once (admin)
///
/// Ids that no longer exist are skipped; the response reports how many
/// rows were actually removed.
#[utoipa::path(
    post,
    path = "/api/admin/submissions/batch-delete",
    request_body = BatchDeleteRequestDto,
    responses(
        (status = 200, description = "Submissions deleted", body = ApiResponse<BatchDeleteResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin-submissions",
    security(("bearer_auth" = []))
)]
pub async fn batch_delete_submissions(
    State(state): State<SubmissionsState>,
    AppJson(dto): AppJson<BatchDeleteRequestDto>,
) -> Result<Json<ApiResponse<BatchDeleteResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let deleted = state.service.batch_delete(&dto.ids).await?;
    for submission in &deleted {
        remove_stored_photo(&state, &submission.image_link).await;
    }

    state
        .cache
        .invalidate(&[VIEW_HOME, VIEW_SUBMISSIONS, VIEW_ADMIN_SUBMISSIONS])
        .await;

    Ok(Json(ApiResponse::success(
        Some(BatchDeleteResponseDto {
            deleted_count: deleted.len(),
        }),
        None,
    )))
}

/// Best-effort removal of a stored photo. The row is already gone, so a
/// failed storage delete only leaves an unreferenced object behind.
async fn remove_stored_photo(state: &SubmissionsState, image_link: &str) {
    let Some(key) = state.storage.key_from_public_url(image_link) else {
        tracing::warn!("Submission image link is not in our storage: {}", image_link);
        return;
    };
    if let Err(e) = state.storage.delete(&key).await {
        tracing::warn!("Failed to delete stored photo '{}': {}", key, e);
    }
}
