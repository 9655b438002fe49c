use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, DeleteCategoryResponseDto, UpdateCategoryDto,
};
use crate::features::categories::routes::CategoriesState;
use crate::shared::constants::{VIEW_ADMIN_CATEGORIES, VIEW_HOME};
use crate::shared::types::ApiResponse;

/// List all categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn list_categories(
    State(state): State<CategoriesState>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    if let Some(cached) = state.cache.get(VIEW_ADMIN_CATEGORIES).await {
        return Ok(Json(ApiResponse::success(Some(cached), None)));
    }

    let categories = state.service.list().await?;
    let dtos: Vec<CategoryResponseDto> = categories.into_iter().map(|c| c.into()).collect();
    let value = serde_json::to_value(dtos)
        .map_err(|e| AppError::Internal(format!("Failed to serialize categories: {}", e)))?;

    state.cache.put(VIEW_ADMIN_CATEGORIES, value.clone()).await;
    Ok(Json(ApiResponse::success(Some(value), None)))
}

/// Get a category by id
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<CategoryResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn get_category(
    State(state): State<CategoriesState>,
    Path(category_id): Path<i64>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = state.service.get_by_id(category_id).await?;
    Ok(Json(ApiResponse::success(Some(category.into()), None)))
}

/// Create a category (admin)
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin-categories",
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<CategoriesState>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = state.service.create(dto.name.trim()).await?;

    state
        .cache
        .invalidate(&[VIEW_ADMIN_CATEGORIES, VIEW_HOME])
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(category.into()), None)),
    ))
}

/// Rename a category (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Category not found")
    ),
    tag = "admin-categories",
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<CategoriesState>,
    Path(category_id): Path<i64>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = state.service.update(category_id, dto.name.trim()).await?;

    state
        .cache
        .invalidate(&[VIEW_ADMIN_CATEGORIES, VIEW_HOME])
        .await;

    Ok(Json(ApiResponse::success(Some(category.into()), None)))
}

/// Delete a category (admin)
///
/// Rejected with 409 while submissions still reference the category.
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<DeleteCategoryResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category is still referenced by submissions")
    ),
    tag = "admin-categories",
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<CategoriesState>,
    Path(category_id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteCategoryResponseDto>>> {
    state.service.delete(category_id).await?;

    state
        .cache
        .invalidate(&[VIEW_ADMIN_CATEGORIES, VIEW_HOME])
        .await;

    Ok(Json(ApiResponse::success(
        Some(DeleteCategoryResponseDto { deleted: true }),
        Some("Category deleted successfully".to_string()),
    )))
}
