use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

/// Entities the data access layer operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Category,
    Submission,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::User => "user",
            Entity::Category => "category",
            Entity::Submission => "submission",
        }
    }
}

/// Logical operations the data access layer performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Failure classes a store operation can produce. Closed set so callers
/// can branch without parsing message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The targeted row does not exist (distinct from a store exception).
    NotFound,
    /// The store could not be reached or a connection could not be acquired.
    Connection,
    /// A database constraint rejected the statement (unique, foreign key).
    Constraint,
    /// Anything else the store reported.
    Unexpected,
}

impl StoreErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::Connection => "connection",
            StoreErrorKind::Constraint => "constraint",
            StoreErrorKind::Unexpected => "unexpected",
        }
    }
}

/// Tagged failure from the data access layer: which entity, which
/// operation, what went wrong, plus free-text detail for the logs.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub entity: Entity,
    pub operation: Operation,
    pub kind: StoreErrorKind,
    pub detail: String,
}

impl StoreError {
    pub fn new(
        entity: Entity,
        operation: Operation,
        kind: StoreErrorKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            entity,
            operation,
            kind,
            detail: detail.into(),
        }
    }

    pub fn not_found(entity: Entity, operation: Operation) -> Self {
        Self::new(
            entity,
            operation,
            StoreErrorKind::NotFound,
            format!("{} not found", entity.as_str()),
        )
    }

    /// Classify a sqlx error for the given entity/operation pair.
    ///
    /// `RowNotFound` is deliberately NOT mapped here; services detect
    /// missing rows via `fetch_optional`/`rows_affected` and use
    /// [`StoreError::not_found`] so the distinction survives.
    pub fn from_sqlx(entity: Entity, operation: Operation, err: &sqlx::Error) -> Self {
        let kind = match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreErrorKind::Connection,
            sqlx::Error::Database(db) if db.constraint().is_some() => StoreErrorKind::Constraint,
            _ => StoreErrorKind::Unexpected,
        };
        Self::new(entity, operation, kind, err.to_string())
    }

    /// Stable machine-readable code, e.g. `submission/delete/not_found`.
    pub fn code(&self) -> String {
        format!(
            "{}/{}/{}",
            self.entity.as_str(),
            self.operation.as_str(),
            self.kind.as_str()
        )
    }

    /// Message safe to show to callers. Connection and unexpected
    /// failures stay generic; detail goes to the logs only.
    pub fn public_message(&self) -> String {
        match self.kind {
            StoreErrorKind::NotFound => {
                format!("{} not found", capitalize(self.entity.as_str()))
            }
            StoreErrorKind::Connection => "Failed to connect to the database".to_string(),
            StoreErrorKind::Constraint => format!(
                "The {} could not be {}d because related records exist or a constraint was violated",
                self.entity.as_str(),
                self.operation.as_str()
            ),
            StoreErrorKind::Unexpected => format!(
                "An unexpected error occurred while trying to {} the {}",
                self.operation.as_str(),
                self.entity.as_str()
            ),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.detail)
    }
}

impl std::error::Error for StoreError {}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Store(StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::Store(ref e) => {
                let status = match e.kind {
                    StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
                    StoreErrorKind::Constraint => StatusCode::CONFLICT,
                    StoreErrorKind::Connection | StoreErrorKind::Unexpected => {
                        tracing::error!("Store error [{}]: {}", e.code(), e.detail);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.public_message(), Some(e.code()))
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::ExternalServiceError(ref msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), code));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_code_is_stable_per_entity_and_operation() {
        let err = StoreError::not_found(Entity::Submission, Operation::Delete);
        assert_eq!(err.code(), "submission/delete/not_found");

        let err = StoreError::new(
            Entity::Category,
            Operation::Create,
            StoreErrorKind::Constraint,
            "duplicate key",
        );
        assert_eq!(err.code(), "category/create/constraint");
    }

    #[test]
    fn connection_failures_classify_from_sqlx() {
        let err = StoreError::from_sqlx(Entity::User, Operation::List, &sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind, StoreErrorKind::Connection);
        assert_eq!(err.code(), "user/list/connection");
    }

    #[test]
    fn unexpected_detail_never_reaches_the_public_message() {
        let err = StoreError::new(
            Entity::User,
            Operation::Get,
            StoreErrorKind::Unexpected,
            "password authentication failed for user \"app\"",
        );
        assert!(!err.public_message().contains("password"));
    }

    #[test]
    fn store_error_http_status_mapping() {
        use axum::response::IntoResponse;

        let not_found: AppError =
            StoreError::not_found(Entity::Category, Operation::Update).into();
        assert_eq!(
            not_found.into_response().status(),
            StatusCode::NOT_FOUND
        );

        let constraint: AppError = StoreError::new(
            Entity::Category,
            Operation::Delete,
            StoreErrorKind::Constraint,
            "fk violation",
        )
        .into();
        assert_eq!(constraint.into_response().status(), StatusCode::CONFLICT);

        let connection: AppError = StoreError::new(
            Entity::Submission,
            Operation::List,
            StoreErrorKind::Connection,
            "pool timed out",
        )
        .into();
        assert_eq!(
            connection.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
