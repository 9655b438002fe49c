use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// JSON body extractor whose rejections surface through the standard
/// error envelope instead of axum's plain-text responses.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let message = match rejection {
                    JsonRejection::JsonDataError(e) => format!("Invalid JSON data: {}", e),
                    JsonRejection::JsonSyntaxError(e) => format!("Invalid JSON syntax: {}", e),
                    JsonRejection::MissingJsonContentType(e) => {
                        format!("Missing JSON content type: {}", e)
                    }
                    other => format!("Failed to read JSON body: {}", other),
                };
                AppError::BadRequest(message)
            })?;

        Ok(Self(value))
    }
}
