use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform result envelope for every endpoint.
///
/// Failures carry a human-readable `message` and, for store failures, a
/// stable machine-readable `code` (e.g. `submission/delete/not_found`)
/// so callers can branch without parsing message text.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
            code: None,
        }
    }

    pub fn error(message: Option<String>, code: Option<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_shape() {
        let resp = ApiResponse::<()>::error(
            Some("Submission not found".to_string()),
            Some("submission/get/not_found".to_string()),
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "submission/get/not_found");
        assert!(json["data"].is_null());
    }

    #[test]
    fn success_envelope_omits_code() {
        let resp = ApiResponse::success(Some(1), None);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("code").is_none());
    }
}
