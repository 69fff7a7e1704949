//! `{ success, data?, error? }` envelope shared by every transport.

use crate::utils::error::{EngineError, ErrorCategory};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Handler error. Malformed input is the caller's bug and maps to 400; anything
/// else is a 500 with a sanitized message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Engine(err) if err.category() == ErrorCategory::Input => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Engine(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SlotCheck;

    #[test]
    fn test_envelope_shape() {
        let ok = serde_json::to_value(ApiResponse::ok(3)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 3}));

        let failed = serde_json::to_value(ApiResponse::<u8>::failure("nope")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "error": "nope"}));
    }

    fn decode<T: serde::de::DeserializeOwned>(raw: serde_json::Value) -> ApiResponse<T> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_envelope_decodes_payloads_without_default() {
        let ok: ApiResponse<SlotCheck> = decode(serde_json::json!({"success": true, "data": {"valid": true}}));
        assert_eq!(ok.data, Some(SlotCheck::accepted()));

        let failed: ApiResponse<SlotCheck> = decode(serde_json::json!({"success": false, "error": "store offline"}));
        assert!(failed.data.is_none());
        assert_eq!(failed.error.as_deref(), Some("store offline"));
    }

    #[test]
    fn test_input_errors_are_bad_requests() {
        let err = ApiError::from(EngineError::invalid_input("date", "x", "bad"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(EngineError::ConfigError {
            message: "boom".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
