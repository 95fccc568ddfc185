use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse failure class attached to rejected command calls. Backends that
/// predate the structured body omit it, so decoding defaults to `Internal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    NotFound,
    Validation,
    BackendUnavailable,
    #[default]
    Internal,
}

/// Structured failure body returned by the batch backend for a rejected
/// command call. The message is operator-facing and surfaced verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(default)]
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_without_a_code_decodes_as_internal() {
        let err: ApiError =
            serde_json::from_str(r#"{"message":"batch store unavailable"}"#).expect("body");
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.to_string(), "batch store unavailable");
    }

    #[test]
    fn code_uses_snake_case_on_the_wire() {
        let err: ApiError = serde_json::from_str(
            r#"{"code":"backend_unavailable","message":"Backend grocy not available"}"#,
        )
        .expect("body");
        assert_eq!(err.code, ErrorCode::BackendUnavailable);
    }
}
