use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::types::message_field;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure. There is no failure body to inspect.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A 2xx body that lacks the shape the call needs.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered with a non-2xx status.
    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },
}

impl ApiError {
    /// The `error` field of the failure body, if the server set a truthy one.
    /// Non-string values are shown as their JSON text.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::Status { body: Some(body), .. } => message_field(body, "error"),
            _ => None,
        }
    }

    /// Message for display: the server's message, else `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(body: Option<Value>) -> ApiError {
        ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body,
        }
    }

    #[test]
    fn test_server_message_from_error_field() {
        let err = status_error(Some(json!({"error": "Failed to create project 'x'"})));
        assert_eq!(
            err.server_message().as_deref(),
            Some("Failed to create project 'x'")
        );
        assert_eq!(err.display_message("fallback"), "Failed to create project 'x'");
    }

    #[test]
    fn test_fallback_when_field_missing_or_empty() {
        for body in [
            None,
            Some(json!({})),
            Some(json!({"error": ""})),
            Some(json!({"error": null})),
            Some(json!({"error": false})),
            Some(json!({"error": 0})),
            Some(json!("plain text")),
        ] {
            let err = status_error(body);
            assert_eq!(err.server_message(), None);
            assert_eq!(err.display_message("fallback"), "fallback");
        }
    }

    #[test]
    fn test_non_string_error_field_is_shown() {
        let err = status_error(Some(json!({"error": {"code": 7, "reason": "quota"}})));
        assert_eq!(
            err.display_message("fallback"),
            r#"{"code":7,"reason":"quota"}"#
        );
        let err = status_error(Some(json!({"error": 404})));
        assert_eq!(err.display_message("fallback"), "404");
    }

    #[test]
    fn test_decode_error_uses_fallback() {
        let err = ApiError::from(serde_json::from_str::<Value>("{").unwrap_err());
        assert_eq!(err.server_message(), None);
        assert_eq!(err.display_message("fallback"), "fallback");
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: None,
        };
        assert_eq!(err.to_string(), "server returned 500 Internal Server Error");
    }
}
