use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// One or more of merchantId/username/password could not be resolved
    #[error("missing required credentials: {}", .missing.join(", "))]
    Validation {
        missing: Vec<&'static str>,
        details: Value,
    },

    /// The gateway answered with a non-success status
    #[error("gateway returned HTTP {status}")]
    Gateway { status: u16, details: Value },

    /// The request went out but no response came back
    #[error("network error: {0}")]
    Network(String),

    /// Any other failure while building, sending or reading the gateway call
    #[error("request error: {0}")]
    Request(String),

    /// Operator endpoint called without a valid bearer token
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("route not found: {method} {path}")]
    NotFound { method: String, path: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation { .. } => "validation_error",
            RelayError::Gateway { .. } => "api_error",
            RelayError::Network(_) => "network_error",
            RelayError::Request(_) => "request_error",
            RelayError::Unauthorized(_) => "unauthorized",
            RelayError::NotFound { .. } => "not_found",
            RelayError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation { .. } => StatusCode::BAD_REQUEST,
            RelayError::Gateway { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            RelayError::NotFound { .. } => StatusCode::NOT_FOUND,
            RelayError::Network(_) | RelayError::Request(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            RelayError::Validation { details, .. } => serde_json::json!({
                "error": "Missing required credentials",
                "details": details,
            }),
            RelayError::Gateway { status, details } => {
                tracing::warn!(status, "gateway rejected session request");
                serde_json::json!({
                    "error": "API Error",
                    "details": details,
                    "status": status,
                })
            }
            RelayError::Network(msg) => {
                tracing::error!("Network error: {}", msg);
                serde_json::json!({
                    "error": "Network Error",
                    "details": msg,
                })
            }
            RelayError::Request(msg) => {
                tracing::error!("Request error: {}", msg);
                serde_json::json!({
                    "error": "Request Error",
                    "details": msg,
                })
            }
            RelayError::Unauthorized(msg) => serde_json::json!({
                "error": "Unauthorized",
                "details": msg,
            }),
            RelayError::NotFound { method, path } => serde_json::json!({
                "error": "Not Found",
                "details": format!("Route {} {} not found", method, path),
            }),
            RelayError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                serde_json::json!({
                    "error": "Internal Server Error",
                    "details": msg,
                })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn body_json(resp: HttpResponse) -> Value {
        let bytes = resp.into_body().try_into_bytes().ok().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_gateway_error_forwards_status_and_body() {
        let err = RelayError::Gateway {
            status: 422,
            details: serde_json::json!({"error": "bad field"}),
        };
        let resp = err.error_response();
        assert_eq!(resp.status().as_u16(), 422);
        assert_eq!(
            body_json(resp),
            serde_json::json!({"error": "API Error", "details": {"error": "bad field"}, "status": 422})
        );
    }

    #[test]
    fn test_invalid_gateway_status_becomes_bad_gateway() {
        let err = RelayError::Gateway {
            status: 42,
            details: Value::Null,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_network_and_request_errors_are_500() {
        let resp = RelayError::Network("timed out".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp)["error"], "Network Error");

        let resp = RelayError::Request("bad url".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp)["details"], "bad url");
    }

    #[test]
    fn test_not_found_message() {
        let resp = RelayError::NotFound {
            method: "GET".into(),
            path: "/nope".into(),
        }
        .error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp)["details"], "Route GET /nope not found");
    }

    #[test]
    fn test_unauthorized_is_401() {
        let resp = RelayError::Unauthorized("bearer token required").error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(resp),
            serde_json::json!({"error": "Unauthorized", "details": "bearer token required"})
        );
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = RelayError::Validation {
            missing: vec!["username", "password"],
            details: Value::Null,
        };
        assert_eq!(
            err.to_string(),
            "missing required credentials: username, password"
        );
        assert_eq!(err.kind(), "validation_error");
    }
}
