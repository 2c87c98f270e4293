use std::time::Duration;

use base64::Engine;
use serde_json::Value;

use crate::error::RelayError;
use crate::payload::GatewayPayload;
use crate::resolve::Credentials;

const CONTENT_TYPE_JSON_UTF8: &str = "application/json;charset=UTF-8";

/// Maximum gateway response body size (1 MB).
const MAX_RESPONSE_BODY_SIZE: usize = 1024 * 1024;

/// A session created by the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySession {
    pub session_id: String,
    /// Full gateway response, kept for diagnostics
    pub raw: Value,
}

/// `Basic base64(username:password)`
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let token =
        base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", token)
}

/// Sort a reqwest failure into "no response arrived" versus everything else.
fn classify(e: reqwest::Error) -> RelayError {
    if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
        RelayError::Network(e.to_string())
    } else {
        RelayError::Request(e.to_string())
    }
}

/// Read the response body with progressive size enforcement.
async fn read_body(mut response: reqwest::Response) -> Result<Vec<u8>, RelayError> {
    if let Some(cl) = response.content_length() {
        if cl > MAX_RESPONSE_BODY_SIZE as u64 {
            return Err(RelayError::Request(format!(
                "gateway response too large: {} bytes (max {})",
                cl, MAX_RESPONSE_BODY_SIZE
            )));
        }
    }

    let mut body_buf = Vec::with_capacity(
        response
            .content_length()
            .map(|cl| cl as usize)
            .unwrap_or(8192)
            .min(MAX_RESPONSE_BODY_SIZE),
    );
    while let Some(chunk) = response.chunk().await.map_err(classify)? {
        if body_buf.len() + chunk.len() > MAX_RESPONSE_BODY_SIZE {
            return Err(RelayError::Request(format!(
                "gateway response too large (max {} bytes)",
                MAX_RESPONSE_BODY_SIZE
            )));
        }
        body_buf.extend_from_slice(&chunk);
    }
    Ok(body_buf)
}

/// Parse an error body as JSON, falling back to the raw text.
fn error_details(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// POST the payload to the gateway's session endpoint.
///
/// Exactly one attempt is made. Non-success statuses come back as
/// [`RelayError::Gateway`] with the gateway's body untouched.
pub async fn create_session(
    client: &reqwest::Client,
    credentials: &Credentials,
    payload: &GatewayPayload,
    timeout: Duration,
) -> Result<GatewaySession, RelayError> {
    let url = credentials.session_url();
    let body = serde_json::to_vec(payload)
        .map_err(|e| RelayError::Request(format!("failed to encode payload: {e}")))?;

    tracing::debug!(url = %url, "calling gateway session endpoint");

    let response = client
        .post(&url)
        .timeout(timeout)
        .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON_UTF8)
        .header(
            reqwest::header::AUTHORIZATION,
            basic_auth_header(&credentials.username, &credentials.password),
        )
        .header(reqwest::header::ACCEPT, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, url = %url, "gateway request failed");
            classify(e)
        })?;

    let status = response.status();
    let body = read_body(response).await?;

    if !status.is_success() {
        return Err(RelayError::Gateway {
            status: status.as_u16(),
            details: error_details(&body),
        });
    }

    let raw: Value = serde_json::from_slice(&body)
        .map_err(|e| RelayError::Request(format!("invalid gateway response: {e}")))?;

    let session_id = raw
        .pointer("/session/id")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            RelayError::Request("gateway response did not include session.id".to_string())
        })?
        .to_string();

    Ok(GatewaySession { session_id, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        assert_eq!(basic_auth_header("user", "pass"), "Basic dXNlcjpwYXNz");
        assert_eq!(
            basic_auth_header("merchant.TEST", "s3cr:et"),
            format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode("merchant.TEST:s3cr:et")
            )
        );
    }

    #[test]
    fn test_error_details_prefers_json() {
        assert_eq!(
            error_details(br#"{"error":"bad field"}"#),
            serde_json::json!({"error": "bad field"})
        );
        assert_eq!(
            error_details(b"Service Unavailable"),
            Value::String("Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_request_error() {
        let credentials = Credentials {
            merchant_id: "M".into(),
            username: "u".into(),
            password: "p".into(),
            api_base_url: "not a url".into(),
            api_version: "100".into(),
        };
        let payload = GatewayPayload {
            api_operation: serde_json::json!("INITIATE_CHECKOUT"),
            checkout_mode: Value::Null,
            interaction: serde_json::json!({}),
            order: serde_json::json!({}),
        };
        let err = create_session(
            &reqwest::Client::new(),
            &credentials,
            &payload,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RelayError::Request(_)), "got {:?}", err);
    }
}
