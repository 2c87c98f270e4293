pub mod health;
pub mod session;
pub mod test_config;

use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use serde_json::Value;

use crate::error::RelayError;

/// Largest request body the relay will buffer (1 MB).
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Buffer a request body, stopping as soon as it passes `MAX_BODY_SIZE`,
/// and parse it as JSON.
pub async fn read_json_body(mut payload: web::Payload) -> Result<Value, RelayError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|e| RelayError::Internal(format!("failed to read request body: {e}")))?;
        if body.len() + chunk.len() > MAX_BODY_SIZE {
            return Err(RelayError::Internal(format!("request body exceeds {MAX_BODY_SIZE} bytes")));
        }
        body.extend_from_slice(&chunk);
    }
    parse_body(&body)
}

/// Parse a request body as JSON. An empty body is an empty object.
pub fn parse_body(body: &[u8]) -> Result<Value, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body)
        .map_err(|e| RelayError::Internal(format!("invalid JSON body: {e}")))
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, RelayError> {
    Err(RelayError::NotFound {
        method: req.method().to_string(),
        path: req.path().to_string(),
    })
}

/// Register every relay route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .configure(test_config::configure)
        .configure(session::configure);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"").unwrap(), serde_json::json!({}));
        assert_eq!(parse_body(b" \n").unwrap(), serde_json::json!({}));
        assert_eq!(
            parse_body(br#"{"a":1}"#).unwrap(),
            serde_json::json!({"a": 1})
        );
        assert!(matches!(
            parse_body(b"{not json"),
            Err(RelayError::Internal(_))
        ));
    }
}
