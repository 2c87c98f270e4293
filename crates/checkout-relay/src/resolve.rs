//! Layered value resolution.
//!
//! Every value the relay needs is looked up in a fixed order: the request
//! body, then the process configuration, then a hard-coded literal. Body
//! values only count when they are truthy (see [`is_truthy`]).

use serde_json::Value;

use crate::config::{RelayConfig, DEFAULT_API_BASE_URL, DEFAULT_API_VERSION};
use crate::error::RelayError;

pub const DEFAULT_MERCHANT_NAME: &str = "Test Merchant";
pub const DEFAULT_MERCHANT_URL: &str = "https://example.com";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_AMOUNT: &str = "99.00";
pub const DEFAULT_ORDER_DESCRIPTION: &str = "Test Order";
pub const DEFAULT_RETURN_URL: &str = "http://localhost:3000/payment-complete";

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy, everything else
/// (including empty objects and arrays) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether `body[key]` is present and truthy.
pub fn has_truthy(body: &Value, key: &str) -> bool {
    body.get(key).map(is_truthy).unwrap_or(false)
}

/// Read `body[key]` as a string if it is a truthy string or number.
pub fn body_str(body: &Value, key: &str) -> Option<String> {
    let value = body.get(key).filter(|v| is_truthy(v))?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Body → configuration → literal.
pub fn layered(body: &Value, key: &str, configured: Option<&str>, fallback: &str) -> String {
    body_str(body, key)
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| fallback.to_string())
}

/// Credentials and endpoint coordinates for one gateway call.
#[derive(Clone)]
pub struct Credentials {
    pub merchant_id: String,
    pub username: String,
    pub password: String,
    pub api_base_url: String,
    pub api_version: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("merchant_id", &self.merchant_id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

fn presence(value: &str) -> &'static str {
    if value.is_empty() {
        "missing"
    } else {
        "present"
    }
}

impl Credentials {
    /// Resolve credentials from the request body with configuration fallback.
    pub fn resolve(body: &Value, config: &RelayConfig) -> Self {
        Self {
            merchant_id: layered(body, "merchantId", config.merchant_id.as_deref(), ""),
            username: layered(body, "username", config.username.as_deref(), ""),
            password: layered(body, "password", config.password.as_deref(), ""),
            api_base_url: layered(
                body,
                "apiBaseUrl",
                Some(config.api_base_url.as_str()),
                DEFAULT_API_BASE_URL,
            ),
            api_version: layered(
                body,
                "apiVersion",
                Some(config.api_version.as_str()),
                DEFAULT_API_VERSION,
            ),
        }
    }

    /// `{merchantId, username, password}` each marked `present` or `missing`.
    pub fn presence_details(&self) -> Value {
        serde_json::json!({
            "merchantId": presence(&self.merchant_id),
            "username": presence(&self.username),
            "password": presence(&self.password),
        })
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("merchantId", &self.merchant_id),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect()
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RelayError::Validation {
                missing,
                details: self.presence_details(),
            })
        }
    }

    /// `{apiBaseUrl}/api/rest/version/{apiVersion}/merchant/{merchantId}/session`
    pub fn session_url(&self) -> String {
        format!(
            "{}/api/rest/version/{}/merchant/{}/session",
            self.api_base_url.trim_end_matches('/'),
            self.api_version,
            self.merchant_id
        )
    }
}

/// Defaults for simple-mode order fields, resolved for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDefaults {
    pub merchant_name: String,
    pub merchant_url: String,
    pub currency: String,
    pub amount: String,
    pub description: String,
    pub return_url: String,
}

impl OrderDefaults {
    pub fn resolve(body: &Value, config: &RelayConfig) -> Self {
        Self {
            merchant_name: layered(
                body,
                "merchantName",
                config.merchant_name.as_deref(),
                DEFAULT_MERCHANT_NAME,
            ),
            merchant_url: layered(
                body,
                "merchantUrl",
                config.merchant_url.as_deref(),
                DEFAULT_MERCHANT_URL,
            ),
            currency: layered(
                body,
                "currency",
                config.currency.as_deref(),
                DEFAULT_CURRENCY,
            ),
            amount: layered(
                body,
                "amount",
                config.default_amount.as_deref(),
                DEFAULT_AMOUNT,
            ),
            description: layered(
                body,
                "description",
                config.order_description.as_deref(),
                DEFAULT_ORDER_DESCRIPTION,
            ),
            return_url: layered(
                body,
                "returnUrl",
                config.return_url.as_deref(),
                DEFAULT_RETURN_URL,
            ),
        }
    }
}
