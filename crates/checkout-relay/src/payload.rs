//! Request-shape detection and gateway payload construction.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::RelayConfig;
use crate::resolve::{body_str, has_truthy, OrderDefaults, DEFAULT_AMOUNT};

pub const INITIATE_CHECKOUT: &str = "INITIATE_CHECKOUT";
pub const CHECKOUT_MODE_WEBSITE: &str = "WEBSITE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Simple,
    Advanced,
}

impl Mode {
    /// Advanced when `apiOperation`, `order` and `interaction` are all truthy.
    pub fn detect(body: &Value) -> Self {
        if has_truthy(body, "apiOperation")
            && has_truthy(body, "order")
            && has_truthy(body, "interaction")
        {
            Mode::Advanced
        } else {
            Mode::Simple
        }
    }

    /// The mode label echoed back to the caller. This only looks at
    /// `apiOperation`, so a body carrying `apiOperation` without a full
    /// advanced payload is built in simple mode but reported as advanced.
    pub fn reported(body: &Value) -> Self {
        if has_truthy(body, "apiOperation") {
            Mode::Advanced
        } else {
            Mode::Simple
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Advanced => "advanced",
        }
    }
}

/// The body POSTed to the gateway's session endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayload {
    pub api_operation: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub checkout_mode: Value,
    pub interaction: Value,
    pub order: Value,
}

impl GatewayPayload {
    /// `order.amount` as a string, or `"99.00"` when the order has none.
    pub fn amount(&self) -> String {
        match self.order.get("amount") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => DEFAULT_AMOUNT.to_string(),
        }
    }
}

/// Fields for a payload the relay assembles itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleOrder {
    pub order_id: String,
    pub fields: OrderDefaults,
}

impl SimpleOrder {
    pub fn to_payload(&self) -> GatewayPayload {
        GatewayPayload {
            api_operation: json!(INITIATE_CHECKOUT),
            checkout_mode: json!(CHECKOUT_MODE_WEBSITE),
            interaction: json!({
                "operation": "PURCHASE",
                "merchant": {
                    "name": self.fields.merchant_name,
                    "url": self.fields.merchant_url,
                },
                "returnUrl": self.fields.return_url,
                "displayControl": {
                    "billingAddress": "HIDE",
                },
            }),
            order: json!({
                "currency": self.fields.currency,
                "amount": self.fields.amount,
                "id": self.order_id,
                "description": self.fields.description,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionRequest {
    Simple(SimpleOrder),
    Advanced(GatewayPayload),
}

impl SessionRequest {
    pub fn from_body(body: &Value, config: &RelayConfig) -> Self {
        match Mode::detect(body) {
            Mode::Advanced => SessionRequest::Advanced(GatewayPayload {
                api_operation: field(body, "apiOperation"),
                checkout_mode: field(body, "checkoutMode"),
                interaction: field(body, "interaction"),
                order: field(body, "order"),
            }),
            Mode::Simple => SessionRequest::Simple(SimpleOrder {
                order_id: body_str(body, "orderId").unwrap_or_else(generate_order_id),
                fields: OrderDefaults::resolve(body, config),
            }),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            SessionRequest::Simple(_) => Mode::Simple,
            SessionRequest::Advanced(_) => Mode::Advanced,
        }
    }

    /// The caller-visible order identifier. Advanced payloads return
    /// `order.id` untouched (`null` when absent).
    pub fn order_id(&self) -> Value {
        match self {
            SessionRequest::Simple(order) => Value::String(order.order_id.clone()),
            SessionRequest::Advanced(payload) => {
                payload.order.get("id").cloned().unwrap_or(Value::Null)
            }
        }
    }

    pub fn into_payload(self) -> GatewayPayload {
        match self {
            SessionRequest::Simple(order) => order.to_payload(),
            SessionRequest::Advanced(payload) => payload,
        }
    }
}

fn field(body: &Value, key: &str) -> Value {
    body.get(key).cloned().unwrap_or(Value::Null)
}

/// 8 random bytes from the OS-seeded CSPRNG, hex encoded.
pub fn generate_order_id() -> String {
    let mut bytes = [0u8; 8];
    rand::fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn config() -> RelayConfig {
        RelayConfig::from_lookup(|key| match key {
            "MERCHANT_NAME" => Some("Env Shop".to_string()),
            "DEFAULT_AMOUNT" => Some("15.00".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn advanced_body() -> Value {
        json!({
            "merchantId": "M1",
            "apiOperation": "INITIATE_CHECKOUT",
            "checkoutMode": "EMBEDDED",
            "interaction": {"operation": "AUTHORIZE", "merchant": {"name": "Custom"}},
            "order": {"id": "ORD-1", "amount": "42.00", "currency": "EUR"},
            "ignored": true
        })
    }

    #[test]
    fn test_detect_requires_all_three_fields() {
        assert_eq!(Mode::detect(&advanced_body()), Mode::Advanced);
        assert_eq!(
            Mode::detect(&json!({"apiOperation": "X", "order": {}})),
            Mode::Simple
        );
        assert_eq!(
            Mode::detect(&json!({"apiOperation": "", "order": {}, "interaction": {}})),
            Mode::Simple
        );
        assert_eq!(Mode::detect(&json!({})), Mode::Simple);
    }

    #[test]
    fn test_reported_mode_only_checks_api_operation() {
        let body = json!({"apiOperation": "INITIATE_CHECKOUT"});
        assert_eq!(Mode::detect(&body), Mode::Simple);
        assert_eq!(Mode::reported(&body), Mode::Advanced);
        assert_eq!(Mode::reported(&json!({"amount": "1.00"})), Mode::Simple);
    }

    #[test]
    fn test_advanced_payload_is_passed_through_verbatim() {
        let body = advanced_body();
        let request = SessionRequest::from_body(&body, &config());
        assert_eq!(request.mode(), Mode::Advanced);
        assert_eq!(request.order_id(), json!("ORD-1"));

        let payload = serde_json::to_value(request.into_payload()).unwrap();
        assert_eq!(
            payload,
            json!({
                "apiOperation": body["apiOperation"],
                "checkoutMode": body["checkoutMode"],
                "interaction": body["interaction"],
                "order": body["order"],
            })
        );
    }

    #[test]
    fn test_advanced_order_without_id_yields_null() {
        let body = json!({"apiOperation": "X", "interaction": {}, "order": {"amount": 5}});
        let request = SessionRequest::from_body(&body, &config());
        assert_eq!(request.order_id(), Value::Null);
        assert_eq!(request.into_payload().amount(), "5");
    }

    #[test]
    fn test_simple_payload_shape() {
        let body = json!({"orderId": "ABC", "currency": "GBP"});
        let request = SessionRequest::from_body(&body, &config());
        assert_eq!(request.mode(), Mode::Simple);
        assert_eq!(request.order_id(), json!("ABC"));

        let payload = serde_json::to_value(request.into_payload()).unwrap();
        assert_eq!(payload["apiOperation"], "INITIATE_CHECKOUT");
        assert_eq!(payload["checkoutMode"], "WEBSITE");
        assert_eq!(payload["interaction"]["operation"], "PURCHASE");
        assert_eq!(payload["interaction"]["merchant"]["name"], "Env Shop");
        assert_eq!(
            payload["interaction"]["displayControl"]["billingAddress"],
            "HIDE"
        );
        assert_eq!(
            payload["order"],
            json!({
                "currency": "GBP",
                "amount": "15.00",
                "id": "ABC",
                "description": "Test Order",
            })
        );
    }

    #[test]
    fn test_generated_order_ids_are_hex_and_distinct() {
        let ids: HashSet<String> = (0..500).map(|_| generate_order_id()).collect();
        assert_eq!(ids.len(), 500);
        for id in &ids {
            assert_eq!(id.len(), 16);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_payload_amount_default() {
        let payload = GatewayPayload {
            api_operation: json!("X"),
            checkout_mode: Value::Null,
            interaction: json!({}),
            order: json!({"id": "1"}),
        };
        assert_eq!(payload.amount(), "99.00");
    }
}
