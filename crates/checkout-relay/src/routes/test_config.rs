use actix_web::{web, HttpResponse};
use serde_json::Value;

use crate::resolve::Credentials;
use crate::routes::read_json_body;
use crate::state::AppState;

/// POST /test-config - Report which credentials would be used, without
/// calling the gateway.
pub async fn test_config(payload: web::Payload, state: web::Data<AppState>) -> HttpResponse {
    // Unreadable or unparseable bodies are echoed as if empty.
    let body = read_json_body(payload)
        .await
        .unwrap_or_else(|_| Value::Object(Default::default()));
    let credentials = Credentials::resolve(&body, &state.config);

    tracing::info!(
        merchant_id = %credentials.merchant_id,
        missing = ?credentials.missing_fields(),
        "config echo requested"
    );

    let mut response = credentials.presence_details();
    response["apiBaseUrl"] = Value::String(credentials.api_base_url.clone());
    response["apiVersion"] = Value::String(credentials.api_version.clone());
    response["url"] = Value::String(credentials.session_url());

    HttpResponse::Ok().json(response)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/test-config", web::post().to(test_config));
}
