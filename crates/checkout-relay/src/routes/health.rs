use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::require_bearer;
use crate::error::RelayError;
use crate::metrics::metrics_output;
use crate::state::AppState;

/// GET /health - Health check endpoint
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "port": state.config.port,
        "cors": "enabled",
        "allowedOrigins": state.config.allowed_origins,
    }))
}

/// GET /metrics - Prometheus text exposition, gated when `METRICS_TOKEN` is set
pub async fn metrics(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RelayError> {
    require_bearer(req.headers(), state.config.metrics_token.as_deref())?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics_output()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics));
}
