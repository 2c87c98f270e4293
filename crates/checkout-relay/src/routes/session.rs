use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Value;

use crate::error::RelayError;
use crate::gateway;
use crate::metrics::{record_session, GATEWAY_LATENCY};
use crate::payload::{Mode, SessionRequest};
use crate::resolve::Credentials;
use crate::routes::read_json_body;
use crate::state::AppState;

/// Successful relay response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResult {
    pub session_id: String,
    /// Generated or caller-supplied id; advanced payloads echo `order.id` as-is
    pub order_id: Value,
    pub amount: String,
    pub status: &'static str,
    pub mode: Mode,
}

async fn do_create_session(body: &Value, state: &AppState) -> Result<RelayResult, RelayError> {
    let credentials = Credentials::resolve(body, &state.config);
    if let Err(e) = credentials.validate() {
        tracing::warn!(error = %e, "rejecting session request");
        return Err(e);
    }

    let mode = Mode::reported(body);
    let request = SessionRequest::from_body(body, &state.config);
    let order_id = request.order_id();

    tracing::info!(
        merchant_id = %credentials.merchant_id,
        order_id = %order_id,
        mode = mode.as_str(),
        payload_mode = request.mode().as_str(),
        "creating checkout session"
    );

    let payload = request.into_payload();

    let timer = GATEWAY_LATENCY.start_timer();
    let result = gateway::create_session(
        &state.http_client,
        &credentials,
        &payload,
        state.config.gateway_timeout,
    )
    .await;
    timer.observe_duration();
    let session = result?;

    tracing::info!(
        session_id = %session.session_id,
        order_id = %order_id,
        "checkout session created"
    );

    // The gateway does not echo the amount, so report what was sent.
    Ok(RelayResult {
        session_id: session.session_id,
        order_id,
        amount: payload.amount(),
        status: "success",
        mode,
    })
}

/// POST / - Create a hosted checkout session
pub async fn create_session(
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RelayError> {
    let body = read_json_body(payload).await?;
    let mode = Mode::reported(&body);

    match do_create_session(&body, &state).await {
        Ok(result) => {
            record_session(mode.as_str(), "success");
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => {
            record_session(mode.as_str(), e.kind());
            Err(e)
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::post().to(create_session));
}
