//! CORS configuration for the relay.

use actix_cors::Cors;
use actix_web::http::header;

/// Build the CORS middleware from the configured allow-list.
///
/// Requests without an `Origin` header pass through untouched; requests from
/// an origin outside the list are rejected by the middleware before they
/// reach a handler.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    let allowed = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            let origin_str = origin.to_str().unwrap_or("");
            allowed.iter().any(|a| a == origin_str)
        })
        .block_on_origin_mismatch(true)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .supports_credentials()
        .max_age(3600)
}
