use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_relay::{config::RelayConfig, cors::build_cors, routes, state::AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();

    tracing::info!("Starting checkout-relay on port {}", port);
    tracing::info!("Gateway: {} (API v{})", config.api_base_url, config.api_version);
    tracing::info!("Allowed origins: {:?}", allowed_origins);
    tracing::info!(
        "Default credentials: {}",
        if config.merchant_id.is_some() && config.username.is_some() && config.password.is_some()
        {
            "configured"
        } else {
            "incomplete (per-request credentials required)"
        }
    );

    let state = AppState::new(config).map_err(std::io::Error::other)?;
    let state_data = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(build_cors(&allowed_origins))
            .wrap(Logger::default())
            .configure(routes::configure)
            .default_service(web::to(routes::not_found))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

