pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod payload;
pub mod resolve;
pub mod routes;
pub mod state;

pub use config::RelayConfig;
pub use error::RelayError;
pub use payload::{GatewayPayload, Mode, SessionRequest};
pub use state::AppState;
