use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_BASE_URL: &str = "https://test-gateway.mastercard.com";
pub const DEFAULT_API_VERSION: &str = "100";
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
];

#[derive(Clone)]
pub struct RelayConfig {
    /// Server port
    pub port: u16,
    /// Default merchant ID (MERCHANT_ID)
    pub merchant_id: Option<String>,
    /// Default API username (MASTERCARD_USERNAME)
    pub username: Option<String>,
    /// Default API password (MASTERCARD_PASSWORD)
    pub password: Option<String>,
    /// Gateway base URL
    pub api_base_url: String,
    /// Gateway REST API version
    pub api_version: String,
    pub merchant_name: Option<String>,
    pub merchant_url: Option<String>,
    pub currency: Option<String>,
    pub default_amount: Option<String>,
    pub order_description: Option<String>,
    pub return_url: Option<String>,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Timeout applied to the outbound session call
    pub gateway_timeout: Duration,
    /// Bearer token required for /metrics endpoint (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("port", &self.port)
            .field("merchant_id", &self.merchant_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("merchant_name", &self.merchant_name)
            .field("merchant_url", &self.merchant_url)
            .field("currency", &self.currency)
            .field("default_amount", &self.default_amount)
            .field("order_description", &self.order_description)
            .field("return_url", &self.return_url)
            .field("allowed_origins", &self.allowed_origins)
            .field("gateway_timeout", &self.gateway_timeout)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl RelayConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("PORT", raw))?,
            None => DEFAULT_PORT,
        };

        let api_base_url =
            var("MASTERCARD_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Url::parse(&api_base_url).map_err(|_| ConfigError::InvalidUrl(api_base_url.clone()))?;

        let api_version = var("API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let allowed_origins: Vec<String> = var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                DEFAULT_ALLOWED_ORIGINS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        if allowed_origins.iter().any(|o| o == "*") {
            return Err(ConfigError::WildcardOrigin);
        }

        let gateway_timeout = match var("GATEWAY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("GATEWAY_TIMEOUT_SECS", raw))?,
            ),
            None => Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
        };

        let metrics_token = var("METRICS_TOKEN");

        let config = Self {
            port,
            merchant_id: var("MERCHANT_ID"),
            username: var("MASTERCARD_USERNAME"),
            password: var("MASTERCARD_PASSWORD"),
            api_base_url,
            api_version,
            merchant_name: var("MERCHANT_NAME"),
            merchant_url: var("MERCHANT_URL"),
            currency: var("CURRENCY"),
            default_amount: var("DEFAULT_AMOUNT"),
            order_description: var("ORDER_DESCRIPTION"),
            return_url: var("RETURN_URL"),
            allowed_origins,
            gateway_timeout,
            metrics_token,
        };

        if config.merchant_id.is_none() || config.username.is_none() || config.password.is_none()
        {
            tracing::warn!(
                "gateway credentials are not fully configured; \
                 callers must supply merchantId/username/password per request"
            );
        }

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("wildcard CORS origin '*' is not allowed; list explicit origins in ALLOWED_ORIGINS")]
    WildcardOrigin,
}
