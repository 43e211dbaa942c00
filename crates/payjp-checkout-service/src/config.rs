//! Service configuration.

use std::path::Path;

use serde::Deserialize;

use payjp_checkout_client::PayjpClient;
use payjp_checkout_core::{ApiMode, CaptureMode};
use payjp_checkout_gateway::{ApiKeys, GatewaySettings};

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/payjp-checkout").
    pub data_dir: String,

    /// Service API key required on every `/v1` request.
    pub service_api_key: Option<String>,

    /// Base URL of the store front's order API.
    pub order_api_url: String,

    /// API key sent to the order API, if it wants one.
    pub order_api_key: Option<String>,

    /// Pay.jp API base URL.
    pub payjp_api_base: String,

    /// Gateway settings, including the Pay.jp keys.
    pub gateway: GatewaySettings,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Pay.jp secrets file structure.
#[derive(Debug, Deserialize)]
struct PayjpSecrets {
    #[serde(default)]
    test: ApiKeys,
    #[serde(default)]
    live: ApiKeys,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (test_keys, live_keys) = load_payjp_secrets();
        let defaults = GatewaySettings::default();

        let gateway = GatewaySettings {
            mode: match env("PAYJP_MODE").as_deref() {
                Some("live") => ApiMode::Live,
                _ => ApiMode::Test,
            },
            charge_type: match env("PAYJP_CHARGE_TYPE").as_deref() {
                Some("authorize") => CaptureMode::Authorize,
                _ => CaptureMode::Capture,
            },
            saved_cards: env_flag("PAYJP_SAVED_CARDS").unwrap_or(defaults.saved_cards),
            additional_fields: env_flag("PAYJP_ADDITIONAL_FIELDS")
                .unwrap_or(defaults.additional_fields),
            test_keys,
            live_keys,
            ..defaults
        };

        Self {
            listen_addr: env("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".into()),
            data_dir: env("DATA_DIR").unwrap_or_else(|| "/data/payjp-checkout".into()),
            service_api_key: env("SERVICE_API_KEY"),
            order_api_url: env("ORDER_API_URL").unwrap_or_else(|| "http://localhost:8081".into()),
            order_api_key: env("ORDER_API_KEY"),
            payjp_api_base: env("PAYJP_API_BASE")
                .unwrap_or_else(|| PayjpClient::BASE_URL.into()),
            gateway,
            cors_origins: env("CORS_ORIGINS")
                .unwrap_or_else(|| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env("MAX_BODY_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024), // 64KB
            request_timeout_seconds: env("REQUEST_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// `yes`/`true`/`1` and `no`/`false`/`0`, as the settings screen stores them.
fn env_flag(name: &str) -> Option<bool> {
    parse_flag(&env(name)?)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Load Pay.jp keys from file or environment.
fn load_payjp_secrets() -> (ApiKeys, ApiKeys) {
    let secret_paths = [
        ".secrets/payjp.json",
        "payjp-checkout/.secrets/payjp.json",
        "../.secrets/payjp.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<PayjpSecrets>(path) {
            tracing::info!(path = %path, "Loaded Pay.jp secrets from file");
            return (secrets.test, secrets.live);
        }
    }

    // Fall back to environment variables
    tracing::debug!("Pay.jp secrets file not found, using environment variables");
    let keys = |mode: &str| ApiKeys {
        secret_key: env(&format!("PAYJP_{mode}_SECRET_KEY")).unwrap_or_default(),
        publishable_key: env(&format!("PAYJP_{mode}_PUBLISHABLE_KEY")).unwrap_or_default(),
    };
    (keys("TEST"), keys("LIVE"))
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/payjp-checkout".into(),
            service_api_key: None,
            order_api_url: "http://localhost:8081".into(),
            order_api_key: None,
            payjp_api_base: PayjpClient::BASE_URL.into(),
            gateway: GatewaySettings::default(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
