use serde::Deserialize;

/// chatvault runtime configuration, loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level fallback when RUST_LOG is unset
    pub log_level: String,
    /// Directory for the rolling NDJSON log file
    pub log_dir: String,

    // LINE Messaging API
    pub line_channel_secret: Option<String>,
    pub line_access_token: Option<String>,
    /// Accept unsigned/invalid-signature deliveries (local testing only).
    pub allow_unsigned: bool,

    // Storage backend: "drive" or "memory"
    pub storage_backend: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_refresh_token: Option<String>,
    pub google_drive_folder_id: Option<String>,

    // Voice transcription (disabled when unset)
    pub openai_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            line_channel_secret: None,
            line_access_token: None,
            allow_unsigned: false,
            storage_backend: "drive".to_string(),
            google_client_id: None,
            google_client_secret: None,
            google_refresh_token: None,
            google_drive_folder_id: None,
            openai_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("CHATVAULT_BIND").unwrap_or(defaults.bind_address),
            port: std::env::var("CHATVAULT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: std::env::var("CHATVAULT_LOG_DIR").unwrap_or(defaults.log_dir),
            line_channel_secret: std::env::var("LINE_CHANNEL_SECRET").ok(),
            line_access_token: std::env::var("LINE_ACCESS_TOKEN").ok(),
            allow_unsigned: std::env::var("CHATVAULT_ALLOW_UNSIGNED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            storage_backend: std::env::var("CHATVAULT_STORAGE").unwrap_or(defaults.storage_backend),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            google_refresh_token: std::env::var("GOOGLE_REFRESH_TOKEN").ok(),
            google_drive_folder_id: std::env::var("GOOGLE_DRIVE_FOLDER_ID").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
        }
    }
}
