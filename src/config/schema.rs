//! Configuration schema definitions.
//!
//! All types derive Serde traits so a config can also be captured or
//! replayed as a document; the canonical source is the environment
//! (see [`crate::config::env`]).

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the menu backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// MongoDB connection string. Empty means no database is configured and
    /// the service serves the fallback file only.
    pub mongodb_uri: String,

    /// Database name holding menu documents.
    pub db_name: String,

    /// Preferred collection name. The connection manager falls back to
    /// auto-discovery when this collection does not exist.
    pub collection: String,

    /// TLS behavior override for the database connection.
    pub tls: TlsMode,

    /// Accept invalid TLS certificates (debugging aid).
    pub tls_allow_invalid: bool,

    /// Driver server-selection timeout in milliseconds.
    pub server_selection_timeout_ms: u64,

    /// Maximum connection attempts before giving up.
    pub max_connect_attempts: u32,

    /// Base delay between connection attempts in milliseconds; the delay
    /// grows linearly with the attempt index.
    pub retry_base_delay_ms: u64,

    /// HTTP listen port.
    pub port: u16,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Allowed CORS origin. Empty means any origin.
    pub cors_origin: String,

    /// Public base URL override used when building image links.
    pub base_url: String,

    /// Image base URL override; wins over `base_url` for image links.
    pub image_base_url: String,

    /// Static JSON menu served when no database is configured.
    pub fallback_menu_file: PathBuf,

    /// Directory served under `/images`.
    pub images_dir: PathBuf,

    /// Prometheus exporter bind address. Empty disables the exporter.
    pub metrics_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongodb_uri: String::new(),
            db_name: "menu".to_string(),
            collection: "menudata".to_string(),
            tls: TlsMode::Auto,
            tls_allow_invalid: false,
            server_selection_timeout_ms: 5000,
            max_connect_attempts: 3,
            retry_base_delay_ms: 500,
            port: 3000,
            request_timeout_secs: 30,
            cors_origin: String::new(),
            base_url: String::new(),
            image_base_url: String::new(),
            fallback_menu_file: PathBuf::from("data/menu.json"),
            images_dir: PathBuf::from("images"),
            metrics_address: String::new(),
        }
    }
}

/// TLS behavior for the database connection.
///
/// `Auto` follows whatever the connection string implies; the other two
/// force the driver one way or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(TlsMode::Auto),
            "true" | "enabled" => Ok(TlsMode::Enabled),
            "false" | "disabled" => Ok(TlsMode::Disabled),
            other => Err(format!("unrecognized TLS mode \"{other}\"")),
        }
    }
}
