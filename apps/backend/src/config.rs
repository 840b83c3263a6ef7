//! Configuration module for the Moovi backend.
//!
//! Loads configuration from `config.toml` with environment variable overrides.

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::images::SizeTable;

/// Prefix of environment overrides, joined to the key with a single underscore.
const ENV_PREFIX: &str = "MOOVI";

/// Legacy variable name honoured when `tmdb.access_token` is not set.
const TMDB_TOKEN_FALLBACK_ENV: &str = "TMDB_API_ACCESS_TOKEN";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// TMDB API configuration
#[derive(Clone, Deserialize)]
pub struct TmdbConfig {
    /// v4 read access token, sent as a bearer token.
    pub access_token: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation to avoid exposing access_token
impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_tmdb_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TmdbConfig {
    /// The configured token, ignoring blank values.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Image CDN configuration and the size tables used when reshaping paths.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_image_base_url")]
    pub base_url: String,
    /// Sizes for paginated popular listings.
    #[serde(default = "SizeTable::listing")]
    pub listing: SizeTable,
    /// Sizes for cards: trending, search, detail headers, nested lists.
    #[serde(default = "SizeTable::card")]
    pub card: SizeTable,
    /// Sizes for `images.*` galleries on detail pages.
    #[serde(default = "SizeTable::gallery")]
    pub gallery: SizeTable,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_base_url(),
            listing: SizeTable::listing(),
            card: SizeTable::card(),
            gallery: SizeTable::gallery(),
        }
    }
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` in current directory (optional)
    /// 3. Environment variables with `MOOVI_` prefix
    ///
    /// Environment variables use double underscore for nesting:
    /// - `MOOVI_SERVER__PORT=9000` sets `server.port`
    /// - `MOOVI_TMDB__ACCESS_TOKEN=...` sets `tmdb.access_token`
    ///
    /// When no token is configured, `TMDB_API_ACCESS_TOKEN` is used if present.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from(config_path: &str) -> Result<Self, AppError> {
        Self::load_with(config_path, Self::environment())
    }

    /// `MOOVI_TMDB__ACCESS_TOKEN=...` -> `tmdb.access_token = ...`
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(config_path: &str, environment: Environment) -> Result<Self, AppError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("tmdb.base_url", default_tmdb_base_url())?
            .set_default("tmdb.timeout_secs", 30)?
            .set_default("images.base_url", default_image_base_url())?
            .add_source(File::with_name(config_path).required(false))
            .add_source(environment)
            .build()?;

        let mut config: Config = config.try_deserialize()?;

        if config.tmdb.token().is_none() {
            if let Ok(token) = std::env::var(TMDB_TOKEN_FALLBACK_ENV) {
                config.tmdb.access_token = Some(token);
            }
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.tmdb.token().is_none() {
            tracing::warn!("TMDB access token not configured - all proxy endpoints will fail");
        }

        if self.tmdb.timeout_secs == 0 {
            return Err(AppError::Internal(
                "tmdb.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        let ip: IpAddr = self.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid host '{}', using 0.0.0.0", self.server.host);
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::images::ImageSize;

    #[test]
    fn test_default_config() {
        let config = Config::load_from("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb.timeout_secs, 30);
        assert_eq!(config.images.base_url, "https://image.tmdb.org/t/p");
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        let addr = config.server_addr();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_invalid_host_falls_back() {
        let mut config = Config::default();
        config.server.host = "not-an-ip".to_string();
        assert!(config.server_addr().ip().is_unspecified());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let tmdb = TmdbConfig {
            access_token: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(tmdb.token().is_none());
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let tmdb = TmdbConfig {
            access_token: Some("super-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", tmdb);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_image_tables_from_toml() {
        let parsed: ImagesConfig = toml_images(
            r#"
            base_url = "https://cdn.example.com/t/p"
            [card]
            poster = "w342"
            "#,
        );
        assert_eq!(parsed.base_url, "https://cdn.example.com/t/p");
        assert_eq!(parsed.card.poster, ImageSize::W342);
        // Unset fields keep the built-in card sizes
        assert_eq!(parsed.card.backdrop, ImageSize::W780);
        assert_eq!(parsed.listing, SizeTable::listing());
    }

    fn env_of(vars: &[(&str, &str)]) -> Environment {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::environment().source(Some(vars))
    }

    #[test]
    fn test_env_overrides_use_single_underscore_prefix() {
        let config = Config::load_with(
            "nonexistent.toml",
            env_of(&[
                ("MOOVI_SERVER__PORT", "9123"),
                ("MOOVI_TMDB__ACCESS_TOKEN", "from-env"),
                ("MOOVI_TMDB__BASE_URL", "http://127.0.0.1:9999/3"),
                ("MOOVI_IMAGES__BASE_URL", "https://cdn.example.com/t/p"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 9123);
        assert_eq!(config.tmdb.token(), Some("from-env"));
        assert_eq!(config.tmdb.base_url, "http://127.0.0.1:9999/3");
        assert_eq!(config.images.base_url, "https://cdn.example.com/t/p");
    }

    #[test]
    fn test_env_double_underscore_prefix_is_ignored() {
        let config = Config::load_with(
            "nonexistent.toml",
            env_of(&[("MOOVI__SERVER__PORT", "9124")]),
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_zero_timeout_is_rejected() {
        let result = Config::load_with(
            "nonexistent.toml",
            env_of(&[("MOOVI_TMDB__TIMEOUT_SECS", "0")]),
        );

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    fn toml_images(source: &str) -> ImagesConfig {
        ConfigLoader::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
