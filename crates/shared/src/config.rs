//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Auth configuration.
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Which session issuer implementation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Local credential store: Argon2id hashes plus self-issued JWTs.
    Local,
    /// Delegated to an external GoTrue-compatible provider.
    External,
}

/// Auth configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Active session issuer.
    #[serde(default = "default_provider")]
    pub provider: AuthProvider,
    /// Secret key for signing (local) or verifying (external) tokens.
    pub jwt_secret: String,
    /// Token validity in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
    /// External provider settings; required when `provider = "external"`.
    pub external: Option<ExternalAuthConfig>,
}

fn default_provider() -> AuthProvider {
    AuthProvider::Local
}

fn default_token_expiry() -> u64 {
    3600 // 1 hour
}

/// External auth provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalAuthConfig {
    /// Base URL of the provider's auth endpoint.
    pub base_url: String,
    /// API key sent with signup/login calls.
    pub api_key: String,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FUTURA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
