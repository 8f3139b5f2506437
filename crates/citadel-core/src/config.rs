use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a session token, in seconds.
    pub token_ttl_seconds: i64,
    /// Maximum number of role assignment hops followed when resolving
    /// implicit permissions. Directly assigned roles are one hop away.
    pub max_role_depth: usize,
    /// Optional path to a policy seed file (`p, <subject>, <code>` and
    /// `g, <subject>, <role>` lines).
    pub policy_file: Option<String>,
}

impl AuthConfig {
    /// Longest accepted token lifetime: one year.
    pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

    /// ## Errors
    /// Returns `InvalidConfiguration` if `token_ttl_seconds` is outside
    /// `1..=MAX_TOKEN_TTL_SECONDS`.
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=Self::MAX_TOKEN_TTL_SECONDS).contains(&self.token_ttl_seconds) {
            return Err(CoreError::InvalidConfiguration(format!(
                "auth.token_ttl_seconds must be between 1 and {}, got {}",
                Self::MAX_TOKEN_TTL_SECONDS,
                self.token_ttl_seconds
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub admin_username: String,
    pub admin_password: String,
    /// Seed the default permission menu tree and sample roles.
    pub demo_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Single allowed CORS origin. When absent every origin is allowed.
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the socket address to bind, in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, `CITADEL_`-prefixed environment
    /// variables and an optional `config.toml` into a `Settings`.
    ///
    /// Nested keys use a double underscore, e.g. `CITADEL_AUTH__TOKEN_TTL_SECONDS`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it
    /// fails, or if a value is out of range.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9501)?
            .set_default("auth.token_ttl_seconds", 7200)?
            .set_default("auth.max_role_depth", 10)?
            .set_default("seed.admin_username", "admin")?
            .set_default("seed.admin_password", "123456")?
            .set_default("seed.demo_data", true)?
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::with_prefix("CITADEL")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.auth.validate()?;
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
