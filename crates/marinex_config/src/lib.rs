// --- File: crates/marinex_config/src/lib.rs ---

pub mod env_vars;
pub mod models;

pub use config::ConfigError;
pub use models::{AppConfig, FcmConfig, QueueConfig, ServerConfig, SupabaseConfig};

use config::{Config, Environment, File};

/// Loads the application configuration.
///
/// Sources are merged in order of increasing precedence:
/// 1. built-in defaults (server binding)
/// 2. `config/default.{toml,yaml,json}` if present
/// 3. `MARINEX__` prefixed environment variables (`MARINEX__SERVER__PORT`)
/// 4. legacy direct environment variables (`SUPABASE_URL`,
///    `SUPABASE_SERVICE_ROLE_KEY`, `FCM_SERVICE_ACCOUNT`, `FCM_PROJECT_ID`,
///    `QUEUE_TRANSITIONS_SECRET`), matching the names the deployed functions
///    have always used
pub fn load_config() -> Result<AppConfig, ConfigError> {
    dotenv::dotenv().ok();

    let config: AppConfig = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("MARINEX").separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(env_vars::apply_legacy_env_overrides(config))
}
