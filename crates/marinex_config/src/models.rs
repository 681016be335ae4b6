// --- File: crates/marinex_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Supabase Store Config ---
// Holds the privileged store connection. The service role key is a secret
// and is normally supplied via SUPABASE_SERVICE_ROLE_KEY.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupabaseConfig {
    pub url: String, // e.g. https://<project>.supabase.co
    pub service_role_key: String,
}

// --- Firebase Cloud Messaging Config ---
// The service account is supplied either as raw JSON or base64-encoded JSON
// (FCM_SERVICE_ACCOUNT). The project id may be set explicitly; otherwise the
// one embedded in the service account is used.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FcmConfig {
    pub service_account: Option<String>,
    pub project_id: Option<String>,
}

// --- Launch Queue Processor Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueueConfig {
    /// Shared secret protecting the transition processor endpoint. When set,
    /// callers must present it in `x-queue-secret` or `x-cron-secret`.
    pub transitions_secret: Option<String>,
    #[serde(default = "default_batch")]
    pub default_batch: u32,
    #[serde(default = "max_batch")]
    pub max_batch: u32,
}

fn default_batch() -> u32 {
    50
}

fn max_batch() -> u32 {
    200
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            transitions_secret: None,
            default_batch: default_batch(),
            max_batch: max_batch(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory (defaulted by the loader)
    pub server: ServerConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub supabase: Option<SupabaseConfig>,
    #[serde(default)]
    pub fcm: Option<FcmConfig>,
    #[serde(default)]
    pub queue: Option<QueueConfig>,
}

impl AppConfig {
    /// Effective queue processor settings, falling back to defaults when the
    /// `[queue]` section is absent.
    pub fn queue_settings(&self) -> QueueConfig {
        self.queue.clone().unwrap_or_default()
    }
}
