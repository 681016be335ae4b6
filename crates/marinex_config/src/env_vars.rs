//! Legacy environment variable handling.
//!
//! The hosted edge functions this service replaces were configured through a
//! handful of flat environment variables. Those names are still honored here
//! so existing deployments keep working without a config file; they take
//! precedence over file-sourced values, like any other env override.

use std::env;

use crate::models::{AppConfig, FcmConfig, QueueConfig, SupabaseConfig};

/// Environment variable holding the store base URL.
pub const SUPABASE_URL: &str = "SUPABASE_URL";
/// Environment variable holding the privileged store key.
pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
/// Environment variable holding the push service account (raw or base64 JSON).
pub const FCM_SERVICE_ACCOUNT: &str = "FCM_SERVICE_ACCOUNT";
/// Environment variable overriding the push project id.
pub const FCM_PROJECT_ID: &str = "FCM_PROJECT_ID";
/// Environment variable holding the processor's shared secret.
pub const QUEUE_TRANSITIONS_SECRET: &str = "QUEUE_TRANSITIONS_SECRET";

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Applies the legacy flat environment variables on top of an already loaded
/// configuration. Section-level values win over file values but a partially
/// configured section from the file is completed rather than replaced.
pub fn apply_legacy_env_overrides(mut config: AppConfig) -> AppConfig {
    let url = non_empty(SUPABASE_URL);
    let key = non_empty(SUPABASE_SERVICE_ROLE_KEY);
    match (&mut config.supabase, url, key) {
        (Some(supabase), url, key) => {
            if let Some(url) = url {
                supabase.url = url;
            }
            if let Some(key) = key {
                supabase.service_role_key = key;
            }
        }
        (slot @ None, Some(url), Some(key)) => {
            *slot = Some(SupabaseConfig {
                url,
                service_role_key: key,
            });
        }
        _ => {}
    }

    if non_empty(FCM_SERVICE_ACCOUNT).is_some() || non_empty(FCM_PROJECT_ID).is_some() {
        let fcm = config.fcm.get_or_insert_with(FcmConfig::default);
        if let Some(account) = non_empty(FCM_SERVICE_ACCOUNT) {
            fcm.service_account = Some(account);
        }
        if let Some(project_id) = non_empty(FCM_PROJECT_ID) {
            fcm.project_id = Some(project_id);
        }
    }

    if let Some(secret) = non_empty(QUEUE_TRANSITIONS_SECRET) {
        let queue = config.queue.get_or_insert_with(QueueConfig::default);
        queue.transitions_secret = Some(secret);
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServerConfig;

    fn base_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            supabase: None,
            fcm: None,
            queue: None,
        }
    }

    #[test]
    fn legacy_store_vars_build_missing_section() {
        // Env mutation is process wide, so set and clear within one test.
        std::env::set_var(SUPABASE_URL, "https://example.supabase.co");
        std::env::set_var(SUPABASE_SERVICE_ROLE_KEY, "service-role-key");

        let config = apply_legacy_env_overrides(base_config());
        let supabase = config.supabase.expect("section should be built from env");
        assert_eq!(supabase.url, "https://example.supabase.co");
        assert_eq!(supabase.service_role_key, "service-role-key");

        std::env::remove_var(SUPABASE_URL);
        std::env::remove_var(SUPABASE_SERVICE_ROLE_KEY);
    }

    #[test]
    fn missing_env_leaves_config_untouched() {
        std::env::remove_var(FCM_SERVICE_ACCOUNT);
        std::env::remove_var(FCM_PROJECT_ID);
        std::env::remove_var(QUEUE_TRANSITIONS_SECRET);

        let config = apply_legacy_env_overrides(base_config());
        assert!(config.fcm.is_none());
        assert!(config.queue.is_none());
    }

    #[test]
    fn queue_defaults_are_clamp_bounds() {
        let queue = QueueConfig::default();
        assert_eq!(queue.default_batch, 50);
        assert_eq!(queue.max_batch, 200);
        assert!(queue.transitions_secret.is_none());
    }
}
