//! Shared application state for the notification endpoints.

use std::sync::Arc;

use tracing::{error, info};

use marinex_config::AppConfig;
use marinex_fcm::{parse_service_account, resolve_project_id, CredentialStore, FcmClient, PushDispatcher};
use marinex_store::StoreClient;

use crate::error::NotifyError;

/// Everything needed to push: the credential cache and the dispatcher. The
/// credential store is the only shared mutable state in the process.
#[derive(Debug, Clone)]
pub struct PushContext {
    pub credentials: Arc<CredentialStore>,
    pub dispatcher: PushDispatcher,
}

/// State handed to every handler. Feature sections that are not configured
/// leave their slot empty; the affected endpoints answer 500 instead of the
/// process refusing to start.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    store: Option<StoreClient>,
    push: Option<PushContext>,
}

impl AppState {
    /// Wire up the store client and push context from the configuration.
    ///
    /// A malformed push credential is logged and leaves the push context
    /// unset rather than aborting startup; the store may still be reachable
    /// and the processor endpoints partially useful.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store = config.supabase.as_ref().map(StoreClient::new);
        if store.is_none() {
            info!("Supabase store not configured; notification endpoints disabled");
        }

        let push = config.fcm.as_ref().and_then(build_push_context);
        if push.is_none() {
            info!("FCM credentials not configured; push delivery disabled");
        }

        Self { config, store, push }
    }

    /// For tests: state with explicit parts.
    pub fn with_parts(
        config: Arc<AppConfig>,
        store: Option<StoreClient>,
        push: Option<PushContext>,
    ) -> Self {
        Self { config, store, push }
    }

    pub fn store(&self) -> Result<&StoreClient, NotifyError> {
        self.store.as_ref().ok_or_else(|| {
            NotifyError::Config("Supabase credentials are not configured.".to_string())
        })
    }

    pub fn push(&self) -> Result<&PushContext, NotifyError> {
        self.push.as_ref().ok_or_else(|| {
            NotifyError::Config(
                "FCM_SERVICE_ACCOUNT is not configured. Add the Firebase service account credentials."
                    .to_string(),
            )
        })
    }
}

fn build_push_context(fcm: &marinex_config::FcmConfig) -> Option<PushContext> {
    let raw = fcm.service_account.as_deref()?;
    let account = match parse_service_account(raw) {
        Ok(parsed) => parsed.into_account(),
        Err(err) => {
            error!(error = %err, "Failed to parse FCM service account credentials");
            return None;
        }
    };
    let project_id = match resolve_project_id(fcm.project_id.as_deref(), &account) {
        Ok(id) => id,
        Err(err) => {
            error!(error = %err, "Failed to resolve Firebase project id");
            return None;
        }
    };

    Some(PushContext {
        credentials: Arc::new(CredentialStore::new(account)),
        dispatcher: PushDispatcher::new(FcmClient::new(project_id)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use marinex_config::{FcmConfig, ServerConfig};

    fn config_with_fcm(fcm: Option<FcmConfig>) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            supabase: None,
            fcm,
            queue: None,
        })
    }

    #[test]
    fn missing_sections_leave_slots_empty() {
        let state = AppState::from_config(config_with_fcm(None));
        assert!(state.store().is_err());
        assert!(state.push().is_err());
    }

    #[test]
    fn malformed_credential_disables_push_without_panicking() {
        let state = AppState::from_config(config_with_fcm(Some(FcmConfig {
            service_account: Some("not json, not base64 !!".to_string()),
            project_id: Some("p".to_string()),
        })));
        assert!(state.push().is_err());
    }
}
