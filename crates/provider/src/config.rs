//! Provider configuration and the live/simulated mode decision.

use tally_core::mode::ProviderMode;

/// Configuration for the aggregation provider, loaded from environment
/// variables. Absence of credentials is not an error -- it is the signal
/// that selects simulation mode.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider REST API.
    pub api_url: String,
    /// API client identifier. Empty when unconfigured.
    pub client_id: String,
    /// API client secret. Empty when unconfigured.
    pub client_secret: String,
    /// Feature toggle gating live mode even when credentials are set.
    pub feature_enabled: bool,
    /// Product variant requested when creating sessions
    /// (`transaction_link` or `card_switcher`).
    pub session_type: String,
}

impl ProviderConfig {
    /// Load provider configuration from environment variables.
    ///
    /// | Env Var                 | Default                          |
    /// |-------------------------|----------------------------------|
    /// | `PROVIDER_API_URL`      | `https://production.linkapi.com` |
    /// | `PROVIDER_CLIENT_ID`    | (empty)                          |
    /// | `PROVIDER_CLIENT_SECRET`| (empty)                          |
    /// | `FEATURE_PROVIDER`      | `false`                          |
    /// | `PROVIDER_SESSION_TYPE` | `transaction_link`               |
    ///
    /// Called per request rather than once at startup so configuration
    /// changes take effect without a restart.
    pub fn from_env() -> Self {
        let api_url = std::env::var("PROVIDER_API_URL")
            .unwrap_or_else(|_| "https://production.linkapi.com".into());
        let client_id = std::env::var("PROVIDER_CLIENT_ID").unwrap_or_default();
        let client_secret = std::env::var("PROVIDER_CLIENT_SECRET").unwrap_or_default();
        let feature_enabled = std::env::var("FEATURE_PROVIDER")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
            .unwrap_or(false);
        let session_type = std::env::var("PROVIDER_SESSION_TYPE")
            .unwrap_or_else(|_| "transaction_link".into());

        Self {
            api_url,
            client_id,
            client_secret,
            feature_enabled,
            session_type,
        }
    }

    /// Whether both halves of the API credential pair are configured.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Resolve the provider mode for the current configuration.
    ///
    /// Pure function of credential presence and the feature toggle; no
    /// caching, no side effects. Every component that could call the
    /// provider consults this first and branches.
    pub fn resolve_mode(&self) -> ProviderMode {
        if self.feature_enabled && self.has_credentials() {
            ProviderMode::Live
        } else {
            ProviderMode::Simulated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(client_id: &str, client_secret: &str, feature_enabled: bool) -> ProviderConfig {
        ProviderConfig {
            api_url: "https://provider.test".into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            feature_enabled,
            session_type: "transaction_link".into(),
        }
    }

    #[test]
    fn live_requires_credentials_and_toggle() {
        assert_eq!(
            config("id", "secret", true).resolve_mode(),
            ProviderMode::Live
        );
    }

    #[test]
    fn missing_either_credential_means_simulated() {
        assert_eq!(config("", "secret", true).resolve_mode(), ProviderMode::Simulated);
        assert_eq!(config("id", "", true).resolve_mode(), ProviderMode::Simulated);
    }

    #[test]
    fn disabled_toggle_means_simulated_even_with_credentials() {
        assert_eq!(
            config("id", "secret", false).resolve_mode(),
            ProviderMode::Simulated
        );
    }

    #[test]
    fn mode_follows_config_changes_between_calls() {
        let mut cfg = config("id", "secret", false);
        assert_eq!(cfg.resolve_mode(), ProviderMode::Simulated);
        cfg.feature_enabled = true;
        assert_eq!(cfg.resolve_mode(), ProviderMode::Live);
    }
}
