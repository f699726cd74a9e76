//! Merchant catalog lookup.

use tally_core::error::CoreError;
use tally_core::merchant::Merchant;
use tally_provider::{sim, ProviderClient, ProviderConfig};

use crate::provider_to_core;

/// List merchants supporting the given product variant, falling back to
/// the configured session type when none is requested.
pub async fn list(
    config: &ProviderConfig,
    merchant_type: Option<&str>,
) -> Result<Vec<Merchant>, CoreError> {
    let merchant_type = merchant_type.unwrap_or(&config.session_type);

    if config.resolve_mode().is_live() {
        let client = ProviderClient::new(config).map_err(provider_to_core)?;
        client
            .list_merchants(merchant_type)
            .await
            .map_err(provider_to_core)
    } else {
        Ok(sim::list_merchants(merchant_type))
    }
}
