//! Account-linking orchestration.
//!
//! Composes the provider client, the stores, and the session state
//! machine into the operations the HTTP layer exposes: onboarding start
//! and complete, account refresh, and transaction sync. All provider
//! failures are translated into the [`CoreError`] taxonomy here; nothing
//! above this crate sees a raw [`ProviderError`].
//!
//! [`CoreError`]: tally_core::error::CoreError
//! [`ProviderError`]: tally_provider::ProviderError

pub mod merchants;
pub mod onboarding;
pub mod reconcile;
pub mod sessions;
pub mod sync;

use tally_core::error::CoreError;
use tally_provider::{ProviderError, ProviderErrorKind};
use tally_store::Stores;

pub use onboarding::Onboarding;
pub use reconcile::Reconciler;
pub use sessions::SessionManager;
pub use sync::SyncEngine;

/// All orchestration services over one set of stores.
#[derive(Clone)]
pub struct LinkServices {
    pub onboarding: Onboarding,
    pub reconciler: Reconciler,
    pub sync: SyncEngine,
}

impl LinkServices {
    pub fn new(stores: Stores) -> Self {
        Self {
            onboarding: Onboarding::new(stores.clone()),
            reconciler: Reconciler::new(stores.clone()),
            sync: SyncEngine::new(stores),
        }
    }
}

/// Translate a provider failure into the domain taxonomy.
///
/// Transient exhaustion becomes `ProviderUnavailable`; a definitive
/// provider refusal becomes `ProviderRejected` with its status. The raw
/// payload was already logged at the client layer.
pub(crate) fn provider_to_core(err: ProviderError) -> CoreError {
    match err.kind() {
        ProviderErrorKind::Unavailable => CoreError::ProviderUnavailable(err.message),
        ProviderErrorKind::Rejected => CoreError::ProviderRejected {
            status: err.status,
            message: err.message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn transient_maps_to_unavailable() {
        let err = provider_to_core(ProviderError::transport("timed out"));
        assert_matches!(err, CoreError::ProviderUnavailable(_));
    }

    #[test]
    fn refusal_maps_to_rejected_with_status() {
        let err = provider_to_core(ProviderError::http(401, "bad credentials", None));
        assert_matches!(err, CoreError::ProviderRejected { status: 401, .. });
    }
}
