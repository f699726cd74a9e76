//! Live-vs-simulated provider mode.
//!
//! The mode is derived from configuration at each call site, never cached
//! at startup, so flipping credentials or the feature toggle takes effect
//! on the next request without a restart. Sessions record the mode they
//! were created under and keep it for their whole lifetime.

use serde::{Deserialize, Serialize};

/// Whether provider calls hit the real network API or the deterministic
/// local substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Credentials present and the feature toggle enabled; calls go out
    /// over the network.
    Live,
    /// Responses are synthesized locally with the same shapes as live.
    Simulated,
}

impl ProviderMode {
    pub fn is_live(self) -> bool {
        matches!(self, ProviderMode::Live)
    }
}

impl std::fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderMode::Live => write!(f, "live"),
            ProviderMode::Simulated => write!(f, "simulated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProviderMode::Live).unwrap(),
            "\"live\""
        );
        assert_eq!(
            serde_json::to_string(&ProviderMode::Simulated).unwrap(),
            "\"simulated\""
        );
    }
}
