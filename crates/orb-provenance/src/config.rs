//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Collection name used in token metadata
    pub collection_name: String,

    /// IPFS hash of the hosted viewer, used in `external_url`
    pub ipfs_hash: String,

    /// Re-check invariants of the ids each commit touched
    pub strict_invariants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection_name: "Orb".to_string(),
            ipfs_hash: "Qm".to_string(),
            strict_invariants: true,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ORB_COLLECTION_NAME`: Collection name (default: Orb)
    /// - `ORB_IPFS_HASH`: Viewer hash (default: Qm)
    /// - `ORB_STRICT_INVARIANTS`: Post-commit checks (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            collection_name: env::var("ORB_COLLECTION_NAME").unwrap_or(defaults.collection_name),
            ipfs_hash: env::var("ORB_IPFS_HASH").unwrap_or(defaults.ipfs_hash),
            strict_invariants: env::var("ORB_STRICT_INVARIANTS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.strict_invariants),
        }
    }
}
