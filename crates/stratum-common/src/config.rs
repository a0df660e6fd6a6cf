//! Runtime configuration model for a Stratum invocation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Effective settings of one invocation, assembled from CLI flags and
/// `STRATUM_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratumConfig {
    /// Path to the manifest file.
    pub manifest: PathBuf,
    /// Render and resolve everything but never mutate remote state.
    pub dry_run: bool,
    /// Keep deploying after a configuration failed.
    pub continue_on_error: bool,
    /// Fail references to properties of skipped configurations instead of
    /// resolving them to `null`.
    pub strict_skipped_references: bool,
    /// Timeout for a single remote request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for StratumConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(crate::constants::DEFAULT_MANIFEST),
            dry_run: false,
            continue_on_error: false,
            strict_skipped_references: false,
            request_timeout_secs: crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
