//! Report DTOs for the loader
//!
//! Defines the JSON document written to stdout after a load.

use serde::Serialize;

/// Outcome of staging, committing and (if needed) rolling back a load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitReport {
    /// Namespace the load was written to
    pub namespace: String,
    /// Keys accepted for staging
    pub staged: Vec<String>,
    /// Keys refused at staging time
    pub rejected: Vec<String>,
    /// Whether every staged key was written
    pub committed: bool,
    /// Keys that could not be written
    pub failed: Vec<String>,
    /// Keys removed again after a partial commit
    pub rolled_back: Vec<String>,
}

impl CommitReport {
    /// Creates an empty report for `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}
