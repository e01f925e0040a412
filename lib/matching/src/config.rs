//! Engine configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use crate::fuzzy::{FuzzyAnchor, Threshold};
use serde::{Deserialize, Serialize};
use skillmatch_core::{Error, Result, RosterColumns};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Candidate labels fetched per query (k). `None` uses the count the
    /// model was trained with.
    pub neighbors: Option<usize>,
    /// Default acceptance threshold when a request does not carry one.
    pub threshold: Threshold,
    /// Roster header names.
    pub columns: RosterColumns,
    /// Text scored against each record's field.
    pub anchor: FuzzyAnchor,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            neighbors: None,
            threshold: Threshold::DEFAULT,
            columns: RosterColumns::default(),
            anchor: FuzzyAnchor::Query,
        }
    }
}

impl MatchConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "Loaded match config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.neighbors == Some(0) {
            return Err(Error::InvalidConfig("neighbors must be at least 1".to_string()));
        }
        self.columns.validate()
    }
}
