//! Engine configuration.
//!
//! Embedders configure the engine once at startup, either in code with the
//! builder methods or from a TOML document:
//!
//! ```
//! use variant_engine::{EngineConfig, UnknownConditionPolicy};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     undo_depth = 20
//!     seed = 99
//!     unknown_conditions = "deny"
//! "#).unwrap();
//!
//! assert_eq!(config.undo_depth, 20);
//! assert_eq!(config.unknown_conditions, UnknownConditionPolicy::Deny);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::DEFAULT_UNDO_DEPTH;

/// What the registry answers for a condition id nobody registered.
///
/// `Allow` is the compatible default: content referencing a renamed or
/// not-yet-registered condition keeps its consequences. `Deny` turns such
/// typos into never-firing steps instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownConditionPolicy {
    #[default]
    Allow,
    Deny,
}

impl UnknownConditionPolicy {
    /// The boolean an unresolved condition evaluates to.
    #[must_use]
    pub const fn verdict(self) -> bool {
        matches!(self, UnknownConditionPolicy::Allow)
    }
}

/// Runtime configuration for one [`RuleEngine`](crate::engine::RuleEngine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of whole-store snapshots kept for undo.
    pub undo_depth: usize,

    /// Seed for the RNG behind random built-ins.
    pub seed: u64,

    /// Verdict for unregistered condition ids.
    pub unknown_conditions: UnknownConditionPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            seed: 0,
            unknown_conditions: UnknownConditionPolicy::Allow,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Set the undo stack capacity.
    #[must_use]
    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.undo_depth = depth;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the unknown-condition policy.
    #[must_use]
    pub fn with_unknown_conditions(mut self, policy: UnknownConditionPolicy) -> Self {
        self.unknown_conditions = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.undo_depth, 50);
        assert_eq!(config.unknown_conditions, UnknownConditionPolicy::Allow);
        assert!(config.unknown_conditions.verdict());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("seed = 5").unwrap();
        assert_eq!(config.seed, 5);
        assert_eq!(config.undo_depth, 50);
    }

    #[test]
    fn test_invalid_toml() {
        let result = EngineConfig::from_toml_str("unknown_conditions = \"maybe\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_undo_depth(3)
            .with_seed(11)
            .with_unknown_conditions(UnknownConditionPolicy::Deny);

        assert_eq!(config.undo_depth, 3);
        assert_eq!(config.seed, 11);
        assert!(!config.unknown_conditions.verdict());
    }
}
