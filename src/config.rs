//! Run configuration, loaded from TOML.
//!
//! Every field has a default, so an empty document (or no file at all) is a valid configuration:
//!
//! ```
//! use constraint_puzzles::config::PuzzleConfig;
//! use constraint_puzzles::solver::Backend;
//!
//! let config = PuzzleConfig::from_toml_str(r#"
//!     backend = "exact"
//!
//!     [hailstones]
//!     test_min = 7
//!     test_max = 27
//!
//!     [claws.part_two]
//!     prize_offset = 0
//! "#).unwrap();
//!
//! assert_eq!(config.backend, Backend::Exact);
//! assert_eq!(config.hailstones.test_max, 27);
//! assert_eq!(config.claws.part_two.press_limit, None);
//! assert_eq!(config.wiring.expected_cut, Some(3));
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::puzzles::claws::ClawRules;
use crate::solver::Backend;

/// Configuration error
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a run over any puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Which [`ConstraintSolver`](crate::solver::ConstraintSolver) answers linear models.
    pub backend: Backend,
    /// Hailstone settings.
    pub hailstones: HailstoneConfig,
    /// Claw machine settings.
    pub claws: ClawConfig,
    /// Wiring settings.
    pub wiring: WiringConfig,
}

impl PuzzleConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails [`Self::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the solver backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hailstones.test_min > self.hailstones.test_max {
            return Err(ConfigError::Invalid(format!(
                "hailstone test area is empty: {} > {}",
                self.hailstones.test_min, self.hailstones.test_max
            )));
        }

        if self.wiring.expected_cut == Some(0) {
            return Err(ConfigError::Invalid("expected cut size must be positive".to_string()));
        }

        Ok(())
    }
}

/// The inclusive square `[test_min, test_max]²` in which hailstone paths must cross to count.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HailstoneConfig {
    /// Lower bound on both coordinates.
    pub test_min: i64,
    /// Upper bound on both coordinates.
    pub test_max: i64,
}

impl Default for HailstoneConfig {
    fn default() -> Self {
        Self {
            test_min: 200000000000000,
            test_max: 400000000000000,
        }
    }
}

/// Rules for each part of the claw machine puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClawConfig {
    /// Defaults to [`ClawRules::PART_ONE`].
    pub part_one: ClawRules,
    /// Defaults to [`ClawRules::PART_TWO`].
    pub part_two: ClawRules,
}

impl Default for ClawConfig {
    fn default() -> Self {
        Self {
            part_one: ClawRules::PART_ONE,
            part_two: ClawRules::PART_TWO,
        }
    }
}

/// Wiring diagram settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WiringConfig {
    /// Number of edges the minimum cut must have, if known.
    pub expected_cut: Option<usize>,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self { expected_cut: Some(3) }
    }
}
