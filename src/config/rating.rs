//! Rating system configuration

use crate::error::RatingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the per-pair K-factor reacts to the profit gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KFactorMode {
    /// `k_base * clamp(gap / reference_magnitude, min_k_scale, max_k_scale)`
    #[default]
    Clamped,
    /// `k_base * (1 + gap / mean(|profit|))`, relative to the session's own swings
    SessionRelative,
}

impl fmt::Display for KFactorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KFactorMode::Clamped => write!(f, "clamped"),
            KFactorMode::SessionRelative => write!(f, "session_relative"),
        }
    }
}

impl FromStr for KFactorMode {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "clamped" => Ok(KFactorMode::Clamped),
            "session_relative" => Ok(KFactorMode::SessionRelative),
            other => Err(RatingError::ConfigurationError {
                message: format!("Unknown K-factor mode: {}", other),
            }),
        }
    }
}

/// Parameters of the profit-aware ELO update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating assigned on a player's first session
    pub initial_rating: f64,
    /// Baseline K-factor for a typical profit swing
    pub k_base: f64,
    /// Profit gap (in currency units) that counts as a typical swing
    pub reference_magnitude: f64,
    pub min_k_scale: f64,
    pub max_k_scale: f64,
    pub k_mode: KFactorMode,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1500.0,
            k_base: 32.0,
            reference_magnitude: 100.0,
            min_k_scale: 0.5,
            max_k_scale: 2.0,
            k_mode: KFactorMode::Clamped,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.initial_rating.is_finite() {
            return Err(RatingError::ConfigurationError {
                message: "Initial rating must be finite".to_string(),
            }
            .into());
        }

        if !(self.k_base.is_finite() && self.k_base > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "K base must be positive".to_string(),
            }
            .into());
        }

        if !(self.reference_magnitude.is_finite() && self.reference_magnitude > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "Reference magnitude must be positive".to_string(),
            }
            .into());
        }

        if !(self.min_k_scale.is_finite() && self.min_k_scale > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "Minimum K scale must be positive".to_string(),
            }
            .into());
        }

        if !self.max_k_scale.is_finite() || self.min_k_scale > self.max_k_scale {
            return Err(RatingError::ConfigurationError {
                message: format!(
                    "K scale bounds are inverted: min {} > max {}",
                    self.min_k_scale, self.max_k_scale
                ),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RatingConfig::default();
        assert_eq!(config.initial_rating, 1500.0);
        assert_eq!(config.k_base, 32.0);
        assert_eq!(config.k_mode, KFactorMode::Clamped);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RatingConfig::default();
        config.k_base = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.reference_magnitude = -5.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.min_k_scale = 3.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.initial_rating = f64::NAN;
        assert!(config.validate().is_err());

        // Degenerate clamp pins the multiplier
        config = RatingConfig::default();
        config.min_k_scale = 1.0;
        config.max_k_scale = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_k_mode_parsing() {
        assert_eq!("clamped".parse::<KFactorMode>().unwrap(), KFactorMode::Clamped);
        assert_eq!(
            "session-relative".parse::<KFactorMode>().unwrap(),
            KFactorMode::SessionRelative
        );
        assert!("linear".parse::<KFactorMode>().is_err());
        assert_eq!(KFactorMode::SessionRelative.to_string(), "session_relative");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RatingConfig = toml::from_str("k_base = 24.0").unwrap();
        assert_eq!(config.k_base, 24.0);
        assert_eq!(config.reference_magnitude, 100.0);
    }
}
