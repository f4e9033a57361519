//! Trade Evaluator Parameters
//!
//! Floors, caps and bonding-progress tier boundaries for the paper-trade
//! signal engine. Maps to the `[trader]` section in config.toml; every field
//! has a default so the section may be omitted.
//!
//! Comparison semantics are fixed by the gates, not by these values:
//! floors reject on `<`, caps reject on `>`, tier boundaries include their
//! lower bound (`>=`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("{field} must be finite and >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be within 0-100, got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("bonding tiers must satisfy 0 <= momentum ({momentum}) <= graduation ({graduation}) <= medium ({medium}) <= large ({large}) <= 100")]
    UnorderedTiers {
        momentum: f64,
        graduation: f64,
        medium: f64,
        large: f64,
    },

    #[error("sniper_min_confirmations must be 1-5, got {0}")]
    InvalidConfirmations(usize),
}

/// Thresholds for the trade evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeThresholds {
    // ===== Eligibility floors =====
    /// Minimum 24h volume in USD
    #[serde(default = "default_min_volume_usd")]
    pub min_volume_usd: f64,

    /// Minimum liquidity in USD
    #[serde(default = "default_min_liquidity_usd")]
    pub min_liquidity_usd: f64,

    /// Minimum holder count
    #[serde(default = "default_min_holders")]
    pub min_holders: u64,

    /// Minimum buy pressure (0-100)
    #[serde(default = "default_min_buy_pressure")]
    pub min_buy_pressure: f64,

    // ===== Concentration caps (%) =====
    #[serde(default = "default_max_top10_pct")]
    pub max_top10_pct: f64,

    #[serde(default = "default_max_creator_pct")]
    pub max_creator_pct: f64,

    #[serde(default = "default_max_snipers_pct")]
    pub max_snipers_pct: f64,

    // ===== Bonding progress tiers =====
    /// Lower bound of the graduation tier
    #[serde(default = "default_graduation_min_bonding")]
    pub graduation_min_bonding: f64,

    /// Graduation sub-tier sized medium
    #[serde(default = "default_graduation_medium_bonding")]
    pub graduation_medium_bonding: f64,

    /// Graduation sub-tier sized large ("max conviction")
    #[serde(default = "default_graduation_large_bonding")]
    pub graduation_large_bonding: f64,

    /// Lower bound of the momentum tier; below it is the sniper tier
    #[serde(default = "default_momentum_min_bonding")]
    pub momentum_min_bonding: f64,

    // ===== Sniper confirmations =====
    /// Bullish confirmations (out of 5) required for a sniper entry
    #[serde(default = "default_sniper_min_confirmations")]
    pub sniper_min_confirmations: usize,

    /// Buy pressure that counts as a sniper confirmation
    #[serde(default = "default_sniper_buy_pressure")]
    pub sniper_buy_pressure: f64,

    /// Holder count that counts as a sniper confirmation
    #[serde(default = "default_sniper_min_holders")]
    pub sniper_min_holders: u64,
}

fn default_min_volume_usd() -> f64 { 500.0 }
fn default_min_liquidity_usd() -> f64 { 1_000.0 }
fn default_min_holders() -> u64 { 5 }
fn default_min_buy_pressure() -> f64 { 55.0 }
fn default_max_top10_pct() -> f64 { 70.0 }
fn default_max_creator_pct() -> f64 { 40.0 }
fn default_max_snipers_pct() -> f64 { 30.0 }
fn default_graduation_min_bonding() -> f64 { 60.0 }
fn default_graduation_medium_bonding() -> f64 { 75.0 }
fn default_graduation_large_bonding() -> f64 { 85.0 }
fn default_momentum_min_bonding() -> f64 { 30.0 }
fn default_sniper_min_confirmations() -> usize { 3 }
fn default_sniper_buy_pressure() -> f64 { 70.0 }
fn default_sniper_min_holders() -> u64 { 20 }

impl Default for TradeThresholds {
    fn default() -> Self {
        Self {
            min_volume_usd: default_min_volume_usd(),
            min_liquidity_usd: default_min_liquidity_usd(),
            min_holders: default_min_holders(),
            min_buy_pressure: default_min_buy_pressure(),
            max_top10_pct: default_max_top10_pct(),
            max_creator_pct: default_max_creator_pct(),
            max_snipers_pct: default_max_snipers_pct(),
            graduation_min_bonding: default_graduation_min_bonding(),
            graduation_medium_bonding: default_graduation_medium_bonding(),
            graduation_large_bonding: default_graduation_large_bonding(),
            momentum_min_bonding: default_momentum_min_bonding(),
            sniper_min_confirmations: default_sniper_min_confirmations(),
            sniper_buy_pressure: default_sniper_buy_pressure(),
            sniper_min_holders: default_sniper_min_holders(),
        }
    }
}

impl TradeThresholds {
    /// Validate threshold values
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for (field, value) in [
            ("min_volume_usd", self.min_volume_usd),
            ("min_liquidity_usd", self.min_liquidity_usd),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ThresholdError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("min_buy_pressure", self.min_buy_pressure),
            ("max_top10_pct", self.max_top10_pct),
            ("max_creator_pct", self.max_creator_pct),
            ("max_snipers_pct", self.max_snipers_pct),
            ("sniper_buy_pressure", self.sniper_buy_pressure),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ThresholdError::OutOfRange { field, value });
            }
        }

        let ordered = 0.0 <= self.momentum_min_bonding
            && self.momentum_min_bonding <= self.graduation_min_bonding
            && self.graduation_min_bonding <= self.graduation_medium_bonding
            && self.graduation_medium_bonding <= self.graduation_large_bonding
            && self.graduation_large_bonding <= 100.0;
        if !ordered {
            return Err(ThresholdError::UnorderedTiers {
                momentum: self.momentum_min_bonding,
                graduation: self.graduation_min_bonding,
                medium: self.graduation_medium_bonding,
                large: self.graduation_large_bonding,
            });
        }

        if !(1..=5).contains(&self.sniper_min_confirmations) {
            return Err(ThresholdError::InvalidConfirmations(self.sniper_min_confirmations));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let t = TradeThresholds::default();
        assert!(t.validate().is_ok());
        assert_eq!(t.min_volume_usd, 500.0);
        assert_eq!(t.graduation_min_bonding, 60.0);
        assert_eq!(t.momentum_min_bonding, 30.0);
        assert_eq!(t.sniper_min_confirmations, 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let t: TradeThresholds = toml::from_str("min_volume_usd = 750.0").unwrap();
        assert_eq!(t.min_volume_usd, 750.0);
        assert_eq!(t.min_liquidity_usd, 1_000.0);
        assert_eq!(t.max_snipers_pct, 30.0);
    }

    #[test]
    fn test_rejects_unordered_tiers() {
        let t = TradeThresholds {
            graduation_medium_bonding: 90.0,
            graduation_large_bonding: 80.0,
            ..Default::default()
        };
        assert!(matches!(t.validate(), Err(ThresholdError::UnorderedTiers { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_caps() {
        let t = TradeThresholds {
            max_top10_pct: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            t.validate(),
            Err(ThresholdError::OutOfRange { field: "max_top10_pct", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_confirmation_count() {
        let t = TradeThresholds {
            sniper_min_confirmations: 6,
            ..Default::default()
        };
        assert_eq!(t.validate(), Err(ThresholdError::InvalidConfirmations(6)));
    }
}
