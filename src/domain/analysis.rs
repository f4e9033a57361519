//! Analysis Result Types
//!
//! Output contract of the analyzer: sentiment, score and quant sub-scores.
//! Serialized in camelCase because the same record is submitted upstream.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Overall market sentiment for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

/// Quant risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Shape of recent trading volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeProfile {
    Surging,
    Rising,
    Stable,
    Declining,
    Dead,
}

impl VolumeProfile {
    /// Volume is growing (surging or rising)
    pub fn is_expanding(&self) -> bool {
        matches!(self, VolumeProfile::Surging | VolumeProfile::Rising)
    }

    /// Volume is drying up (declining or dead)
    pub fn is_fading(&self) -> bool {
        matches!(self, VolumeProfile::Declining | VolumeProfile::Dead)
    }
}

/// Short-term price trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

macro_rules! lowercase_display {
    ($($ty:ty => { $($variant:ident => $text:literal),+ $(,)? }),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(match self {
                        $(Self::$variant => $text),+
                    })
                }
            }
        )+
    };
}

lowercase_display! {
    Sentiment => { Bullish => "bullish", Neutral => "neutral", Bearish => "bearish" },
    RiskLevel => { Low => "low", Medium => "medium", High => "high", Critical => "critical" },
    VolumeProfile => {
        Surging => "surging",
        Rising => "rising",
        Stable => "stable",
        Declining => "declining",
        Dead => "dead",
    },
    TrendDirection => { Up => "up", Down => "down", Flat => "flat" },
}

/// Quantitative sub-scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantMetrics {
    /// Share of buy-side activity (0-100)
    pub buy_pressure: f64,
    pub risk_level: RiskLevel,
    pub volume_profile: VolumeProfile,
    pub trend_direction: TrendDirection,
    /// Ordered risk-factor tags, most severe first
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

/// Analyzer output for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    /// Composite score (0-100)
    pub score: f64,
    /// One-line human readable summary
    #[serde(default)]
    pub summary: String,
    pub quant: QuantMetrics,
}
