//! Trade Signal Types
//!
//! Decision record produced by the trade evaluator: whether to take a paper
//! trade, which strategy tier applies, the position size tier, and either the
//! acceptance reason or the tagged rejection of the first failing gate.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::analysis::{TrendDirection, VolumeProfile};

/// Maximum number of risk factors carried into an accepted signal
pub const MAX_CARRIED_RISK_FACTORS: usize = 8;

/// Paper strategy chosen from bonding progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperStrategy {
    /// Near-bonded: ride the token to graduation
    Graduation,
    /// Mid-bonded: trend-confirmed momentum entry
    Momentum,
    /// Early-bonded: multi-confirmation early entry
    Sniper,
}

impl fmt::Display for PaperStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperStrategy::Graduation => write!(f, "graduation"),
            PaperStrategy::Momentum => write!(f, "momentum"),
            PaperStrategy::Sniper => write!(f, "sniper"),
        }
    }
}

/// Fixed position size tiers (SOL, out of a 100 SOL paper portfolio)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSize {
    /// 2 SOL
    Small,
    /// 4 SOL - small doubled by a volume surge
    SmallBoosted,
    /// 5 SOL
    Medium,
    /// 10 SOL
    Large,
}

impl PositionSize {
    /// Size in SOL
    pub fn sol_amount(&self) -> Decimal {
        match self {
            PositionSize::Small => dec!(2),
            PositionSize::SmallBoosted => dec!(4),
            PositionSize::Medium => dec!(5),
            PositionSize::Large => dec!(10),
        }
    }

    /// Double the size, capped at `Large`. A boost applies once: boosting an
    /// already boosted or large size leaves it unchanged.
    pub fn surge_boost(self) -> Self {
        match self {
            PositionSize::Small => PositionSize::SmallBoosted,
            PositionSize::Medium => PositionSize::Large,
            other => other,
        }
    }
}

/// Why a trade was not taken, tagged by the gate that failed
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("already graduated")]
    AlreadyGraduated,

    #[error("no price")]
    NoPrice { price: f64 },

    #[error("volume ${observed:.0} < ${floor:.0}")]
    LowVolume { observed: f64, floor: f64 },

    #[error("liquidity ${observed:.0} < ${floor:.0}")]
    LowLiquidity { observed: f64, floor: f64 },

    #[error("{observed} holders < {floor}")]
    FewHolders { observed: u64, floor: u64 },

    #[error("bearish sentiment")]
    BearishSentiment,

    #[error("critical risk")]
    CriticalRisk,

    #[error("buy pressure {observed}% < {floor}%")]
    WeakBuyPressure { observed: f64, floor: f64 },

    #[error("top 10 hold {observed:.0}% > {cap:.0}%, whale dominated")]
    WhaleConcentration { observed: f64, cap: f64 },

    #[error("creator holds {observed:.0}% > {cap:.0}%")]
    CreatorHeavy { observed: f64, cap: f64 },

    #[error("snipers hold {observed:.0}% > {cap:.0}%")]
    SniperHeavy { observed: f64, cap: f64 },

    #[error("bonding {bonding:.0}% but trend {trend}")]
    TrendMismatch { bonding: f64, trend: TrendDirection },

    #[error("bonding {bonding:.0}% but volume {profile}")]
    VolumeFading { bonding: f64, profile: VolumeProfile },

    #[error("early bonding, only {confirmations}/5 bullish signals (need {required})")]
    Unconfirmed { confirmations: usize, required: usize },
}

impl Rejection {
    /// Name of the gate that produced this rejection
    pub fn gate(&self) -> &'static str {
        match self {
            Rejection::AlreadyGraduated => "bonding_complete",
            Rejection::NoPrice { .. } => "price",
            Rejection::LowVolume { .. } => "volume_floor",
            Rejection::LowLiquidity { .. } => "liquidity_floor",
            Rejection::FewHolders { .. } => "holder_floor",
            Rejection::BearishSentiment => "sentiment",
            Rejection::CriticalRisk => "risk_level",
            Rejection::WeakBuyPressure { .. } => "buy_pressure",
            Rejection::WhaleConcentration { .. } => "top10_cap",
            Rejection::CreatorHeavy { .. } => "creator_cap",
            Rejection::SniperHeavy { .. } => "sniper_cap",
            Rejection::TrendMismatch { .. } => "momentum_trend",
            Rejection::VolumeFading { .. } => "momentum_volume",
            Rejection::Unconfirmed { .. } => "sniper_confirmations",
        }
    }
}

/// Paper-trade decision for one (snapshot, analysis) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSignal {
    pub should_trade: bool,
    /// Strategy tier; absent when rejected before tier selection
    pub strategy: Option<PaperStrategy>,
    /// Position size; always absent on rejection
    pub size: Option<PositionSize>,
    /// Human-readable acceptance or rejection reason
    pub reason: String,
    pub rejection: Option<Rejection>,
    /// Risk factors carried from the analysis (accepted signals only)
    pub risk_factors: Vec<String>,
}

impl TradeSignal {
    /// Accepted signal; risk factors are truncated to `MAX_CARRIED_RISK_FACTORS`
    pub fn accept(
        strategy: PaperStrategy,
        size: PositionSize,
        reason: String,
        risk_factors: &[String],
    ) -> Self {
        Self {
            should_trade: true,
            strategy: Some(strategy),
            size: Some(size),
            reason,
            rejection: None,
            risk_factors: risk_factors
                .iter()
                .take(MAX_CARRIED_RISK_FACTORS)
                .cloned()
                .collect(),
        }
    }

    pub fn reject(rejection: Rejection, strategy: Option<PaperStrategy>) -> Self {
        Self {
            should_trade: false,
            strategy,
            size: None,
            reason: rejection.to_string(),
            rejection: Some(rejection),
            risk_factors: Vec::new(),
        }
    }

    /// Position size in SOL (zero when no trade)
    pub fn sol_amount(&self) -> Decimal {
        self.size.map(|s| s.sol_amount()).unwrap_or(Decimal::ZERO)
    }
}
