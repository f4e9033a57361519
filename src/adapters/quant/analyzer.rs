//! Heuristic Quant Analyzer
//!
//! Default `Analyzer`: a deterministic, rule-based scorer over a single
//! snapshot. Risk factors are accumulated with a severity each (0-25); the
//! total severity maps to a risk level, and the composite score blends buy
//! pressure, trend, volume profile and risk.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AnalysisResult, QuantMetrics, RiskLevel, Sentiment, Snapshot, TrendDirection, VolumeProfile,
};
use crate::ports::Analyzer;

/// Buy pressure assumed when no trades were reported
pub const NEUTRAL_BUY_PRESSURE: f64 = 50.0;

/// Tuning for the heuristic analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicConfig {
    /// Price change (%) beyond which the trend is up/down
    pub trend_threshold_pct: f64,
    /// 24h volume change (%) classed as surging
    pub surging_volume_change_pct: f64,
    /// 24h volume change (%) classed as rising
    pub rising_volume_change_pct: f64,
    /// 24h volume change (%) below which volume is declining
    pub declining_volume_change_pct: f64,
    /// 24h volume (USD) below which volume is dead
    pub dead_volume_usd: f64,
    /// Score at or above which sentiment is bullish
    pub bullish_score: f64,
    /// Score at or below which sentiment is bearish
    pub bearish_score: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            trend_threshold_pct: 5.0,
            surging_volume_change_pct: 100.0,
            rising_volume_change_pct: 20.0,
            declining_volume_change_pct: -20.0,
            dead_volume_usd: 100.0,
            bullish_score: 60.0,
            bearish_score: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RiskFlag {
    tag: &'static str,
    severity: u32,
}

/// Rule-based analyzer
#[derive(Debug, Clone, Default)]
pub struct HeuristicAnalyzer {
    config: HeuristicConfig,
}

impl HeuristicAnalyzer {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    /// Share of buys in the last 24h (0-100)
    pub fn buy_pressure(&self, snapshot: &Snapshot) -> f64 {
        let buys = snapshot.buys_24h as f64;
        let trades = buys + snapshot.sells_24h as f64;
        if trades == 0.0 {
            return NEUTRAL_BUY_PRESSURE;
        }
        (buys / trades * 100.0).round()
    }

    pub fn volume_profile(&self, snapshot: &Snapshot) -> VolumeProfile {
        let c = &self.config;
        if snapshot.volume_24h < c.dead_volume_usd {
            return VolumeProfile::Dead;
        }
        let change = snapshot.volume_change_24h;
        if change >= c.surging_volume_change_pct {
            VolumeProfile::Surging
        } else if change >= c.rising_volume_change_pct {
            VolumeProfile::Rising
        } else if change <= c.declining_volume_change_pct {
            VolumeProfile::Declining
        } else {
            VolumeProfile::Stable
        }
    }

    /// Trend from the 1h price change, falling back to 24h when flat
    pub fn trend_direction(&self, snapshot: &Snapshot) -> TrendDirection {
        let threshold = self.config.trend_threshold_pct;
        let change = if snapshot.price_change_1h != 0.0 {
            snapshot.price_change_1h
        } else {
            snapshot.price_change_24h
        };
        if change > threshold {
            TrendDirection::Up
        } else if change < -threshold {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        }
    }

    fn risk_flags(&self, snapshot: &Snapshot, buy_pressure: f64) -> Vec<RiskFlag> {
        let mut flags = Vec::new();
        let mut flag = |tag: &'static str, severity: u32| flags.push(RiskFlag { tag, severity });

        if snapshot.price_usd <= 0.0 {
            flag("no_price", 25);
        }
        if snapshot.top10_holding > 70.0 {
            flag("whale_concentration", 20);
        } else if snapshot.top10_holding > 50.0 {
            flag("top_heavy", 10);
        }
        if snapshot.creator_holding > 20.0 {
            flag("creator_heavy", 15);
        }
        if snapshot.snipers_holding > 20.0 {
            flag("sniper_heavy", 15);
        }
        if snapshot.liquidity < 1_000.0 {
            flag("thin_liquidity", 15);
        } else if snapshot.liquidity < 5_000.0 {
            flag("low_liquidity", 5);
        }
        if snapshot.holder_count < 20 {
            flag("low_holders", 10);
        }
        if snapshot.volume_24h < 500.0 {
            flag("low_volume", 10);
        }
        if buy_pressure < 40.0 {
            flag("selling_pressure", 10);
        }
        if snapshot.price_change_24h < -50.0 {
            flag("price_collapse", 20);
        } else if snapshot.price_change_24h < -25.0 {
            flag("price_dumping", 10);
        }

        // Most severe first; ties keep rule order
        flags.sort_by(|a, b| b.severity.cmp(&a.severity));
        flags
    }

    fn risk_level(total_severity: u32) -> RiskLevel {
        if total_severity <= 10 {
            RiskLevel::Low
        } else if total_severity <= 30 {
            RiskLevel::Medium
        } else if total_severity <= 55 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    fn score(
        buy_pressure: f64,
        trend: TrendDirection,
        profile: VolumeProfile,
        total_severity: u32,
    ) -> f64 {
        let mut score = 50.0 + (buy_pressure - NEUTRAL_BUY_PRESSURE) * 0.5;
        score += match trend {
            TrendDirection::Up => 10.0,
            TrendDirection::Flat => 0.0,
            TrendDirection::Down => -10.0,
        };
        score += match profile {
            VolumeProfile::Surging => 10.0,
            VolumeProfile::Rising => 5.0,
            VolumeProfile::Stable => 0.0,
            VolumeProfile::Declining => -5.0,
            VolumeProfile::Dead => -15.0,
        };
        score -= total_severity as f64 * 0.3;
        score.clamp(0.0, 100.0).round()
    }
}

impl Analyzer for HeuristicAnalyzer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn analyze(&self, snapshot: &Snapshot) -> AnalysisResult {
        let buy_pressure = self.buy_pressure(snapshot);
        let volume_profile = self.volume_profile(snapshot);
        let trend_direction = self.trend_direction(snapshot);

        let flags = self.risk_flags(snapshot, buy_pressure);
        let total_severity: u32 = flags.iter().map(|f| f.severity).sum();
        let risk_level = Self::risk_level(total_severity);
        let score = Self::score(buy_pressure, trend_direction, volume_profile, total_severity);

        let sentiment = if risk_level == RiskLevel::Critical || score <= self.config.bearish_score {
            Sentiment::Bearish
        } else if score >= self.config.bullish_score {
            Sentiment::Bullish
        } else {
            Sentiment::Neutral
        };

        let summary = format!(
            "{} at score {:.0}: buy pressure {:.0}%, volume {}, trend {}, {} risk ({} factors)",
            sentiment,
            score,
            buy_pressure,
            volume_profile,
            trend_direction,
            risk_level,
            flags.len()
        );

        AnalysisResult {
            sentiment,
            score,
            summary,
            quant: QuantMetrics {
                buy_pressure,
                risk_level,
                volume_profile,
                trend_direction,
                risk_factors: flags.into_iter().map(|f| f.tag.to_string()).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> Snapshot {
        Snapshot {
            mint: "mint".to_string(),
            price_usd: 0.002,
            volume_24h: 25_000.0,
            liquidity: 15_000.0,
            holder_count: 250,
            bonding_progress: 70.0,
            top10_holding: 30.0,
            creator_holding: 3.0,
            snipers_holding: 4.0,
            price_change_1h: 12.0,
            price_change_24h: 40.0,
            buys_24h: 300,
            sells_24h: 100,
            volume_change_24h: 150.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy_token_is_bullish() {
        let result = HeuristicAnalyzer::default().analyze(&healthy());
        assert_eq!(result.sentiment, Sentiment::Bullish);
        assert_eq!(result.quant.buy_pressure, 75.0);
        assert_eq!(result.quant.volume_profile, VolumeProfile::Surging);
        assert_eq!(result.quant.trend_direction, TrendDirection::Up);
        assert_eq!(result.quant.risk_level, RiskLevel::Low);
        assert!(result.quant.risk_factors.is_empty());
        assert!(result.score >= 60.0);
    }

    #[test]
    fn test_buy_pressure_with_saturated_trade_counts() {
        let analyzer = HeuristicAnalyzer::default();
        let lopsided = Snapshot {
            buys_24h: u64::MAX,
            sells_24h: 1,
            ..healthy()
        };
        assert_eq!(analyzer.buy_pressure(&lopsided), 100.0);
        assert_eq!(analyzer.analyze(&lopsided).quant.buy_pressure, 100.0);

        let even = Snapshot {
            buys_24h: u64::MAX,
            sells_24h: u64::MAX,
            ..healthy()
        };
        assert_eq!(analyzer.buy_pressure(&even), 50.0);
    }

    #[test]
    fn test_empty_snapshot_is_critical() {
        let result = HeuristicAnalyzer::default().analyze(&Snapshot::default());
        assert_eq!(result.quant.risk_level, RiskLevel::Critical);
        assert_eq!(result.sentiment, Sentiment::Bearish);
        assert_eq!(result.quant.volume_profile, VolumeProfile::Dead);
        assert_eq!(result.quant.risk_factors[0], "no_price");
    }

    #[test]
    fn test_risk_factors_ordered_by_severity() {
        let snapshot = Snapshot {
            holder_count: 5,
            top10_holding: 85.0,
            ..healthy()
        };
        let result = HeuristicAnalyzer::default().analyze(&snapshot);
        assert_eq!(
            result.quant.risk_factors,
            vec!["whale_concentration".to_string(), "low_holders".to_string()]
        );
        assert_eq!(result.quant.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_no_trades_is_neutral_pressure() {
        let snapshot = Snapshot {
            buys_24h: 0,
            sells_24h: 0,
            ..healthy()
        };
        let analyzer = HeuristicAnalyzer::default();
        assert_eq!(analyzer.buy_pressure(&snapshot), NEUTRAL_BUY_PRESSURE);
    }

    #[test]
    fn test_trend_falls_back_to_24h() {
        let snapshot = Snapshot {
            price_change_1h: 0.0,
            price_change_24h: -12.0,
            ..healthy()
        };
        let analyzer = HeuristicAnalyzer::default();
        assert_eq!(analyzer.trend_direction(&snapshot), TrendDirection::Down);
    }

    #[test]
    fn test_deterministic() {
        let analyzer = HeuristicAnalyzer::default();
        let snapshot = healthy();
        assert_eq!(analyzer.analyze(&snapshot), analyzer.analyze(&snapshot));
    }
}
