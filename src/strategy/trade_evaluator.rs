//! Trade Evaluator
//!
//! Decides whether a paper trade should be taken on a token, given its
//! snapshot and the analyzer's output. Pure and deterministic: the same
//! (snapshot, analysis) pair always yields the same `TradeSignal`.
//!
//! Evaluation has two stages:
//! 1. The gate cascade (`gates::DEFAULT_GATES`), first failure wins
//! 2. Tier selection on bonding progress:
//!    - Graduation (>= 60%): sized by sub-tier, boosted by surging volume
//!    - Momentum (30-60%): small, needs an up trend and non-fading volume
//!    - Sniper (< 30%): small, needs enough bullish confirmations

use crate::domain::{
    finite_or, AnalysisResult, PaperStrategy, PositionSize, Rejection, Sentiment, Snapshot,
    TradeSignal, TrendDirection, VolumeProfile,
};
use crate::strategy::gates::{run_gates, Gate, GateInput, DEFAULT_GATES};
use crate::strategy::params::TradeThresholds;

/// Stateless paper-trade signal engine
#[derive(Debug, Clone)]
pub struct TradeEvaluator {
    thresholds: TradeThresholds,
    gates: Vec<Gate>,
}

impl Default for TradeEvaluator {
    fn default() -> Self {
        Self::new(TradeThresholds::default())
    }
}

impl TradeEvaluator {
    pub fn new(thresholds: TradeThresholds) -> Self {
        Self {
            thresholds,
            gates: DEFAULT_GATES.to_vec(),
        }
    }

    pub fn thresholds(&self) -> &TradeThresholds {
        &self.thresholds
    }

    /// Gates in the order they are evaluated
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Evaluate one (snapshot, analysis) pair
    pub fn evaluate(&self, snapshot: &Snapshot, analysis: &AnalysisResult) -> TradeSignal {
        let snapshot = sanitize_snapshot(snapshot);
        let analysis = sanitize_analysis(analysis);

        let input = GateInput {
            snapshot: &snapshot,
            analysis: &analysis,
            thresholds: &self.thresholds,
        };
        if let Err(rejection) = run_gates(&self.gates, &input) {
            return TradeSignal::reject(rejection, None);
        }

        let bonding = snapshot.bonding_progress;
        let t = &self.thresholds;
        let risk_factors = &analysis.quant.risk_factors;

        if bonding >= t.graduation_min_bonding {
            let (size, reason) = self.graduation_tier(bonding, analysis.quant.volume_profile);
            TradeSignal::accept(PaperStrategy::Graduation, size, reason, risk_factors)
        } else if bonding >= t.momentum_min_bonding {
            match self.momentum_tier(bonding, &analysis) {
                Ok(reason) => TradeSignal::accept(
                    PaperStrategy::Momentum,
                    PositionSize::Small,
                    reason,
                    risk_factors,
                ),
                Err(rejection) => TradeSignal::reject(rejection, Some(PaperStrategy::Momentum)),
            }
        } else {
            match self.sniper_tier(bonding, &snapshot, &analysis) {
                Ok(reason) => TradeSignal::accept(
                    PaperStrategy::Sniper,
                    PositionSize::Small,
                    reason,
                    risk_factors,
                ),
                Err(rejection) => TradeSignal::reject(rejection, Some(PaperStrategy::Sniper)),
            }
        }
    }

    fn graduation_tier(&self, bonding: f64, profile: VolumeProfile) -> (PositionSize, String) {
        let t = &self.thresholds;
        let mut reason = format!("bonding {:.0}%, graduation play", bonding);

        let base = if bonding >= t.graduation_large_bonding {
            reason.push_str(&format!(
                " (>={:.0}%, max conviction)",
                t.graduation_large_bonding
            ));
            PositionSize::Large
        } else if bonding >= t.graduation_medium_bonding {
            reason.push_str(&format!(" (>={:.0}%)", t.graduation_medium_bonding));
            PositionSize::Medium
        } else {
            PositionSize::Small
        };

        if profile == VolumeProfile::Surging {
            reason.push_str(" + surging volume");
            (base.surge_boost(), reason)
        } else {
            (base, reason)
        }
    }

    fn momentum_tier(&self, bonding: f64, analysis: &AnalysisResult) -> Result<String, Rejection> {
        let trend = analysis.quant.trend_direction;
        if trend != TrendDirection::Up {
            return Err(Rejection::TrendMismatch { bonding, trend });
        }
        let profile = analysis.quant.volume_profile;
        if profile.is_fading() {
            return Err(Rejection::VolumeFading { bonding, profile });
        }
        Ok(format!("bonding {:.0}%, momentum play", bonding))
    }

    fn sniper_tier(
        &self,
        bonding: f64,
        snapshot: &Snapshot,
        analysis: &AnalysisResult,
    ) -> Result<String, Rejection> {
        let confirmations = self.sniper_confirmations(snapshot, analysis);
        let required = self.thresholds.sniper_min_confirmations;
        if confirmations < required {
            return Err(Rejection::Unconfirmed {
                confirmations,
                required,
            });
        }
        Ok(format!(
            "bonding {:.0}%, early sniper ({}/5 signals)",
            bonding, confirmations
        ))
    }

    /// Count of the five bullish confirmations used by the sniper tier
    pub fn sniper_confirmations(&self, snapshot: &Snapshot, analysis: &AnalysisResult) -> usize {
        let t = &self.thresholds;
        [
            analysis.sentiment == Sentiment::Bullish,
            analysis.quant.trend_direction == TrendDirection::Up,
            analysis.quant.volume_profile.is_expanding(),
            analysis.quant.buy_pressure >= t.sniper_buy_pressure,
            snapshot.holder_count >= t.sniper_min_holders,
        ]
        .into_iter()
        .filter(|confirmed| *confirmed)
        .count()
    }
}

fn sanitize_snapshot(snapshot: &Snapshot) -> Snapshot {
    Snapshot {
        price_usd: finite_or(Some(snapshot.price_usd), 0.0),
        volume_24h: finite_or(Some(snapshot.volume_24h), 0.0),
        liquidity: finite_or(Some(snapshot.liquidity), 0.0),
        bonding_progress: finite_or(Some(snapshot.bonding_progress), 0.0),
        top10_holding: finite_or(Some(snapshot.top10_holding), 0.0),
        creator_holding: finite_or(Some(snapshot.creator_holding), 0.0),
        snipers_holding: finite_or(Some(snapshot.snipers_holding), 0.0),
        ..snapshot.clone()
    }
}

// NaN buy pressure would slip past `<` comparisons
fn sanitize_analysis(analysis: &AnalysisResult) -> AnalysisResult {
    let mut analysis = analysis.clone();
    analysis.quant.buy_pressure = finite_or(Some(analysis.quant.buy_pressure), 0.0);
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuantMetrics, RiskLevel};
    use rust_decimal_macros::dec;

    fn snapshot(bonding: f64) -> Snapshot {
        Snapshot {
            mint: "mint".to_string(),
            price_usd: 0.01,
            volume_24h: 1_000.0,
            liquidity: 2_000.0,
            holder_count: 10,
            bonding_progress: bonding,
            bonding_complete: false,
            top10_holding: 40.0,
            creator_holding: 5.0,
            snipers_holding: 5.0,
            ..Default::default()
        }
    }

    fn analysis(profile: VolumeProfile, trend: TrendDirection) -> AnalysisResult {
        AnalysisResult {
            sentiment: Sentiment::Bullish,
            score: 72.0,
            summary: "test".to_string(),
            quant: QuantMetrics {
                buy_pressure: 80.0,
                risk_level: RiskLevel::Low,
                volume_profile: profile,
                trend_direction: trend,
                risk_factors: vec!["low_holders".to_string()],
            },
        }
    }

    #[test]
    fn test_graduation_sub_tiers() {
        let evaluator = TradeEvaluator::default();
        let a = analysis(VolumeProfile::Stable, TrendDirection::Up);

        let s = evaluator.evaluate(&snapshot(60.0), &a);
        assert_eq!(s.strategy, Some(PaperStrategy::Graduation));
        assert_eq!(s.size, Some(PositionSize::Small));

        let s = evaluator.evaluate(&snapshot(75.0), &a);
        assert_eq!(s.size, Some(PositionSize::Medium));

        let s = evaluator.evaluate(&snapshot(85.0), &a);
        assert_eq!(s.size, Some(PositionSize::Large));
        assert!(s.reason.contains("max conviction"));
    }

    #[test]
    fn test_surge_boosts_below_large() {
        let evaluator = TradeEvaluator::default();
        let a = analysis(VolumeProfile::Surging, TrendDirection::Up);

        let s = evaluator.evaluate(&snapshot(65.0), &a);
        assert_eq!(s.size, Some(PositionSize::SmallBoosted));
        assert_eq!(s.sol_amount(), dec!(4));

        let s = evaluator.evaluate(&snapshot(80.0), &a);
        assert_eq!(s.size, Some(PositionSize::Large));
        assert!(s.reason.ends_with("+ surging volume"));
    }

    #[test]
    fn test_momentum_requires_up_trend() {
        let evaluator = TradeEvaluator::default();

        let s = evaluator.evaluate(&snapshot(30.0), &analysis(VolumeProfile::Stable, TrendDirection::Up));
        assert!(s.should_trade);
        assert_eq!(s.strategy, Some(PaperStrategy::Momentum));
        assert_eq!(s.size, Some(PositionSize::Small));

        let s = evaluator.evaluate(&snapshot(45.0), &analysis(VolumeProfile::Stable, TrendDirection::Flat));
        assert!(!s.should_trade);
        assert_eq!(s.strategy, Some(PaperStrategy::Momentum));
        assert_eq!(s.reason, "bonding 45% but trend flat");
    }

    #[test]
    fn test_momentum_rejects_fading_volume() {
        let evaluator = TradeEvaluator::default();
        let s = evaluator.evaluate(&snapshot(45.0), &analysis(VolumeProfile::Dead, TrendDirection::Up));
        assert!(!s.should_trade);
        assert_eq!(
            s.rejection,
            Some(Rejection::VolumeFading { bonding: 45.0, profile: VolumeProfile::Dead })
        );
    }

    #[test]
    fn test_sniper_confirmations() {
        let evaluator = TradeEvaluator::default();

        // bullish, up, rising, 80% buy pressure: 4/5 (holders 10 < 20)
        let s = evaluator.evaluate(&snapshot(29.999), &analysis(VolumeProfile::Rising, TrendDirection::Up));
        assert!(s.should_trade);
        assert_eq!(s.strategy, Some(PaperStrategy::Sniper));
        assert!(s.reason.contains("4/5 signals"));

        // neutral, flat, stable: only buy pressure confirms
        let mut weak = analysis(VolumeProfile::Stable, TrendDirection::Flat);
        weak.sentiment = Sentiment::Neutral;
        let s = evaluator.evaluate(&snapshot(10.0), &weak);
        assert!(!s.should_trade);
        assert_eq!(
            s.rejection,
            Some(Rejection::Unconfirmed { confirmations: 1, required: 3 })
        );
        assert_eq!(s.reason, "early bonding, only 1/5 bullish signals (need 3)");
    }

    #[test]
    fn test_non_finite_metrics_are_rejected() {
        let evaluator = TradeEvaluator::default();
        let mut s = snapshot(90.0);
        s.price_usd = f64::NAN;
        let signal = evaluator.evaluate(&s, &analysis(VolumeProfile::Stable, TrendDirection::Up));
        assert_eq!(signal.rejection, Some(Rejection::NoPrice { price: 0.0 }));

        let mut a = analysis(VolumeProfile::Stable, TrendDirection::Up);
        a.quant.buy_pressure = f64::NAN;
        let signal = evaluator.evaluate(&snapshot(90.0), &a);
        assert_eq!(signal.rejection.map(|r| r.gate()), Some("buy_pressure"));
    }

    #[test]
    fn test_risk_factors_carried_on_accept() {
        let evaluator = TradeEvaluator::default();
        let s = evaluator.evaluate(&snapshot(70.0), &analysis(VolumeProfile::Stable, TrendDirection::Up));
        assert_eq!(s.risk_factors, vec!["low_holders".to_string()]);
    }

    #[test]
    fn test_custom_thresholds() {
        let evaluator = TradeEvaluator::new(TradeThresholds {
            min_volume_usd: 5_000.0,
            ..Default::default()
        });
        let s = evaluator.evaluate(&snapshot(90.0), &analysis(VolumeProfile::Stable, TrendDirection::Up));
        assert_eq!(s.reason, "volume $1000 < $5000");
    }
}
