//! Trade Gates
//!
//! The hard filters run before tier selection, as an ordered list of named
//! pure predicates. Each gate either passes or returns the tagged
//! `Rejection` that names it. The first failing gate wins, so the order of
//! `DEFAULT_GATES` is part of the evaluator's contract:
//!
//! 1. Eligibility: graduated, price, volume, liquidity, holders
//! 2. Sentiment and risk level
//! 3. Buy pressure
//! 4. Concentration: top 10, creator, snipers
//!
//! Floors reject strictly below (`<`), caps reject strictly above (`>`).
//! Gates expect a sanitized snapshot (see `TradeEvaluator`).

use crate::domain::{AnalysisResult, Rejection, RiskLevel, Sentiment, Snapshot};
use crate::strategy::params::TradeThresholds;

/// Inputs shared by every gate
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub snapshot: &'a Snapshot,
    pub analysis: &'a AnalysisResult,
    pub thresholds: &'a TradeThresholds,
}

pub type GateFn = fn(&GateInput<'_>) -> Result<(), Rejection>;

/// A named pass/reject predicate
#[derive(Clone, Copy)]
pub struct Gate {
    pub name: &'static str,
    pub check: GateFn,
}

impl Gate {
    pub const fn new(name: &'static str, check: GateFn) -> Self {
        Self { name, check }
    }

    pub fn run(&self, input: &GateInput<'_>) -> Result<(), Rejection> {
        (self.check)(input)
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate").field("name", &self.name).finish()
    }
}

/// Gates in evaluation order
pub const DEFAULT_GATES: [Gate; 11] = [
    Gate::new("bonding_complete", bonding_complete),
    Gate::new("price", price),
    Gate::new("volume_floor", volume_floor),
    Gate::new("liquidity_floor", liquidity_floor),
    Gate::new("holder_floor", holder_floor),
    Gate::new("sentiment", sentiment),
    Gate::new("risk_level", risk_level),
    Gate::new("buy_pressure", buy_pressure),
    Gate::new("top10_cap", top10_cap),
    Gate::new("creator_cap", creator_cap),
    Gate::new("sniper_cap", sniper_cap),
];

/// Run `gates` in order, stopping at the first rejection
pub fn run_gates(gates: &[Gate], input: &GateInput<'_>) -> Result<(), Rejection> {
    for gate in gates {
        if let Err(rejection) = gate.run(input) {
            tracing::trace!("Gate '{}' rejected: {}", gate.name, rejection);
            return Err(rejection);
        }
    }
    Ok(())
}

fn bonding_complete(input: &GateInput<'_>) -> Result<(), Rejection> {
    if input.snapshot.bonding_complete {
        return Err(Rejection::AlreadyGraduated);
    }
    Ok(())
}

fn price(input: &GateInput<'_>) -> Result<(), Rejection> {
    let price = input.snapshot.price_usd;
    if price <= 0.0 {
        return Err(Rejection::NoPrice { price });
    }
    Ok(())
}

fn volume_floor(input: &GateInput<'_>) -> Result<(), Rejection> {
    let observed = input.snapshot.volume_24h;
    let floor = input.thresholds.min_volume_usd;
    if observed < floor {
        return Err(Rejection::LowVolume { observed, floor });
    }
    Ok(())
}

fn liquidity_floor(input: &GateInput<'_>) -> Result<(), Rejection> {
    let observed = input.snapshot.liquidity;
    let floor = input.thresholds.min_liquidity_usd;
    if observed < floor {
        return Err(Rejection::LowLiquidity { observed, floor });
    }
    Ok(())
}

fn holder_floor(input: &GateInput<'_>) -> Result<(), Rejection> {
    let observed = input.snapshot.holder_count;
    let floor = input.thresholds.min_holders;
    if observed < floor {
        return Err(Rejection::FewHolders { observed, floor });
    }
    Ok(())
}

fn sentiment(input: &GateInput<'_>) -> Result<(), Rejection> {
    if input.analysis.sentiment == Sentiment::Bearish {
        return Err(Rejection::BearishSentiment);
    }
    Ok(())
}

fn risk_level(input: &GateInput<'_>) -> Result<(), Rejection> {
    if input.analysis.quant.risk_level == RiskLevel::Critical {
        return Err(Rejection::CriticalRisk);
    }
    Ok(())
}

fn buy_pressure(input: &GateInput<'_>) -> Result<(), Rejection> {
    let observed = input.analysis.quant.buy_pressure;
    let floor = input.thresholds.min_buy_pressure;
    if observed < floor {
        return Err(Rejection::WeakBuyPressure { observed, floor });
    }
    Ok(())
}

fn top10_cap(input: &GateInput<'_>) -> Result<(), Rejection> {
    let observed = input.snapshot.top10_holding;
    let cap = input.thresholds.max_top10_pct;
    if observed > cap {
        return Err(Rejection::WhaleConcentration { observed, cap });
    }
    Ok(())
}

fn creator_cap(input: &GateInput<'_>) -> Result<(), Rejection> {
    let observed = input.snapshot.creator_holding;
    let cap = input.thresholds.max_creator_pct;
    if observed > cap {
        return Err(Rejection::CreatorHeavy { observed, cap });
    }
    Ok(())
}

fn sniper_cap(input: &GateInput<'_>) -> Result<(), Rejection> {
    let observed = input.snapshot.snipers_holding;
    let cap = input.thresholds.max_snipers_pct;
    if observed > cap {
        return Err(Rejection::SniperHeavy { observed, cap });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuantMetrics, TrendDirection, VolumeProfile};

    fn passing_snapshot() -> Snapshot {
        Snapshot {
            mint: "mint".to_string(),
            price_usd: 0.01,
            volume_24h: 1_000.0,
            liquidity: 2_000.0,
            holder_count: 10,
            bonding_progress: 50.0,
            top10_holding: 40.0,
            creator_holding: 5.0,
            snipers_holding: 5.0,
            ..Default::default()
        }
    }

    fn passing_analysis() -> AnalysisResult {
        AnalysisResult {
            sentiment: Sentiment::Bullish,
            score: 70.0,
            summary: String::new(),
            quant: QuantMetrics {
                buy_pressure: 80.0,
                risk_level: RiskLevel::Low,
                volume_profile: VolumeProfile::Rising,
                trend_direction: TrendDirection::Up,
                risk_factors: Vec::new(),
            },
        }
    }

    #[test]
    fn test_gate_names_match_rejections() {
        // Every gate must tag its rejection with its own name
        let thresholds = TradeThresholds::default();
        let analysis = passing_analysis();
        let cases: Vec<(&str, Snapshot, AnalysisResult)> = vec![
            ("bonding_complete", Snapshot { bonding_complete: true, ..passing_snapshot() }, analysis.clone()),
            ("price", Snapshot { price_usd: 0.0, ..passing_snapshot() }, analysis.clone()),
            ("volume_floor", Snapshot { volume_24h: 10.0, ..passing_snapshot() }, analysis.clone()),
            ("liquidity_floor", Snapshot { liquidity: 10.0, ..passing_snapshot() }, analysis.clone()),
            ("holder_floor", Snapshot { holder_count: 1, ..passing_snapshot() }, analysis.clone()),
            ("top10_cap", Snapshot { top10_holding: 90.0, ..passing_snapshot() }, analysis.clone()),
            ("creator_cap", Snapshot { creator_holding: 50.0, ..passing_snapshot() }, analysis.clone()),
            ("sniper_cap", Snapshot { snipers_holding: 31.0, ..passing_snapshot() }, analysis.clone()),
        ];

        for (name, snapshot, analysis) in cases {
            let input = GateInput { snapshot: &snapshot, analysis: &analysis, thresholds: &thresholds };
            let gate = DEFAULT_GATES.iter().find(|g| g.name == name).unwrap();
            let rejection = gate.run(&input).unwrap_err();
            assert_eq!(rejection.gate(), name);
        }
    }

    #[test]
    fn test_analysis_gates() {
        let thresholds = TradeThresholds::default();
        let snapshot = passing_snapshot();

        let mut bearish = passing_analysis();
        bearish.sentiment = Sentiment::Bearish;
        let input = GateInput { snapshot: &snapshot, analysis: &bearish, thresholds: &thresholds };
        assert_eq!(run_gates(&DEFAULT_GATES, &input), Err(Rejection::BearishSentiment));

        let mut critical = passing_analysis();
        critical.quant.risk_level = RiskLevel::Critical;
        let input = GateInput { snapshot: &snapshot, analysis: &critical, thresholds: &thresholds };
        assert_eq!(run_gates(&DEFAULT_GATES, &input), Err(Rejection::CriticalRisk));

        let mut weak = passing_analysis();
        weak.quant.buy_pressure = 54.9;
        let input = GateInput { snapshot: &snapshot, analysis: &weak, thresholds: &thresholds };
        assert_eq!(
            run_gates(&DEFAULT_GATES, &input),
            Err(Rejection::WeakBuyPressure { observed: 54.9, floor: 55.0 })
        );
    }

    #[test]
    fn test_floors_are_inclusive_caps_are_exclusive() {
        let thresholds = TradeThresholds::default();
        let analysis = passing_analysis();
        let snapshot = Snapshot {
            volume_24h: 500.0,
            liquidity: 1_000.0,
            holder_count: 5,
            top10_holding: 70.0,
            creator_holding: 40.0,
            snipers_holding: 30.0,
            ..passing_snapshot()
        };
        let input = GateInput { snapshot: &snapshot, analysis: &analysis, thresholds: &thresholds };
        assert!(run_gates(&DEFAULT_GATES, &input).is_ok());
    }

    #[test]
    fn test_first_failing_gate_wins() {
        let thresholds = TradeThresholds::default();
        let analysis = AnalysisResult {
            sentiment: Sentiment::Bearish,
            ..passing_analysis()
        };
        // Fails volume, holders, sentiment and top10; volume comes first
        let snapshot = Snapshot {
            volume_24h: 100.0,
            holder_count: 1,
            top10_holding: 95.0,
            ..passing_snapshot()
        };
        let input = GateInput { snapshot: &snapshot, analysis: &analysis, thresholds: &thresholds };
        let rejection = run_gates(&DEFAULT_GATES, &input).unwrap_err();
        assert_eq!(rejection.gate(), "volume_floor");
    }

    #[test]
    fn test_default_gate_order() {
        let names: Vec<&str> = DEFAULT_GATES.iter().map(|g| g.name).collect();
        assert_eq!(
            names,
            vec![
                "bonding_complete",
                "price",
                "volume_floor",
                "liquidity_floor",
                "holder_floor",
                "sentiment",
                "risk_level",
                "buy_pressure",
                "top10_cap",
                "creator_cap",
                "sniper_cap",
            ]
        );
    }
}
