//! Pump Studio Wire Types
//!
//! Request and response bodies of the Pump Studio REST API. Every numeric
//! field the server may omit or send as `null` is optional here and is
//! sanitized when converted into a domain type.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::{
    finite_or, AnalysisResult, CatalogItem, MarketTab, QuantMetrics, Sentiment, Snapshot,
    SubmissionAck,
};
use crate::ports::{PaperFill, PaperHolding, PaperOrder, PaperPortfolio};

/// `{ ok, data, error }` envelope used by the GET endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub ok: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Market listing entry
#[derive(Debug, Clone, Deserialize)]
pub struct MarketToken {
    #[serde(default)]
    pub mint: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl MarketToken {
    pub fn into_item(self, tab: MarketTab) -> CatalogItem {
        CatalogItem {
            mint: self.mint,
            symbol: self.symbol,
            name: self.name,
            tab,
        }
    }
}

/// Per-token metrics ("DataPoint")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    #[serde(default)]
    pub mint: Option<String>,
    pub price_usd: Option<f64>,
    pub volume_24h: Option<f64>,
    pub liquidity: Option<f64>,
    pub holder_count: Option<f64>,
    pub bonding_progress: Option<f64>,
    pub bonding_complete: Option<bool>,
    pub top10_holding: Option<f64>,
    pub creator_holding: Option<f64>,
    pub snipers_holding: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_change_1h: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub buys_24h: Option<f64>,
    pub sells_24h: Option<f64>,
    pub volume_change_24h: Option<f64>,
}

fn count(value: Option<f64>) -> u64 {
    finite_or(value, 0.0).max(0.0).round() as u64
}

impl DataPoint {
    /// Sanitized snapshot; `mint` is used when the payload omits it
    pub fn into_snapshot(self, mint: &str) -> Snapshot {
        Snapshot {
            mint: self.mint.filter(|m| !m.is_empty()).unwrap_or_else(|| mint.to_string()),
            price_usd: finite_or(self.price_usd, 0.0),
            volume_24h: finite_or(self.volume_24h, 0.0),
            liquidity: finite_or(self.liquidity, 0.0),
            holder_count: count(self.holder_count),
            bonding_progress: finite_or(self.bonding_progress, 0.0),
            bonding_complete: self.bonding_complete.unwrap_or(false),
            top10_holding: finite_or(self.top10_holding, 0.0),
            creator_holding: finite_or(self.creator_holding, 0.0),
            snipers_holding: finite_or(self.snipers_holding, 0.0),
            market_cap: finite_or(self.market_cap, 0.0),
            price_change_1h: finite_or(self.price_change_1h, 0.0),
            price_change_24h: finite_or(self.price_change_24h, 0.0),
            buys_24h: count(self.buys_24h),
            sells_24h: count(self.sells_24h),
            volume_change_24h: finite_or(self.volume_change_24h, 0.0),
        }
    }

    /// Wire form of a snapshot, echoed back with a submission
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            mint: Some(snapshot.mint.clone()),
            price_usd: Some(snapshot.price_usd),
            volume_24h: Some(snapshot.volume_24h),
            liquidity: Some(snapshot.liquidity),
            holder_count: Some(snapshot.holder_count as f64),
            bonding_progress: Some(snapshot.bonding_progress),
            bonding_complete: Some(snapshot.bonding_complete),
            top10_holding: Some(snapshot.top10_holding),
            creator_holding: Some(snapshot.creator_holding),
            snipers_holding: Some(snapshot.snipers_holding),
            market_cap: Some(snapshot.market_cap),
            price_change_1h: Some(snapshot.price_change_1h),
            price_change_24h: Some(snapshot.price_change_24h),
            buys_24h: Some(snapshot.buys_24h as f64),
            sells_24h: Some(snapshot.sells_24h as f64),
            volume_change_24h: Some(snapshot.volume_change_24h),
        }
    }
}

/// Body of `POST /api/v1/analysis/submit`
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    pub mint: String,
    pub sentiment: Sentiment,
    pub score: f64,
    pub summary: String,
    pub snapshot: DataPoint,
    pub quant: QuantMetrics,
}

impl SubmissionPayload {
    pub fn new(item: &CatalogItem, snapshot: &Snapshot, analysis: &AnalysisResult) -> Self {
        Self {
            mint: item.mint.clone(),
            sentiment: analysis.sentiment,
            score: analysis.score,
            summary: analysis.summary.clone(),
            snapshot: DataPoint::from_snapshot(snapshot),
            quant: analysis.quant.clone(),
        }
    }
}

/// Response of `POST /api/v1/analysis/submit`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    #[serde(default)]
    pub ok: bool,
    pub xp_earned: Option<f64>,
    pub validated: Option<bool>,
    pub deviation_pct: Option<f64>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

impl From<SubmitResult> for SubmissionAck {
    fn from(result: SubmitResult) -> Self {
        SubmissionAck {
            accepted: result.ok,
            reward: result.xp_earned.filter(|xp| xp.is_finite()),
            validated: result.validated,
            deviation_pct: result.deviation_pct.filter(|d| d.is_finite()),
            warning: result.warning,
            error: result.error,
        }
    }
}

/// Body of `POST /api/v1/paper/trade`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperTradePayload {
    pub mint: String,
    pub symbol: String,
    pub side: &'static str,
    pub strategy: String,
    pub sol_amount: f64,
    pub reason: String,
    pub risk_factors: Vec<String>,
}

impl From<&PaperOrder> for PaperTradePayload {
    fn from(order: &PaperOrder) -> Self {
        Self {
            mint: order.mint.clone(),
            symbol: order.symbol.clone(),
            side: "buy",
            strategy: order.strategy.to_string(),
            sol_amount: order.sol_amount.to_f64().unwrap_or(0.0),
            reason: order.reason.clone(),
            risk_factors: order.risk_factors.clone(),
        }
    }
}

/// Response of `POST /api/v1/paper/trade`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperTradeResult {
    #[serde(default)]
    pub ok: bool,
    pub trade_id: Option<String>,
    pub price_usd: Option<f64>,
    pub error: Option<String>,
}

impl From<PaperTradeResult> for PaperFill {
    fn from(result: PaperTradeResult) -> Self {
        PaperFill {
            trade_id: result.trade_id,
            price_usd: result.price_usd.filter(|p| p.is_finite()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperHoldingDto {
    #[serde(default)]
    pub mint: String,
    #[serde(default)]
    pub symbol: String,
    pub strategy: Option<String>,
    pub sol_invested: Option<f64>,
    pub pnl_pct: Option<f64>,
}

/// `data` of `GET /api/v1/paper/portfolio`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperPortfolioDto {
    pub balance_sol: Option<f64>,
    pub total_pnl_sol: Option<f64>,
    #[serde(default)]
    pub holdings: Vec<PaperHoldingDto>,
}

impl From<PaperPortfolioDto> for PaperPortfolio {
    fn from(dto: PaperPortfolioDto) -> Self {
        PaperPortfolio {
            balance_sol: finite_or(dto.balance_sol, 0.0),
            total_pnl_sol: finite_or(dto.total_pnl_sol, 0.0),
            holdings: dto
                .holdings
                .into_iter()
                .map(|h| PaperHolding {
                    mint: h.mint,
                    symbol: h.symbol,
                    strategy: h.strategy,
                    sol_invested: finite_or(h.sol_invested, 0.0),
                    pnl_pct: h.pnl_pct.filter(|p| p.is_finite()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PaperStrategy, RiskLevel, TrendDirection, VolumeProfile};
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_envelope_parsing() {
        let json = r#"{"ok":true,"data":[{"mint":"abc","symbol":"FOO","name":"Foo","price":1.2},{"mint":"def","symbol":"BAR"}]}"#;
        let envelope: ApiEnvelope<Vec<MarketToken>> = serde_json::from_str(json).unwrap();
        assert!(envelope.ok);

        let items: Vec<CatalogItem> = envelope
            .data
            .unwrap()
            .into_iter()
            .map(|t| t.into_item(MarketTab::New))
            .collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name.as_deref(), Some("Foo"));
        assert_eq!(items[1].tab, MarketTab::New);
    }

    #[test]
    fn test_data_point_sanitized() {
        let json = r#"{
            "priceUsd": 0.0004,
            "volume24h": 1500.5,
            "liquidity": null,
            "holderCount": 42,
            "bondingProgress": 77.5,
            "bondingComplete": false,
            "top10Holding": 35.0
        }"#;
        let dp: DataPoint = serde_json::from_str(json).unwrap();
        let snapshot = dp.into_snapshot("mint1");

        assert_eq!(snapshot.mint, "mint1");
        assert_eq!(snapshot.price_usd, 0.0004);
        assert_eq!(snapshot.liquidity, 0.0);
        assert_eq!(snapshot.holder_count, 42);
        assert_eq!(snapshot.bonding_progress, 77.5);
        assert_eq!(snapshot.creator_holding, 0.0);
        assert!(!snapshot.bonding_complete);
    }

    #[test]
    fn test_data_point_negative_count_clamped() {
        let dp = DataPoint {
            holder_count: Some(-3.0),
            buys_24h: Some(f64::NAN),
            ..Default::default()
        };
        let snapshot = dp.into_snapshot("m");
        assert_eq!(snapshot.holder_count, 0);
        assert_eq!(snapshot.buys_24h, 0);
    }

    #[test]
    fn test_submission_payload_shape() {
        let item = CatalogItem::new("mint1", "FOO", MarketTab::All);
        let snapshot = Snapshot {
            mint: "mint1".to_string(),
            volume_24h: 900.0,
            holder_count: 12,
            ..Default::default()
        };
        let analysis = AnalysisResult {
            sentiment: Sentiment::Neutral,
            score: 51.0,
            summary: "flat".to_string(),
            quant: QuantMetrics {
                buy_pressure: 50.0,
                risk_level: RiskLevel::Medium,
                volume_profile: VolumeProfile::Stable,
                trend_direction: TrendDirection::Flat,
                risk_factors: vec![],
            },
        };

        let value = serde_json::to_value(SubmissionPayload::new(&item, &snapshot, &analysis)).unwrap();
        assert_eq!(value["mint"], "mint1");
        assert_eq!(value["sentiment"], "neutral");
        assert_eq!(value["snapshot"]["volume24h"], 900.0);
        assert_eq!(value["snapshot"]["holderCount"], 12.0);
        assert_eq!(value["quant"]["riskLevel"], "medium");
    }

    #[test]
    fn test_submit_result_to_ack() {
        let json = r#"{"ok":true,"xpEarned":15,"validated":true,"deviationPct":4.2,"warning":"late"}"#;
        let ack: SubmissionAck = serde_json::from_str::<SubmitResult>(json).unwrap().into();
        assert!(ack.accepted);
        assert_eq!(ack.reward, Some(15.0));
        assert_eq!(ack.validated, Some(true));
        assert_eq!(ack.warning.as_deref(), Some("late"));

        let json = r#"{"ok":false,"error":"already analyzed"}"#;
        let ack: SubmissionAck = serde_json::from_str::<SubmitResult>(json).unwrap().into();
        assert!(!ack.accepted);
        assert_eq!(ack.error.as_deref(), Some("already analyzed"));
    }

    #[test]
    fn test_paper_trade_payload() {
        let order = PaperOrder {
            mint: "mint1".to_string(),
            symbol: "FOO".to_string(),
            strategy: PaperStrategy::Sniper,
            sol_amount: dec!(2),
            reason: "bonding 12%, early sniper (3/5 signals)".to_string(),
            risk_factors: vec!["low_holders".to_string()],
        };
        let value = serde_json::to_value(PaperTradePayload::from(&order)).unwrap();
        assert_eq!(value["solAmount"], 2.0);
        assert_eq!(value["strategy"], "sniper");
        assert_eq!(value["side"], "buy");
        assert_eq!(value["riskFactors"][0], "low_holders");
    }

    #[test]
    fn test_portfolio_parsing() {
        let json = r#"{"ok":true,"data":{"balanceSol":88.5,"totalPnlSol":-1.5,"holdings":[{"mint":"m","symbol":"S","strategy":"graduation","solInvested":10,"pnlPct":null}]}}"#;
        let envelope: ApiEnvelope<PaperPortfolioDto> = serde_json::from_str(json).unwrap();
        let portfolio: PaperPortfolio = envelope.data.unwrap().into();
        assert_eq!(portfolio.balance_sol, 88.5);
        assert_eq!(portfolio.holdings.len(), 1);
        assert_eq!(portfolio.holdings[0].sol_invested, 10.0);
        assert!(portfolio.holdings[0].pnl_pct.is_none());
    }
}
