//! Recording mocks for the catalog, analyzer and paper desk ports
//!
//! Scripted responses and optional latencies; every call is recorded with
//! the (tokio) instant it started so pipeline timing can be asserted under a
//! paused clock.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::{
    AnalysisResult, CatalogItem, MarketTab, QuantMetrics, RiskLevel, Sentiment, Snapshot,
    SubmissionAck, TrendDirection, VolumeProfile,
};
use crate::ports::analyzer::Analyzer;
use crate::ports::catalog::{CatalogError, CatalogPort};
use crate::ports::paper_desk::{PaperDeskError, PaperDeskPort, PaperFill, PaperOrder, PaperPortfolio};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded catalog call
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    Discover { tab: MarketTab, limit: usize },
    Fetch { mint: String },
    Submit { mint: String },
}

/// Snapshot that passes every default trade gate (momentum tier)
pub fn tradeable_snapshot(mint: &str) -> Snapshot {
    Snapshot {
        mint: mint.to_string(),
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

/// Mock catalog that records calls and serves scripted responses
#[derive(Debug, Default)]
pub struct MockCatalog {
    calls: Arc<Mutex<Vec<(CatalogCall, Instant)>>>,
    markets: HashMap<MarketTab, Result<Vec<CatalogItem>, String>>,
    snapshots: HashMap<String, Snapshot>,
    fetch_errors: HashSet<String>,
    fetch_panics: HashSet<String>,
    submit_errors: HashSet<String>,
    unaccepted: HashMap<String, String>,
    fetch_latency: Duration,
    submit_latency: Duration,
    reward: f64,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            reward: 10.0,
            ..Default::default()
        }
    }

    /// Serve `mints` (in order) when `tab` is discovered
    pub fn with_market(mut self, tab: MarketTab, mints: &[&str]) -> Self {
        let items = mints
            .iter()
            .map(|mint| CatalogItem::new(*mint, mint.to_uppercase(), tab))
            .collect();
        self.markets.insert(tab, Ok(items));
        self
    }

    pub fn with_discovery_error(mut self, tab: MarketTab, reason: &str) -> Self {
        self.markets.insert(tab, Err(reason.to_string()));
        self
    }

    /// Serve a specific snapshot; unknown mints get `tradeable_snapshot`
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshots.insert(snapshot.mint.clone(), snapshot);
        self
    }

    pub fn with_fetch_error(mut self, mint: &str) -> Self {
        self.fetch_errors.insert(mint.to_string());
        self
    }

    pub fn with_fetch_panic(mut self, mint: &str) -> Self {
        self.fetch_panics.insert(mint.to_string());
        self
    }

    pub fn with_submit_error(mut self, mint: &str) -> Self {
        self.submit_errors.insert(mint.to_string());
        self
    }

    /// Answer submissions for `mint` with `accepted == false`
    pub fn with_unaccepted(mut self, mint: &str, error: &str) -> Self {
        self.unaccepted.insert(mint.to_string(), error.to_string());
        self
    }

    pub fn with_latency(mut self, fetch: Duration, submit: Duration) -> Self {
        self.fetch_latency = fetch;
        self.submit_latency = submit;
        self
    }

    pub fn with_reward(mut self, reward: f64) -> Self {
        self.reward = reward;
        self
    }

    /// All recorded calls, in call order
    pub fn calls(&self) -> Vec<CatalogCall> {
        lock(&self.calls).iter().map(|(call, _)| call.clone()).collect()
    }

    /// Mints submitted, in submission order
    pub fn submitted_mints(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|(call, _)| match call {
                CatalogCall::Submit { mint } => Some(mint.clone()),
                _ => None,
            })
            .collect()
    }

    /// Start instants of every submission
    pub fn submission_times(&self) -> Vec<Instant> {
        lock(&self.calls)
            .iter()
            .filter(|(call, _)| matches!(call, CatalogCall::Submit { .. }))
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn discover_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|(call, _)| matches!(call, CatalogCall::Discover { .. }))
            .count()
    }

    fn record(&self, call: CatalogCall) {
        lock(&self.calls).push((call, Instant::now()));
    }
}

#[async_trait]
impl CatalogPort for MockCatalog {
    async fn discover(&self, tab: MarketTab, limit: usize) -> Result<Vec<CatalogItem>, CatalogError> {
        self.record(CatalogCall::Discover { tab, limit });
        match self.markets.get(&tab) {
            Some(Ok(items)) => Ok(items.iter().take(limit).cloned().collect()),
            Some(Err(reason)) => Err(CatalogError::Discovery {
                tab,
                reason: reason.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_snapshot(&self, mint: &str) -> Result<Snapshot, CatalogError> {
        self.record(CatalogCall::Fetch { mint: mint.to_string() });
        if !self.fetch_latency.is_zero() {
            tokio::time::sleep(self.fetch_latency).await;
        }
        if self.fetch_panics.contains(mint) {
            panic!("scripted fetch panic for {}", mint);
        }
        if self.fetch_errors.contains(mint) {
            return Err(CatalogError::Fetch {
                mint: mint.to_string(),
                reason: "scripted fetch failure".to_string(),
            });
        }
        Ok(self
            .snapshots
            .get(mint)
            .cloned()
            .unwrap_or_else(|| tradeable_snapshot(mint)))
    }

    async fn submit(
        &self,
        item: &CatalogItem,
        _snapshot: &Snapshot,
        _analysis: &AnalysisResult,
    ) -> Result<SubmissionAck, CatalogError> {
        self.record(CatalogCall::Submit { mint: item.mint.clone() });
        if !self.submit_latency.is_zero() {
            tokio::time::sleep(self.submit_latency).await;
        }
        if self.submit_errors.contains(&item.mint) {
            return Err(CatalogError::Submission {
                mint: item.mint.clone(),
                reason: "scripted submission failure".to_string(),
            });
        }
        if let Some(error) = self.unaccepted.get(&item.mint) {
            return Ok(SubmissionAck::unaccepted(error.clone()));
        }
        Ok(SubmissionAck::accepted(self.reward))
    }
}

/// Analyzer returning the same result for every snapshot
#[derive(Debug, Clone)]
pub struct FixedAnalyzer {
    result: AnalysisResult,
}

impl FixedAnalyzer {
    pub fn new(result: AnalysisResult) -> Self {
        Self { result }
    }

    /// Bullish, rising, up-trending result that passes every analysis gate
    pub fn bullish() -> Self {
        Self::new(AnalysisResult {
            sentiment: Sentiment::Bullish,
            score: 75.0,
            summary: "fixed bullish analysis".to_string(),
            quant: QuantMetrics {
                buy_pressure: 80.0,
                risk_level: RiskLevel::Low,
                volume_profile: VolumeProfile::Rising,
                trend_direction: TrendDirection::Up,
                risk_factors: Vec::new(),
            },
        })
    }

    pub fn bearish() -> Self {
        let mut fixed = Self::bullish();
        fixed.result.sentiment = Sentiment::Bearish;
        fixed.result.score = 20.0;
        fixed
    }
}

impl Analyzer for FixedAnalyzer {
    fn name(&self) -> &str {
        "fixed"
    }

    fn analyze(&self, _snapshot: &Snapshot) -> AnalysisResult {
        self.result.clone()
    }
}

/// Mock paper desk that records every order
#[derive(Debug, Default)]
pub struct MockPaperDesk {
    orders: Arc<Mutex<Vec<PaperOrder>>>,
    reject_with: Option<String>,
    portfolio: PaperPortfolio,
}

impl MockPaperDesk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every order with `reason`
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn with_portfolio(mut self, portfolio: PaperPortfolio) -> Self {
        self.portfolio = portfolio;
        self
    }

    pub fn orders(&self) -> Vec<PaperOrder> {
        lock(&self.orders).clone()
    }
}

#[async_trait]
impl PaperDeskPort for MockPaperDesk {
    async fn place_order(&self, order: &PaperOrder) -> Result<PaperFill, PaperDeskError> {
        lock(&self.orders).push(order.clone());
        if let Some(reason) = &self.reject_with {
            return Err(PaperDeskError::Rejected(reason.clone()));
        }
        let trade_id = format!("paper-{}", lock(&self.orders).len());
        Ok(PaperFill {
            trade_id: Some(trade_id),
            price_usd: None,
        })
    }

    async fn portfolio(&self) -> Result<PaperPortfolio, PaperDeskError> {
        Ok(self.portfolio.clone())
    }
}
