//! Market Domain Types
//!
//! Catalog partitions, discovered items and per-item metric snapshots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Catalog partition a token is discovered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTab {
    All,
    Live,
    New,
    Graduated,
}

impl MarketTab {
    /// Query-string value used by the market endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketTab::All => "all",
            MarketTab::Live => "live",
            MarketTab::New => "new",
            MarketTab::Graduated => "graduated",
        }
    }
}

impl fmt::Display for MarketTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(MarketTab::All),
            "live" => Ok(MarketTab::Live),
            "new" => Ok(MarketTab::New),
            "graduated" => Ok(MarketTab::Graduated),
            other => Err(format!(
                "unknown market tab '{}' (expected all, live, new or graduated)",
                other
            )),
        }
    }
}

/// A token discovered in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Token mint address (opaque identifier)
    pub mint: String,
    /// Display symbol
    pub symbol: String,
    /// Display name, when the catalog provides one
    pub name: Option<String>,
    /// Partition the token was discovered under
    pub tab: MarketTab,
}

impl CatalogItem {
    pub fn new(mint: impl Into<String>, symbol: impl Into<String>, tab: MarketTab) -> Self {
        Self {
            mint: mint.into(),
            symbol: symbol.into(),
            name: None,
            tab,
        }
    }

    /// Short mint prefix for log lines
    pub fn short_mint(&self) -> &str {
        let end = self
            .mint
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.mint.len());
        &self.mint[..end]
    }
}

/// Per-token metrics at fetch time ("DataPoint")
///
/// All values are sanitized on construction from the wire: missing or
/// non-finite numbers become 0. Percentages are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Token mint address
    pub mint: String,
    /// Price in USD
    pub price_usd: f64,
    /// 24h traded volume in USD
    pub volume_24h: f64,
    /// Pool liquidity in USD
    pub liquidity: f64,
    /// Number of holders
    pub holder_count: u64,
    /// Bonding curve progress (0-100)
    pub bonding_progress: f64,
    /// Whether the bonding curve has completed (token graduated)
    pub bonding_complete: bool,
    /// Supply share held by the top 10 holders (%)
    pub top10_holding: f64,
    /// Supply share held by the creator (%)
    pub creator_holding: f64,
    /// Supply share held by snipers (%)
    pub snipers_holding: f64,
    /// Market cap in USD
    pub market_cap: f64,
    /// 1h price change (%)
    pub price_change_1h: f64,
    /// 24h price change (%)
    pub price_change_24h: f64,
    /// Buy transactions in the last 24h
    pub buys_24h: u64,
    /// Sell transactions in the last 24h
    pub sells_24h: u64,
    /// 24h volume change (%)
    pub volume_change_24h: f64,
}

/// Coerce a possibly-missing or non-finite metric to a usable number
pub fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}
