//! Paper Desk Port
//!
//! Remote simulated-trading desk. Accepted trade signals can be forwarded
//! here; nothing in this crate moves real funds.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CatalogItem, PaperStrategy, TradeSignal};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaperDeskError {
    #[error("Paper trade rejected: {0}")]
    Rejected(String),

    #[error("Paper desk request failed: {0}")]
    RequestFailed(String),

    #[error("Signal is not tradeable: {0}")]
    NotTradeable(String),
}

/// Paper buy derived from an accepted trade signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperOrder {
    pub mint: String,
    pub symbol: String,
    pub strategy: PaperStrategy,
    pub sol_amount: Decimal,
    pub reason: String,
    pub risk_factors: Vec<String>,
}

impl PaperOrder {
    /// Build an order from an accepted signal
    pub fn from_signal(item: &CatalogItem, signal: &TradeSignal) -> Result<Self, PaperDeskError> {
        if !signal.should_trade {
            return Err(PaperDeskError::NotTradeable(signal.reason.clone()));
        }
        let strategy = signal
            .strategy
            .ok_or_else(|| PaperDeskError::NotTradeable("missing strategy".to_string()))?;
        let size = signal
            .size
            .ok_or_else(|| PaperDeskError::NotTradeable("missing size".to_string()))?;

        Ok(Self {
            mint: item.mint.clone(),
            symbol: item.symbol.clone(),
            strategy,
            sol_amount: size.sol_amount(),
            reason: signal.reason.clone(),
            risk_factors: signal.risk_factors.clone(),
        })
    }
}

/// Desk confirmation for a placed order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaperFill {
    pub trade_id: Option<String>,
    /// Executed price in USD, when reported
    pub price_usd: Option<f64>,
}

/// One open paper position
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaperHolding {
    pub mint: String,
    pub symbol: String,
    pub strategy: Option<String>,
    pub sol_invested: f64,
    pub pnl_pct: Option<f64>,
}

/// Paper portfolio summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaperPortfolio {
    pub balance_sol: f64,
    pub total_pnl_sol: f64,
    pub holdings: Vec<PaperHolding>,
}

#[async_trait]
pub trait PaperDeskPort: Send + Sync {
    async fn place_order(&self, order: &PaperOrder) -> Result<PaperFill, PaperDeskError>;

    async fn portfolio(&self) -> Result<PaperPortfolio, PaperDeskError>;
}
