//! Strategy Layer - Paper-trade signal engine
//!
//! Decides whether a paper trade should be taken on a token:
//! - Ordered gate cascade (eligibility, sentiment/risk, buy pressure, concentration)
//! - Bonding-progress tier selection (graduation, momentum, sniper)
//! - Configurable thresholds with the production defaults
//!
//! Everything here is pure; no I/O and no clock.

pub mod gates;
pub mod params;
pub mod trade_evaluator;

pub use gates::{run_gates, Gate, GateInput, DEFAULT_GATES};
pub use params::{ThresholdError, TradeThresholds};
pub use trade_evaluator::TradeEvaluator;
