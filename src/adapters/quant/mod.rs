//! Quant Analyzer Adapter
//!
//! Deterministic local analyzer used when no external model is configured.

mod analyzer;

pub use analyzer::{HeuristicAnalyzer, HeuristicConfig, NEUTRAL_BUY_PRESSURE};
