//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Pump Studio: REST client for the catalog and the paper desk
//! - Quant: deterministic default analyzer
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod pump_studio;
pub mod quant;

pub use cli::CliApp;
pub use pump_studio::PumpStudioClient;
pub use quant::HeuristicAnalyzer;
