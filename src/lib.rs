//! intern - Quant ranker for Pump Studio
//!
//! Discovers tokens on the Pump Studio market, fetches DataPoint snapshots,
//! scores them and submits the analyses for XP under a per-minute quota.
//! A pure signal engine decides, per analysis, whether a paper trade would
//! be taken.
//!
//! # Modules
//!
//! - `domain`: Core types (CatalogItem, Snapshot, AnalysisResult, TradeSignal, RecencyIndex)
//! - `ports`: Trait abstractions (CatalogPort, Analyzer, PaperDeskPort)
//! - `strategy`: Trade signal evaluator (gate cascade, bonding tiers)
//! - `adapters`: External implementations (Pump Studio, heuristic analyzer, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Rank session scheduler and lookahead stage

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
