//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The remote catalog (discovery, snapshots, submissions)
//! - The analyzer that scores snapshots
//! - The paper trading desk
//!
//! `mocks` holds recording implementations used by the test suites.

pub mod analyzer;
pub mod catalog;
pub mod mocks;
pub mod paper_desk;

pub use analyzer::Analyzer;
pub use catalog::{CatalogError, CatalogPort};
pub use paper_desk::{PaperDeskError, PaperDeskPort, PaperFill, PaperHolding, PaperOrder, PaperPortfolio};
