//! Domain Layer - Core types for the quant ranker
//!
//! Pure data types with no I/O. All external interactions happen through the
//! ports layer.
//!
//! - `market`: catalog partitions, discovered items, metric snapshots
//! - `analysis`: analyzer output contract
//! - `submission`: upstream acknowledgement of a submitted analysis
//! - `signal`: paper-trade decision records and position size tiers
//! - `recency`: freshness index used to avoid re-processing tokens

pub mod analysis;
pub mod market;
pub mod recency;
pub mod signal;
pub mod submission;

pub use analysis::{AnalysisResult, QuantMetrics, RiskLevel, Sentiment, TrendDirection, VolumeProfile};
pub use market::{finite_or, CatalogItem, MarketTab, Snapshot};
pub use recency::RecencyIndex;
pub use signal::{PaperStrategy, PositionSize, Rejection, TradeSignal, MAX_CARRIED_RISK_FACTORS};
pub use submission::SubmissionAck;
