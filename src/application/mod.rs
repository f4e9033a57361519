//! Application Layer - Use cases
//!
//! - `RankSession`: pipelined discover/fetch/analyze/submit loop
//! - `Lookahead`: single-slot prefetch stage used by the session

pub mod lookahead;
pub mod rank_session;

pub use lookahead::Lookahead;
pub use rank_session::{cooldown_for_quota, PartitionOutcome, RankSession, SessionConfig, SessionReport};
