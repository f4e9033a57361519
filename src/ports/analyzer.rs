//! Analyzer Port
//!
//! Scoring is an external collaborator: a pure, deterministic function from a
//! snapshot to an analysis result. The pipeline and the trade evaluator only
//! rely on this contract.

use crate::domain::{AnalysisResult, Snapshot};

pub trait Analyzer: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Score a snapshot. Must be deterministic for identical input.
    fn analyze(&self, snapshot: &Snapshot) -> AnalysisResult;
}
