//! Submission acknowledgement

use serde::{Deserialize, Serialize};

/// Result of submitting an analysis upstream
///
/// A successful round trip can still be unaccepted (`accepted == false`),
/// in which case `error` carries the server's explanation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub accepted: bool,
    /// Reward earned (XP)
    pub reward: Option<f64>,
    /// Whether the server cross-validated the analysis
    pub validated: Option<bool>,
    /// Deviation from the server's own analysis (%)
    pub deviation_pct: Option<f64>,
    /// Non-fatal validation warning
    pub warning: Option<String>,
    pub error: Option<String>,
}

impl SubmissionAck {
    pub fn accepted(reward: f64) -> Self {
        Self {
            accepted: true,
            reward: Some(reward),
            ..Default::default()
        }
    }

    pub fn unaccepted(error: impl Into<String>) -> Self {
        Self {
            accepted: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Reward for accounting: 0 when absent or unaccepted
    pub fn reward_or_zero(&self) -> f64 {
        if !self.accepted {
            return 0.0;
        }
        self.reward.filter(|r| r.is_finite()).unwrap_or(0.0)
    }
}
