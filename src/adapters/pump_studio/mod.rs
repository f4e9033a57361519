//! Pump Studio Adapter
//!
//! REST client implementing both the catalog port (market discovery,
//! DataPoint snapshots, analysis submission) and the paper desk port.
//!
//! Endpoints:
//! - `GET  /api/v1/market?tab=&limit=&format=json`
//! - `GET  /api/v1/datapoint?mint=`
//! - `POST /api/v1/analysis/submit`
//! - `POST /api/v1/paper/trade`
//! - `GET  /api/v1/paper/portfolio`

mod client;
mod types;

pub use client::{decode_body, ApiError, PumpStudioClient, PumpStudioConfig, DEFAULT_BASE_URL};
pub use types::{
    ApiEnvelope, DataPoint, MarketToken, PaperPortfolioDto, PaperTradePayload, PaperTradeResult,
    SubmissionPayload, SubmitResult,
};
