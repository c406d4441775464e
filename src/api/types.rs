use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AuctionOutcome, TeamPersonality};

// ============================================================================
// Auction Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRequest {
    /// Only the human identity may bid through the API
    #[serde(default)]
    pub bidder: Option<String>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidResponse {
    pub accepted: bool,
    pub bidder: String,
    pub amount: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub sold: usize,
    pub unsold: usize,
    pub outcomes: Vec<AuctionOutcome>,
}

impl ResultsResponse {
    pub fn from_outcomes(outcomes: Vec<AuctionOutcome>) -> Self {
        let sold = outcomes.iter().filter(|o| o.is_sold()).count();
        Self {
            sold,
            unsold: outcomes.len() - sold,
            outcomes,
        }
    }
}

// ============================================================================
// Team Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    #[serde(flatten)]
    pub personality: TeamPersonality,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamsResponse {
    pub teams: Vec<TeamView>,
    pub human_balance: Decimal,
}

// ============================================================================
// Health Check Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub auction: String,
    pub uptime_secs: i64,
}
