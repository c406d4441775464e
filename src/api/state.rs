use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::agents::BalanceBoard;
use crate::domain::{BidderWallet, TeamPersonality};
use crate::moderator::ModeratorHandle;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// The only way into the moderator
    pub moderator: ModeratorHandle,

    /// Wallet of the single human participant
    pub human: Arc<RwLock<BidderWallet>>,

    /// Personality table of the AI franchises
    pub teams: Arc<Vec<TeamPersonality>>,

    /// Live AI balances, written by the agent runners
    pub balances: BalanceBoard,

    /// Balance shown for a team whose runner has not reported yet
    pub default_balance: Decimal,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        moderator: ModeratorHandle,
        human: BidderWallet,
        teams: Vec<TeamPersonality>,
        balances: BalanceBoard,
        default_balance: Decimal,
    ) -> Self {
        Self {
            moderator,
            human: Arc::new(RwLock::new(human)),
            teams: Arc::new(teams),
            balances,
            default_balance,
            start_time: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
