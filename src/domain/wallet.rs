use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::team::TeamPersonality;
use crate::error::{AuctionError, Result};

/// Identity used for the single human participant
pub const HUMAN_BIDDER: &str = "human";

/// Spending wallet of one bidder. Only the owning agent (or the human bid
/// path) ever debits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderWallet {
    pub address: String,
    pub balance: Decimal,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<TeamPersonality>,
}

impl BidderWallet {
    pub fn for_team(personality: TeamPersonality, balance: Decimal) -> Self {
        Self {
            address: personality.wallet.clone(),
            balance,
            is_ai: true,
            personality: Some(personality),
        }
    }

    pub fn human(balance: Decimal) -> Self {
        Self {
            address: HUMAN_BIDDER.to_string(),
            balance,
            is_ai: false,
            personality: None,
        }
    }

    pub fn can_afford(&self, amount: Decimal) -> bool {
        amount <= self.balance
    }

    /// Debit an accepted bid. Never lets the balance go negative.
    pub fn debit(&mut self, amount: Decimal) -> Result<()> {
        if amount.is_sign_negative() {
            return Err(AuctionError::Validation(format!(
                "cannot debit negative amount {amount}"
            )));
        }
        if !self.can_afford(amount) {
            return Err(AuctionError::InsufficientBalance {
                balance: self.balance,
                amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}
