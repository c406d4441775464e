//! BiddingAgent — one AI franchise's wallet, books and bid flow

use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::adapters::FundsTransfer;
use crate::domain::{Bid, BidderWallet, Player, TeamPersonality};
use crate::strategy::{assess, calculate_bid_amount, Verdict};

/// Why an agent passed on a lot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    NoPlayer,
    /// Fit score below the strategy threshold
    PoorFit { score: Decimal, threshold: Decimal },
    /// Balance cannot carry the current price plus buffer
    OverBudget,
    /// Wanted in, but the spending cap leaves no room to raise
    CannotAfford,
    TransferFailed(String),
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::NoPlayer => write!(f, "no player on the block"),
            DeclineReason::PoorFit { score, threshold } => write!(
                f,
                "doesn't fit strategy (score {} < threshold {})",
                score.round_dp(2),
                threshold.round_dp(2)
            ),
            DeclineReason::OverBudget => write!(f, "bid exceeds budget"),
            DeclineReason::CannotAfford => write!(f, "cannot afford"),
            DeclineReason::TransferFailed(e) => write!(f, "transfer failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidOutcome {
    AlreadyLeading,
    Declined(DeclineReason),
    Accepted {
        amount: Decimal,
        transaction_ref: Option<String>,
    },
}

impl BidOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BidOutcome::Accepted { .. })
    }
}

pub struct BiddingAgent {
    wallet: BidderWallet,
    history: Vec<Bid>,
    transfer: Arc<dyn FundsTransfer>,
}

impl BiddingAgent {
    pub fn new(personality: TeamPersonality, balance: Decimal, transfer: Arc<dyn FundsTransfer>) -> Self {
        Self {
            wallet: BidderWallet::for_team(personality, balance),
            history: Vec::new(),
            transfer,
        }
    }

    pub fn address(&self) -> &str {
        &self.wallet.address
    }

    pub fn wallet(&self) -> &BidderWallet {
        &self.wallet
    }

    pub fn balance(&self) -> Decimal {
        self.wallet.balance
    }

    /// Bids this agent has had confirmed
    pub fn history(&self) -> &[Bid] {
        &self.history
    }

    pub fn team_name(&self) -> &str {
        self.wallet
            .personality
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(self.wallet.address.as_str())
    }

    /// Decide, size and submit a bid for the lot on the block.
    ///
    /// Balance and history change only after the transfer confirms.
    pub async fn evaluate_and_bid(
        &mut self,
        player: Option<&Player>,
        current_bid: Decimal,
        current_bidder: Option<&str>,
    ) -> BidOutcome {
        if current_bidder == Some(self.wallet.address.as_str()) {
            return BidOutcome::AlreadyLeading;
        }

        let Some(assessment) = assess(current_bid, &self.wallet, player) else {
            let reason = if player.is_none() {
                DeclineReason::NoPlayer
            } else {
                DeclineReason::OverBudget
            };
            return BidOutcome::Declined(reason);
        };

        match assessment.verdict {
            Verdict::Bid => {}
            Verdict::PoorFit => {
                return BidOutcome::Declined(DeclineReason::PoorFit {
                    score: assessment.match_score,
                    threshold: assessment.threshold,
                })
            }
            Verdict::OverBudget => return BidOutcome::Declined(DeclineReason::OverBudget),
        }

        let Some(amount) =
            calculate_bid_amount(current_bid, &self.wallet, player, assessment.match_score)
        else {
            return BidOutcome::Declined(DeclineReason::CannotAfford);
        };
        if !self.wallet.can_afford(amount) {
            return BidOutcome::Declined(DeclineReason::CannotAfford);
        }

        debug!(
            team = self.team_name(),
            score = %assessment.match_score,
            threshold = %assessment.threshold,
            %amount,
            "submitting bid"
        );

        let receipt = match self.transfer.submit_bid(&self.wallet.address, amount).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(team = self.team_name(), error = %e, "transfer unreachable");
                return BidOutcome::Declined(DeclineReason::TransferFailed(e.to_string()));
            }
        };
        if !receipt.success {
            let reason = receipt.error.unwrap_or_else(|| "transfer refused".into());
            debug!(team = self.team_name(), reason = %reason, "transfer not confirmed");
            return BidOutcome::Declined(DeclineReason::TransferFailed(reason));
        }

        if let Err(e) = self.wallet.debit(amount) {
            error!(team = self.team_name(), error = %e, "confirmed bid could not be debited");
        }
        self.history.push(Bid::new(self.wallet.address.clone(), amount));
        info!(
            team = self.team_name(),
            %amount,
            balance = %self.wallet.balance,
            "bid confirmed"
        );

        BidOutcome::Accepted {
            amount,
            transaction_ref: receipt.transaction_ref,
        }
    }
}
