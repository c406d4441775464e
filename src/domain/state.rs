use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::player::Player;
use crate::error::{AuctionError, Result};

/// Auction lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    /// Created, waiting for `start_auction`
    Pending,
    /// A player is on the block and bids are accepted
    Active,
    /// Timer ran out (or the auction was stopped); no bids accepted
    Ended,
    /// Player queue exhausted; terminal
    Completed,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Pending => "pending",
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
            AuctionStatus::Completed => "completed",
        }
    }

    /// Check if this status can transition to another status
    pub fn can_transition_to(&self, target: AuctionStatus) -> bool {
        use AuctionStatus::*;

        match (self, target) {
            (Pending, Active) => true,

            // Timeout or hard stop
            (Active, Ended) => true,

            // Next player, or queue exhausted
            (Ended, Active) => true,
            (Ended, Completed) => true,

            _ => false,
        }
    }

    pub fn valid_transitions(&self) -> Vec<AuctionStatus> {
        use AuctionStatus::*;

        match self {
            Pending => vec![Active],
            Active => vec![Ended],
            Ended => vec![Active, Completed],
            Completed => vec![],
        }
    }

    pub fn accepts_bids(&self) -> bool {
        matches!(self, AuctionStatus::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Completed)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for AuctionStatus {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AuctionStatus::Pending),
            "active" => Ok(AuctionStatus::Active),
            "ended" => Ok(AuctionStatus::Ended),
            "completed" => Ok(AuctionStatus::Completed),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// One accepted bid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub bidder: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Bid {
    pub fn new(bidder: impl Into<String>, amount: Decimal) -> Self {
        Self {
            bidder: bidder.into(),
            amount,
            timestamp: Utc::now(),
        }
    }
}

/// Canonical auction snapshot, as published to every observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionState {
    pub status: AuctionStatus,
    pub current_player_index: usize,
    pub current_player: Option<Player>,
    pub current_bid: Decimal,
    pub current_bidder: Option<String>,
    #[serde(default)]
    pub bid_history: Vec<Bid>,
    pub timer: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuctionState {
    pub fn new() -> Self {
        Self {
            status: AuctionStatus::Pending,
            current_player_index: 0,
            current_player: None,
            current_bid: Decimal::ZERO,
            current_bidder: None,
            bid_history: Vec::new(),
            timer: 0,
            error: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.accepts_bids()
    }

    pub fn last_bid(&self) -> Option<&Bid> {
        self.bid_history.last()
    }

    /// Schema and invariant checks for snapshots that arrive from outside
    /// the moderator (remote sync, REST replace).
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AuctionError::InvalidSnapshot(msg));

        if self.current_bid.is_sign_negative() {
            return invalid(format!("negative current bid {}", self.current_bid));
        }

        if matches!(self.status, AuctionStatus::Active | AuctionStatus::Ended)
            && self.current_player.is_none()
        {
            return invalid(format!("status {} requires a current player", self.status));
        }

        let mut floor = None;
        if let Some(player) = &self.current_player {
            player
                .validate()
                .map_err(|e| AuctionError::InvalidSnapshot(e.to_string()))?;
            if self.current_bid < player.base_price {
                return invalid(format!(
                    "current bid {} is below base price {}",
                    self.current_bid, player.base_price
                ));
            }
            floor = Some(player.base_price);
        }

        for bid in &self.bid_history {
            if bid.bidder.trim().is_empty() {
                return invalid("bid with empty bidder".into());
            }
            if let Some(prev) = floor {
                if bid.amount <= prev {
                    return invalid(format!(
                        "bid history not strictly increasing at {} (previous {})",
                        bid.amount, prev
                    ));
                }
            }
            floor = Some(bid.amount);
        }

        match (&self.current_bidder, self.bid_history.last()) {
            (None, None) => {}
            (Some(bidder), Some(last)) => {
                if *bidder != last.bidder || self.current_bid != last.amount {
                    return invalid("current bidder/bid disagree with bid history".into());
                }
            }
            (Some(_), None) => return invalid("current bidder without bid history".into()),
            (None, Some(_)) => return invalid("bid history without current bidder".into()),
        }

        Ok(())
    }
}

impl Default for AuctionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Final result for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum AuctionOutcome {
    Sold {
        player: Player,
        winner: String,
        amount: Decimal,
        #[serde(rename = "finalizedAt")]
        finalized_at: DateTime<Utc>,
    },
    Unsold {
        player: Player,
        #[serde(rename = "finalizedAt")]
        finalized_at: DateTime<Utc>,
    },
}

impl AuctionOutcome {
    /// Derive the outcome from the state at the moment bidding closed
    pub fn from_state(state: &AuctionState) -> Option<Self> {
        let player = state.current_player.clone()?;
        let finalized_at = Utc::now();
        Some(match &state.current_bidder {
            Some(winner) => AuctionOutcome::Sold {
                player,
                winner: winner.clone(),
                amount: state.current_bid,
                finalized_at,
            },
            None => AuctionOutcome::Unsold {
                player,
                finalized_at,
            },
        })
    }

    pub fn player(&self) -> &Player {
        match self {
            AuctionOutcome::Sold { player, .. } | AuctionOutcome::Unsold { player, .. } => player,
        }
    }

    pub fn is_sold(&self) -> bool {
        matches!(self, AuctionOutcome::Sold { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::PlayerRole;
    use rust_decimal_macros::dec;

    fn active_state() -> AuctionState {
        let player = Player::new("p1", "Opener", PlayerRole::Batsman, dec!(100));
        AuctionState {
            status: AuctionStatus::Active,
            current_player_index: 0,
            current_player: Some(player),
            current_bid: dec!(100),
            current_bidder: None,
            bid_history: Vec::new(),
            timer: 15,
            error: None,
        }
    }

    #[test]
    fn test_valid_transitions() {
        use AuctionStatus::*;

        assert!(Pending.can_transition_to(Active));
        assert!(Active.can_transition_to(Ended));
        assert!(Ended.can_transition_to(Active));
        assert!(Ended.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Ended));
        assert!(!Active.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(Completed.valid_transitions().is_empty());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(AuctionStatus::try_from("ACTIVE").unwrap(), AuctionStatus::Active);
        assert!(AuctionStatus::try_from("paused").is_err());
    }

    #[test]
    fn snapshot_json_field_names() {
        let json = serde_json::to_value(active_state()).unwrap();
        for key in [
            "status",
            "currentPlayerIndex",
            "currentPlayer",
            "currentBid",
            "currentBidder",
            "bidHistory",
            "timer",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["status"], "active");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn validate_accepts_consistent_history() {
        let mut state = active_state();
        state.bid_history.push(Bid::new("a", dec!(110)));
        state.bid_history.push(Bid::new("b", dec!(120)));
        state.current_bid = dec!(120);
        state.current_bidder = Some("b".into());
        state.validate().unwrap();
    }

    #[test]
    fn validate_rejects_non_increasing_history() {
        let mut state = active_state();
        state.bid_history.push(Bid::new("a", dec!(110)));
        state.bid_history.push(Bid::new("b", dec!(110)));
        state.current_bid = dec!(110);
        state.current_bidder = Some("b".into());
        assert!(matches!(
            state.validate(),
            Err(AuctionError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn validate_rejects_active_without_player() {
        let mut state = active_state();
        state.current_player = None;
        assert!(state.validate().is_err());
    }

    #[test]
    fn outcome_distinguishes_unsold() {
        let state = active_state();
        let outcome = AuctionOutcome::from_state(&state).unwrap();
        assert!(!outcome.is_sold());

        let mut sold = active_state();
        sold.bid_history.push(Bid::new("a", dec!(150)));
        sold.current_bid = dec!(150);
        sold.current_bidder = Some("a".into());
        match AuctionOutcome::from_state(&sold).unwrap() {
            AuctionOutcome::Sold { winner, amount, .. } => {
                assert_eq!(winner, "a");
                assert_eq!(amount, dec!(150));
            }
            other => panic!("expected sold, got {other:?}"),
        }
    }
}
