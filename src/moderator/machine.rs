//! Auction Moderator — the single writer of `AuctionState`
//!
//! A synchronous, tick-stepped state machine:
//!
//! ```text
//! pending → active → ended → active (next player)
//!                          ↘ completed
//! ```
//!
//! Time only moves when `tick()` is called, so tests drive the clock
//! directly and the async service calls it from a `tokio::time::interval`.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::config::ModeratorConfig;
use crate::domain::{AuctionOutcome, AuctionState, AuctionStatus, Bid, Player};
use crate::error::{AuctionError, BidRejection, Result};

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// Nothing to do (pending, completed, or stopped)
    Idle,
    /// Clock counted down; remaining seconds
    Countdown(u32),
    /// Clock hit zero and the lot closed
    Finalized(AuctionOutcome),
    /// Settle delay still running
    Settling(u32),
    /// Next player is on the block
    Advanced(usize),
    /// Queue exhausted
    Completed,
}

/// Result of moving past a closed lot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextPlayer(usize),
    Completed,
}

pub struct AuctionModerator {
    config: ModeratorConfig,
    queue: Vec<Player>,
    state: AuctionState,
    /// Ticks left before auto-advance; `None` after a hard stop
    settle_remaining: Option<u32>,
    outcomes: Vec<AuctionOutcome>,
}

impl AuctionModerator {
    pub fn new(config: ModeratorConfig, queue: Vec<Player>) -> Self {
        Self {
            config,
            queue,
            state: AuctionState::new(),
            settle_remaining: None,
            outcomes: Vec::new(),
        }
    }

    pub fn config(&self) -> &ModeratorConfig {
        &self.config
    }

    pub fn state(&self) -> &AuctionState {
        &self.state
    }

    pub fn snapshot(&self) -> AuctionState {
        self.state.clone()
    }

    pub fn queue(&self) -> &[Player] {
        &self.queue
    }

    /// Every lot closed so far, in order
    pub fn outcomes(&self) -> &[AuctionOutcome] {
        &self.outcomes
    }

    fn transition(&mut self, to: AuctionStatus) -> Result<()> {
        let from = self.state.status;
        if !from.can_transition_to(to) {
            return Err(AuctionError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        debug!(%from, %to, "auction status transition");
        self.state.status = to;
        Ok(())
    }

    /// Put `queue[index]` on the block with a fresh clock
    fn load_player(&mut self, index: usize) -> Result<()> {
        let mut player = self
            .queue
            .get(index)
            .cloned()
            .ok_or_else(|| AuctionError::Internal(format!("no player at queue index {index}")))?;
        player.current_bid = Some(player.base_price);
        player.current_bidder = None;

        self.transition(AuctionStatus::Active)?;
        self.state.current_player_index = index;
        self.state.current_bid = player.base_price;
        self.state.current_bidder = None;
        self.state.bid_history.clear();
        self.state.timer = self.config.bid_timeout_secs;
        self.state.error = None;
        info!(
            index,
            player = %player.name,
            base_price = %player.base_price,
            "player on the block"
        );
        self.state.current_player = Some(player);
        self.settle_remaining = None;
        Ok(())
    }

    /// Begin the auction with the first queued player. Only valid from `pending`.
    pub fn start_auction(&mut self) -> Result<()> {
        if self.state.status != AuctionStatus::Pending {
            return Err(AuctionError::InvalidStateTransition {
                from: self.state.status.to_string(),
                to: AuctionStatus::Active.to_string(),
            });
        }
        if self.queue.is_empty() {
            return Err(AuctionError::EmptyCatalog);
        }
        info!(players = self.queue.len(), "auction starting");
        self.load_player(0)
    }

    /// Accept or reject a bid. Rejections leave the state untouched.
    pub fn place_bid(&mut self, bidder: &str, amount: Decimal) -> std::result::Result<Bid, BidRejection> {
        if !self.state.is_active() {
            return Err(BidRejection::NotActive);
        }
        if amount <= self.state.current_bid {
            return Err(BidRejection::TooLow {
                amount,
                current: self.state.current_bid,
            });
        }

        let bid = Bid::new(bidder, amount);
        self.state.current_bid = amount;
        self.state.current_bidder = Some(bidder.to_string());
        self.state.bid_history.push(bid.clone());
        self.state.timer = self.config.bid_timeout_secs;
        if let Some(player) = self.state.current_player.as_mut() {
            player.current_bid = Some(amount);
            player.current_bidder = Some(bidder.to_string());
        }
        info!(bidder, %amount, "bid accepted");
        Ok(bid)
    }

    /// Close the current lot and schedule the move to the next player
    pub fn end_current_auction(&mut self) -> Result<AuctionOutcome> {
        self.transition(AuctionStatus::Ended)?;
        self.state.timer = 0;
        self.settle_remaining = Some(self.config.settle_ticks);
        self.finalize()
    }

    fn finalize(&mut self) -> Result<AuctionOutcome> {
        let outcome = AuctionOutcome::from_state(&self.state)
            .ok_or_else(|| AuctionError::Internal("ended lot has no player".into()))?;
        match &outcome {
            AuctionOutcome::Sold {
                player,
                winner,
                amount,
                ..
            } => info!(player = %player.name, winner = %winner, %amount, "player sold"),
            AuctionOutcome::Unsold { player, .. } => info!(player = %player.name, "player unsold"),
        }
        self.outcomes.push(outcome.clone());
        Ok(outcome)
    }

    /// Advance past a closed lot. A no-op once the auction is completed.
    pub fn move_to_next_player(&mut self) -> Result<Advance> {
        if self.state.status.is_terminal() {
            return Ok(Advance::Completed);
        }
        if self.state.status != AuctionStatus::Ended {
            return Err(AuctionError::InvalidStateTransition {
                from: self.state.status.to_string(),
                to: "next player".into(),
            });
        }

        let next = self.state.current_player_index + 1;
        if next < self.queue.len() {
            self.load_player(next)?;
            Ok(Advance::NextPlayer(next))
        } else {
            self.transition(AuctionStatus::Completed)?;
            self.settle_remaining = None;
            info!(lots = self.outcomes.len(), "auction completed");
            Ok(Advance::Completed)
        }
    }

    /// Hard cancel: close the lot now and do not auto-advance.
    ///
    /// Bids already recorded stand. Returns the outcome when a live lot was closed.
    pub fn stop_auction(&mut self) -> Result<Option<AuctionOutcome>> {
        match self.state.status {
            AuctionStatus::Active => {
                self.transition(AuctionStatus::Ended)?;
                self.state.timer = 0;
                self.settle_remaining = None;
                warn!("auction stopped");
                self.finalize().map(Some)
            }
            AuctionStatus::Ended => {
                self.settle_remaining = None;
                Ok(None)
            }
            AuctionStatus::Completed => Ok(None),
            AuctionStatus::Pending => Err(AuctionError::InvalidStateTransition {
                from: AuctionStatus::Pending.to_string(),
                to: AuctionStatus::Ended.to_string(),
            }),
        }
    }

    /// Attach a non-fatal error; status is unchanged
    pub fn handle_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "auction error recorded");
        self.state.error = Some(message);
    }

    /// Advance logical time by one second
    pub fn tick(&mut self) -> Result<TickEvent> {
        match self.state.status {
            AuctionStatus::Active => {
                self.state.timer = self.state.timer.saturating_sub(1);
                if self.state.timer == 0 {
                    return self.end_current_auction().map(TickEvent::Finalized);
                }
                Ok(TickEvent::Countdown(self.state.timer))
            }
            AuctionStatus::Ended => match self.settle_remaining {
                Some(remaining) if remaining > 1 => {
                    self.settle_remaining = Some(remaining - 1);
                    Ok(TickEvent::Settling(remaining - 1))
                }
                Some(_) => match self.move_to_next_player()? {
                    Advance::NextPlayer(index) => Ok(TickEvent::Advanced(index)),
                    Advance::Completed => Ok(TickEvent::Completed),
                },
                None => Ok(TickEvent::Idle),
            },
            AuctionStatus::Pending | AuctionStatus::Completed => Ok(TickEvent::Idle),
        }
    }

    /// Replace the canonical state with an externally supplied snapshot.
    ///
    /// Last writer wins: no merge with local changes. A snapshot that closes
    /// a lot with no recorded outcome yields that outcome, derived from the
    /// remote state.
    pub fn apply_remote(&mut self, remote: AuctionState) -> Result<Option<AuctionOutcome>> {
        remote.validate()?;
        if remote.timer > self.config.bid_timeout_secs {
            return Err(AuctionError::InvalidSnapshot(format!(
                "timer {} exceeds bid timeout {}",
                remote.timer, self.config.bid_timeout_secs
            )));
        }
        if !self.queue.is_empty()
            && matches!(remote.status, AuctionStatus::Active | AuctionStatus::Ended)
            && remote.current_player_index >= self.queue.len()
        {
            return Err(AuctionError::InvalidSnapshot(format!(
                "player index {} outside queue of {}",
                remote.current_player_index,
                self.queue.len()
            )));
        }

        let closes_lot = matches!(remote.status, AuctionStatus::Ended | AuctionStatus::Completed)
            && remote
                .current_player
                .as_ref()
                .is_some_and(|player| !self.has_outcome(&player.id));

        self.settle_remaining = match remote.status {
            AuctionStatus::Ended => Some(self.config.settle_ticks),
            _ => None,
        };
        info!(status = %remote.status, index = remote.current_player_index, "remote state applied");
        self.state = remote;

        if closes_lot {
            self.finalize().map(Some)
        } else {
            Ok(None)
        }
    }

    fn has_outcome(&self, player_id: &str) -> bool {
        self.outcomes.iter().any(|o| o.player().id == player_id)
    }
}
