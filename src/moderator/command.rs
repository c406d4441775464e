//! Moderator Commands — requests sent to the moderator task

use rust_decimal::Decimal;
use tokio::sync::oneshot;

use crate::domain::{AuctionState, Bid};
use crate::error::{BidRejection, Result};

/// Requests processed one at a time by the moderator loop, which is what
/// gives bids their total order.
#[derive(Debug)]
pub enum ModeratorCommand {
    /// Begin the auction with the first queued player
    Start(oneshot::Sender<Result<AuctionState>>),
    /// Bid on the player currently on the block
    PlaceBid {
        bidder: String,
        amount: Decimal,
        reply: oneshot::Sender<std::result::Result<Bid, BidRejection>>,
    },
    /// Hard cancel of the current lot
    Stop(oneshot::Sender<Result<AuctionState>>),
    /// Move past a closed lot (used after a stop)
    Advance(oneshot::Sender<Result<AuctionState>>),
    /// Replace state with a validated remote snapshot; the reply carries the
    /// applied state or the reason it was refused
    RemoteUpdate {
        state: AuctionState,
        reply: oneshot::Sender<Result<AuctionState>>,
    },
    /// Attach a non-fatal error to the published state
    ReportError(String),
}
