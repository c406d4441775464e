use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use super::error_response;
use crate::api::{state::AppState, types::*};
use crate::domain::{AuctionState, HUMAN_BIDDER};
use crate::error::AuctionError;

type ApiResult<T> = std::result::Result<T, (StatusCode, String)>;

/// GET /api/auction/state
pub async fn get_state(State(state): State<AppState>) -> Json<AuctionState> {
    Json(state.moderator.snapshot().await)
}

/// POST /api/auction/state -- validated replace from a remote peer
pub async fn replace_state(
    State(state): State<AppState>,
    Json(remote): Json<AuctionState>,
) -> ApiResult<Json<AuctionState>> {
    let applied = state
        .moderator
        .apply_remote(remote)
        .await
        .map_err(error_response)?;
    info!(status = %applied.status, "remote state replaced via API");
    Ok(Json(applied))
}

/// POST /api/auction/start
pub async fn start_auction(State(state): State<AppState>) -> ApiResult<Json<AuctionState>> {
    let snapshot = state.moderator.start().await.map_err(error_response)?;
    info!("auction started via API");
    Ok(Json(snapshot))
}

/// POST /api/auction/stop
pub async fn stop_auction(State(state): State<AppState>) -> ApiResult<Json<AuctionState>> {
    let snapshot = state.moderator.stop().await.map_err(error_response)?;
    info!(status = %snapshot.status, "auction stopped via API");
    Ok(Json(snapshot))
}

/// POST /api/auction/advance -- move past a stopped lot
pub async fn advance_auction(State(state): State<AppState>) -> ApiResult<Json<AuctionState>> {
    let snapshot = state.moderator.advance().await.map_err(error_response)?;
    Ok(Json(snapshot))
}

/// POST /api/auction/bid -- human bid
pub async fn place_bid(
    State(state): State<AppState>,
    Json(req): Json<BidRequest>,
) -> ApiResult<Json<BidResponse>> {
    if let Some(bidder) = req.bidder.as_deref() {
        if bidder != HUMAN_BIDDER {
            return Err(error_response(AuctionError::UnknownBidder(bidder.to_string())));
        }
    }
    if req.amount <= rust_decimal::Decimal::ZERO {
        return Err(error_response(AuctionError::Validation(
            "bid amount must be positive".into(),
        )));
    }

    // Held across the moderator call so human bids never race each other
    let mut wallet = state.human.write().await;
    if state.moderator.snapshot().await.current_bidder.as_deref() == Some(HUMAN_BIDDER) {
        return Err(error_response(AuctionError::AlreadyLeading(HUMAN_BIDDER.into())));
    }
    if !wallet.can_afford(req.amount) {
        return Err(error_response(AuctionError::InsufficientBalance {
            balance: wallet.balance,
            amount: req.amount,
        }));
    }

    let bid = state
        .moderator
        .place_bid(HUMAN_BIDDER, req.amount)
        .await
        .map_err(error_response)?;

    if let Err(e) = wallet.debit(bid.amount) {
        warn!(error = %e, "accepted human bid could not be debited");
    }
    info!(amount = %bid.amount, balance = %wallet.balance, "human bid accepted");

    Ok(Json(BidResponse {
        accepted: true,
        bidder: bid.bidder,
        amount: bid.amount,
        balance: wallet.balance,
    }))
}

/// GET /api/auction/results
pub async fn get_results(State(state): State<AppState>) -> Json<ResultsResponse> {
    Json(ResultsResponse::from_outcomes(state.moderator.results().await))
}
