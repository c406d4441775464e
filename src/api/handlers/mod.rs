pub mod auction;
pub mod system;
pub mod teams;

pub use auction::*;
pub use system::*;
pub use teams::*;

use axum::http::StatusCode;

use crate::error::AuctionError;

/// Map a crate error onto the HTTP status the API reports it with
pub(crate) fn error_response(err: AuctionError) -> (StatusCode, String) {
    let status = match &err {
        AuctionError::BidTooLow { .. }
        | AuctionError::AuctionNotActive(_)
        | AuctionError::AlreadyLeading(_)
        | AuctionError::InvalidStateTransition { .. }
        | AuctionError::EmptyCatalog => StatusCode::CONFLICT,
        AuctionError::InvalidSnapshot(_)
        | AuctionError::Validation(_)
        | AuctionError::InsufficientBalance { .. }
        | AuctionError::UnknownBidder(_) => StatusCode::BAD_REQUEST,
        AuctionError::ChannelClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}
