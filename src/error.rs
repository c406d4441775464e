use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the auction service
#[derive(Error, Debug)]
pub enum AuctionError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // State machine errors
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Auction is not active (status: {0})")]
    AuctionNotActive(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Player catalog is empty")]
    EmptyCatalog,

    // Bid errors
    #[error("Bid too low: {amount} <= current bid {current}")]
    BidTooLow { amount: Decimal, current: Decimal },

    #[error("Insufficient balance: {balance} < {amount}")]
    InsufficientBalance { balance: Decimal, amount: Decimal },

    #[error("Unknown bidder: {0}")]
    UnknownBidder(String),

    #[error("{0} already holds the highest bid")]
    AlreadyLeading(String),

    // Collaborator errors
    #[error("Funds transfer failed: {0}")]
    Transfer(String),

    #[error("Artifact registry failed: {0}")]
    Registry(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Channel closed: {0}")]
    ChannelClosed(&'static str),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for AuctionError
pub type Result<T> = std::result::Result<T, AuctionError>;

/// Reasons a bid request is turned away by the moderator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BidRejection {
    #[error("auction is not active")]
    NotActive,

    #[error("bid {amount} does not exceed current bid {current}")]
    TooLow { amount: Decimal, current: Decimal },
}

impl From<BidRejection> for AuctionError {
    fn from(err: BidRejection) -> Self {
        match err {
            BidRejection::NotActive => AuctionError::AuctionNotActive("not active".into()),
            BidRejection::TooLow { amount, current } => AuctionError::BidTooLow { amount, current },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bid_rejection_maps_to_bid_too_low() {
        let err: AuctionError = BidRejection::TooLow {
            amount: dec!(105),
            current: dec!(110),
        }
        .into();
        assert!(matches!(err, AuctionError::BidTooLow { .. }));
        assert_eq!(err.to_string(), "Bid too low: 105 <= current bid 110");
    }
}
