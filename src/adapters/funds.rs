//! Funds-transfer collaborators
//!
//! An agent only commits a bid to its own books after `submit_bid` confirms.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AuctionError, Result};
use crate::moderator::ModeratorHandle;

/// Confirmation returned by a funds transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferReceipt {
    pub fn confirmed(transaction_ref: impl Into<String>) -> Self {
        Self {
            success: true,
            transaction_ref: Some(transaction_ref.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_ref: None,
            error: Some(error.into()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundsTransfer: Send + Sync {
    /// Submit a bid payment. `Err` means the collaborator could not be reached;
    /// a reachable collaborator that refuses returns an unsuccessful receipt.
    async fn submit_bid(&self, bidder: &str, amount: Decimal) -> Result<TransferReceipt>;
}

/// Confirms every transfer with a synthetic reference. Used for offline
/// simulation and tests.
#[derive(Debug, Clone, Default)]
pub struct DryRunTransfer;

#[async_trait]
impl FundsTransfer for DryRunTransfer {
    async fn submit_bid(&self, bidder: &str, amount: Decimal) -> Result<TransferReceipt> {
        let reference = format!("dry-{}", Uuid::new_v4());
        debug!(bidder, %amount, reference = %reference, "dry-run transfer");
        Ok(TransferReceipt::confirmed(reference))
    }
}

/// Routes a bid through the moderator: the transfer confirms only when the
/// moderator accepted the bid, so wallets are debited for accepted bids only.
#[derive(Clone)]
pub struct ModeratorTransfer {
    moderator: ModeratorHandle,
}

impl ModeratorTransfer {
    pub fn new(moderator: ModeratorHandle) -> Self {
        Self { moderator }
    }
}

#[async_trait]
impl FundsTransfer for ModeratorTransfer {
    async fn submit_bid(&self, bidder: &str, amount: Decimal) -> Result<TransferReceipt> {
        match self.moderator.place_bid(bidder, amount).await {
            Ok(bid) => {
                let reference = Uuid::new_v4().to_string();
                info!(bidder, amount = %bid.amount, reference = %reference, "bid confirmed by moderator");
                Ok(TransferReceipt::confirmed(reference))
            }
            Err(AuctionError::ChannelClosed(what)) => Err(AuctionError::ChannelClosed(what)),
            Err(e) => Ok(TransferReceipt::failed(e.to_string())),
        }
    }
}
