pub mod adapters;
pub mod agents;
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod moderator;
pub mod runtime;
pub mod strategy;
pub mod sync;

pub use adapters::{
    ArtifactRegistry, DryRunRegistry, DryRunTransfer, FundsTransfer, HttpArtifactRegistry,
    JsonFileCatalog, ModeratorTransfer, PlayerCatalog, StaticCatalog,
};
pub use agents::{AgentRunner, BidOutcome, BiddingAgent, DeclineReason};
pub use config::AppConfig;
pub use domain::{
    AuctionOutcome, AuctionState, AuctionStatus, Bid, BidderWallet, Player, PlayerRole,
    TeamPersonality,
};
pub use error::{AuctionError, BidRejection, Result};
pub use moderator::{AuctionModerator, ModeratorConfig, ModeratorHandle, ModeratorService};
pub use runtime::{AgentSetup, AuctionRuntime};
pub use strategy::{calculate_bid_amount, score_player, should_bid};
pub use sync::StateSync;
