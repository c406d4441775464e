//! Auction Moderator
//!
//! `AuctionModerator` is the synchronous state machine and the only writer of
//! `AuctionState`. `ModeratorService` owns it inside a tokio task; everything
//! else talks to it through a clonable `ModeratorHandle`.

pub mod command;
pub mod config;
pub mod machine;
pub mod service;

pub use command::ModeratorCommand;
pub use config::ModeratorConfig;
pub use machine::{Advance, AuctionModerator, TickEvent};
pub use service::{ModeratorHandle, ModeratorService};
