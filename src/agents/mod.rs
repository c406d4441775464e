//! Bidding agents — AI franchises reacting to the live auction
//!
//! Each runner owns one `BiddingAgent` and its main loop. Runners observe
//! the moderator through the state broadcast and bid through a `FundsTransfer`.

pub mod bidding;
pub mod runner;

pub use bidding::{BidOutcome, BiddingAgent, DeclineReason};
pub use runner::{AgentRunner, AgentRunnerConfig, BalanceBoard};
