//! Bidding strategy: player fit scoring and the bid decision engine

pub mod decision;
pub mod scoring;

pub use decision::{
    acceptance_threshold, assess, calculate_bid_amount, increment_fraction, should_bid,
    strategy_multiplier, Assessment, Verdict, BID_PRECISION, SAFETY_BUFFER,
};
pub use scoring::{score_player, MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};
