//! Bid decision engine
//!
//! Two pure functions drive every AI bid:
//! - [`should_bid`]: does this team want in at the current price?
//! - [`calculate_bid_amount`]: if so, how much does it raise?

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::scoring::score_player;
use crate::domain::{BidStrategy, BidderWallet, Player, TeamPersonality};

/// Balance must cover the current bid plus this margin for the next raise
pub const SAFETY_BUFFER: Decimal = dec!(1.1);

/// Decimal places kept on a computed bid
pub const BID_PRECISION: u32 = 5;

// =============================================================================
// Participation
// =============================================================================

/// Minimum fit score a strategy needs before it bids.
///
/// Smart teams get pickier as the price eats into their balance.
pub fn acceptance_threshold(strategy: BidStrategy, current_bid: Decimal, balance: Decimal) -> Decimal {
    match strategy {
        BidStrategy::Aggressive => dec!(4),
        BidStrategy::Conservative => dec!(6.5),
        BidStrategy::Balanced => dec!(5),
        BidStrategy::Smart => {
            if balance <= Decimal::ZERO {
                return dec!(10);
            }
            dec!(5) + (current_bid / balance) * dec!(5)
        }
    }
}

/// Why a team would or would not bid at the current price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Bid,
    /// Fit score below the strategy threshold
    PoorFit,
    /// Balance cannot cover the current bid plus safety buffer
    OverBudget,
}

/// Full reasoning behind a participation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub match_score: Decimal,
    pub threshold: Decimal,
    pub verdict: Verdict,
}

/// Evaluate participation, keeping the intermediate numbers.
///
/// Returns `None` when no decision is possible at all: no player, no
/// personality (human wallet), or a balance that does not exceed the current bid.
pub fn assess(current_bid: Decimal, wallet: &BidderWallet, player: Option<&Player>) -> Option<Assessment> {
    let player = player?;
    let personality = wallet.personality.as_ref()?;
    if wallet.balance <= current_bid {
        return None;
    }

    let match_score = score_player(player, personality);
    let threshold = acceptance_threshold(personality.bid_strategy, current_bid, wallet.balance);

    let verdict = if wallet.balance < current_bid * SAFETY_BUFFER {
        Verdict::OverBudget
    } else if match_score >= threshold {
        Verdict::Bid
    } else {
        Verdict::PoorFit
    };

    Some(Assessment {
        match_score,
        threshold,
        verdict,
    })
}

/// Whether the wallet's team should bid on `player` at `current_bid`
pub fn should_bid(current_bid: Decimal, wallet: &BidderWallet, player: Option<&Player>) -> bool {
    matches!(
        assess(current_bid, wallet, player),
        Some(Assessment {
            verdict: Verdict::Bid,
            ..
        })
    )
}

// =============================================================================
// Sizing
// =============================================================================

/// Strategy multiplier applied to the raw increment
pub fn strategy_multiplier(strategy: BidStrategy, match_score: Decimal) -> Decimal {
    match strategy {
        BidStrategy::Aggressive => dec!(1.3),
        BidStrategy::Conservative => dec!(0.7),
        BidStrategy::Smart if match_score > dec!(7) => dec!(1.2),
        BidStrategy::Smart => dec!(0.8),
        BidStrategy::Balanced => Decimal::ONE,
    }
}

/// Increment fraction interpolated between the personality's min and max by fit
pub fn increment_fraction(personality: &TeamPersonality, match_score: Decimal) -> Decimal {
    let weight = (match_score / dec!(10)).clamp(Decimal::ZERO, Decimal::ONE);
    personality.min_bid_increment
        + (personality.max_bid_increment - personality.min_bid_increment) * weight
}

/// Next bid for the wallet's team, or `None` when it cannot raise.
///
/// The result never exceeds `balance * max_bid_percent_of_balance` and is
/// truncated to [`BID_PRECISION`] decimal places.
pub fn calculate_bid_amount(
    current_bid: Decimal,
    wallet: &BidderWallet,
    player: Option<&Player>,
    match_score: Decimal,
) -> Option<Decimal> {
    player?;
    let personality = wallet.personality.as_ref()?;

    let increment = increment_fraction(personality, match_score);
    let multiplier = strategy_multiplier(personality.bid_strategy, match_score);
    let mut new_bid = current_bid + current_bid * increment * multiplier;

    let cap = wallet.balance * personality.max_bid_percent_of_balance;
    if new_bid > cap {
        if cap <= current_bid {
            return None;
        }
        new_bid = cap;
    }

    let rounded = new_bid.round_dp_with_strategy(BID_PRECISION, RoundingStrategy::ToZero);
    if rounded <= current_bid {
        return None;
    }
    Some(rounded)
}
