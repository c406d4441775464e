//! Team personalities — the static table every bidding agent is configured from.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::player::PlayerRole;
use crate::error::{AuctionError, Result};

/// Squad area a team values most
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrengthCategory {
    Batting,
    Bowling,
    AllRounder,
    Balanced,
}

impl StrengthCategory {
    /// Whether a player's role belongs to this category.
    ///
    /// Keepers count as batting strength; `Balanced` has no role affinity.
    pub fn matches_role(&self, role: PlayerRole) -> bool {
        match self {
            StrengthCategory::Batting => {
                matches!(role, PlayerRole::Batsman | PlayerRole::WicketKeeper)
            }
            StrengthCategory::Bowling => matches!(role, PlayerRole::Bowler),
            StrengthCategory::AllRounder => matches!(role, PlayerRole::AllRounder),
            StrengthCategory::Balanced => false,
        }
    }
}

/// How hard a team pushes once it decides to bid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStrategy {
    Aggressive,
    Balanced,
    Conservative,
    Smart,
}

impl BidStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStrategy::Aggressive => "aggressive",
            BidStrategy::Balanced => "balanced",
            BidStrategy::Conservative => "conservative",
            BidStrategy::Smart => "smart",
        }
    }
}

impl fmt::Display for BidStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of player a team prefers to build around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerPreference {
    Experienced,
    YoungTalent,
    Versatile,
    Specialist,
}

/// Immutable bidding personality of an AI franchise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPersonality {
    pub team_id: String,
    pub name: String,
    /// Wallet identity the team bids under
    pub wallet: String,
    pub primary_strength: StrengthCategory,
    pub secondary_strength: StrengthCategory,
    pub bid_strategy: BidStrategy,
    pub player_preference: PlayerPreference,
    /// Largest single bid as a fraction of the current balance (0–1)
    pub max_bid_percent_of_balance: Decimal,
    pub min_bid_increment: Decimal,
    pub max_bid_increment: Decimal,
}

impl TeamPersonality {
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: Decimal| v >= Decimal::ZERO && v <= Decimal::ONE;

        if !in_unit(self.max_bid_percent_of_balance) {
            return Err(AuctionError::Validation(format!(
                "{}: max_bid_percent_of_balance must be within 0..=1",
                self.team_id
            )));
        }
        if !in_unit(self.min_bid_increment) || !in_unit(self.max_bid_increment) {
            return Err(AuctionError::Validation(format!(
                "{}: bid increments must be within 0..=1",
                self.team_id
            )));
        }
        if self.min_bid_increment > self.max_bid_increment {
            return Err(AuctionError::Validation(format!(
                "{}: min_bid_increment exceeds max_bid_increment",
                self.team_id
            )));
        }
        Ok(())
    }

    pub fn mumbai() -> Self {
        Self {
            team_id: "mumbai".into(),
            name: "Mumbai Mavericks".into(),
            wallet: "bot-mumbai".into(),
            primary_strength: StrengthCategory::Batting,
            secondary_strength: StrengthCategory::Bowling,
            bid_strategy: BidStrategy::Aggressive,
            player_preference: PlayerPreference::Experienced,
            max_bid_percent_of_balance: dec!(0.6),
            min_bid_increment: dec!(0.05),
            max_bid_increment: dec!(0.15),
        }
    }

    pub fn chennai() -> Self {
        Self {
            team_id: "chennai".into(),
            name: "Chennai Chargers".into(),
            wallet: "bot-chennai".into(),
            primary_strength: StrengthCategory::AllRounder,
            secondary_strength: StrengthCategory::Bowling,
            bid_strategy: BidStrategy::Smart,
            player_preference: PlayerPreference::Experienced,
            max_bid_percent_of_balance: dec!(0.5),
            min_bid_increment: dec!(0.03),
            max_bid_increment: dec!(0.10),
        }
    }

    pub fn bangalore() -> Self {
        Self {
            team_id: "bangalore".into(),
            name: "Bangalore Blasters".into(),
            wallet: "bot-bangalore".into(),
            primary_strength: StrengthCategory::Batting,
            secondary_strength: StrengthCategory::AllRounder,
            bid_strategy: BidStrategy::Balanced,
            player_preference: PlayerPreference::YoungTalent,
            max_bid_percent_of_balance: dec!(0.7),
            min_bid_increment: dec!(0.08),
            max_bid_increment: dec!(0.20),
        }
    }

    pub fn kolkata() -> Self {
        Self {
            team_id: "kolkata".into(),
            name: "Kolkata Knights".into(),
            wallet: "bot-kolkata".into(),
            primary_strength: StrengthCategory::Bowling,
            secondary_strength: StrengthCategory::Balanced,
            bid_strategy: BidStrategy::Conservative,
            player_preference: PlayerPreference::Specialist,
            max_bid_percent_of_balance: dec!(0.4),
            min_bid_increment: dec!(0.02),
            max_bid_increment: dec!(0.08),
        }
    }
}

/// The four AI franchises in table order
pub fn default_personalities() -> Vec<TeamPersonality> {
    vec![
        TeamPersonality::mumbai(),
        TeamPersonality::chennai(),
        TeamPersonality::bangalore(),
        TeamPersonality::kolkata(),
    ]
}
