use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AuctionError, Result};

/// Playing role of a cricketer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRole {
    #[serde(rename = "Batsman")]
    Batsman,
    #[serde(rename = "Bowler")]
    Bowler,
    #[serde(rename = "All-Rounder")]
    AllRounder,
    #[serde(rename = "Wicket-Keeper")]
    WicketKeeper,
}

impl PlayerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerRole::Batsman => "Batsman",
            PlayerRole::Bowler => "Bowler",
            PlayerRole::AllRounder => "All-Rounder",
            PlayerRole::WicketKeeper => "Wicket-Keeper",
        }
    }
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlayerRole {
    type Err = AuctionError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "batsman" | "batter" => Ok(PlayerRole::Batsman),
            "bowler" => Ok(PlayerRole::Bowler),
            "allrounder" => Ok(PlayerRole::AllRounder),
            "wicketkeeper" | "keeper" => Ok(PlayerRole::WicketKeeper),
            _ => Err(AuctionError::Validation(format!("unknown player role: {raw}"))),
        }
    }
}

/// Career numbers. Every field is optional; absent stats earn no bonus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batting_average: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wickets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<u32>,
}

/// A player up for auction.
///
/// `current_bid` / `current_bidder` are only written by the moderator while the
/// player is on the block; catalogs deliver them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub role: PlayerRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub stats: PlayerStats,
    pub base_price: Decimal,
    #[serde(default)]
    pub current_bid: Option<Decimal>,
    #[serde(default)]
    pub current_bidder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: PlayerRole, base_price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            country: None,
            age: None,
            stats: PlayerStats::default(),
            base_price,
            current_bid: None,
            current_bidder: None,
            image_url: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_stats(mut self, stats: PlayerStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Schema checks applied to catalog records and inbound snapshots
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AuctionError::Validation("player id is empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(AuctionError::Validation(format!("player {} has no name", self.id)));
        }
        if self.base_price <= Decimal::ZERO {
            return Err(AuctionError::Validation(format!(
                "player {} base price must be positive, got {}",
                self.id, self.base_price
            )));
        }
        let stats = &self.stats;
        for (field, value) in [
            ("battingAverage", stats.batting_average),
            ("strikeRate", stats.strike_rate),
            ("economy", stats.economy),
        ] {
            if matches!(value, Some(v) if v.is_sign_negative()) {
                return Err(AuctionError::Validation(format!(
                    "player {} has negative {field}",
                    self.id
                )));
            }
        }
        if let Some(bid) = self.current_bid {
            if bid < self.base_price {
                return Err(AuctionError::Validation(format!(
                    "player {} current bid {} is below base price {}",
                    self.id, bid, self.base_price
                )));
            }
        }
        Ok(())
    }
}
