//! Player catalogs — supply the ordered queue consumed at auction start

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use tracing::info;

use crate::domain::{Player, PlayerRole, PlayerStats};
use crate::error::{AuctionError, Result};

#[async_trait]
pub trait PlayerCatalog: Send + Sync {
    /// Ordered auction queue; every record is schema-checked
    async fn load(&self) -> Result<Vec<Player>>;
}

fn validate_all(players: &[Player]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for player in players {
        player.validate()?;
        if !seen.insert(player.id.as_str()) {
            return Err(AuctionError::Validation(format!(
                "duplicate player id {}",
                player.id
            )));
        }
    }
    Ok(())
}

/// In-memory catalog
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    players: Vec<Player>,
}

impl StaticCatalog {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    /// Built-in demo queue
    pub fn demo() -> Self {
        Self::new(demo_players())
    }
}

#[async_trait]
impl PlayerCatalog for StaticCatalog {
    async fn load(&self) -> Result<Vec<Player>> {
        validate_all(&self.players)?;
        Ok(self.players.clone())
    }
}

/// JSON array of player records on disk
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlayerCatalog for JsonFileCatalog {
    async fn load(&self) -> Result<Vec<Player>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let mut players: Vec<Player> = serde_json::from_str(&raw)?;
        // Catalog entries never carry live bid state
        for player in &mut players {
            player.current_bid = None;
            player.current_bidder = None;
        }
        validate_all(&players)?;
        info!(path = %self.path.display(), players = players.len(), "player catalog loaded");
        Ok(players)
    }
}

pub fn demo_players() -> Vec<Player> {
    vec![
        Player::new("p-001", "Arjun Mehra", PlayerRole::Batsman, dec!(2))
            .with_country("India")
            .with_age(31)
            .with_stats(PlayerStats {
                batting_average: Some(dec!(48.2)),
                strike_rate: Some(dec!(138.5)),
                runs: Some(6120),
                matches: Some(190),
                ..Default::default()
            }),
        Player::new("p-002", "Liam Hartley", PlayerRole::Bowler, dec!(1.5))
            .with_country("Australia")
            .with_age(29)
            .with_stats(PlayerStats {
                economy: Some(dec!(7.1)),
                wickets: Some(112),
                matches: Some(95),
                ..Default::default()
            }),
        Player::new("p-003", "Kavish Rao", PlayerRole::AllRounder, dec!(1.8))
            .with_country("India")
            .with_age(25)
            .with_stats(PlayerStats {
                batting_average: Some(dec!(29.4)),
                strike_rate: Some(dec!(151.0)),
                economy: Some(dec!(8.3)),
                wickets: Some(48),
                runs: Some(1830),
                matches: Some(77),
            }),
        Player::new("p-004", "Dane Whitaker", PlayerRole::WicketKeeper, dec!(1.2))
            .with_country("England")
            .with_age(27)
            .with_stats(PlayerStats {
                batting_average: Some(dec!(34.0)),
                strike_rate: Some(dec!(142.7)),
                runs: Some(2650),
                matches: Some(101),
                ..Default::default()
            }),
        Player::new("p-005", "Samir Qureshi", PlayerRole::Bowler, dec!(1))
            .with_country("Afghanistan")
            .with_age(23)
            .with_stats(PlayerStats {
                economy: Some(dec!(6.4)),
                wickets: Some(74),
                matches: Some(60),
                ..Default::default()
            }),
        Player::new("p-006", "Theo Markram", PlayerRole::Batsman, dec!(1.5))
            .with_country("South Africa")
            .with_age(24)
            .with_stats(PlayerStats {
                batting_average: Some(dec!(37.9)),
                strike_rate: Some(dec!(146.1)),
                runs: Some(1410),
                matches: Some(48),
                ..Default::default()
            }),
        Player::new("p-007", "Ravi Nandan", PlayerRole::AllRounder, dec!(2))
            .with_country("India")
            .with_age(33)
            .with_stats(PlayerStats {
                batting_average: Some(dec!(26.3)),
                strike_rate: Some(dec!(129.4)),
                economy: Some(dec!(7.6)),
                wickets: Some(131),
                runs: Some(2980),
                matches: Some(205),
            }),
        Player::new("p-008", "Jonah Tiwari", PlayerRole::Bowler, dec!(0.8))
            .with_country("New Zealand")
            .with_age(30)
            .with_stats(PlayerStats {
                economy: Some(dec!(8.6)),
                wickets: Some(57),
                matches: Some(66),
                ..Default::default()
            }),
    ]
}
