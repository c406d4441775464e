use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, Table, Tabled};

use crate::domain::{AuctionOutcome, Player, TeamPersonality};
use crate::strategy::score_player;

#[derive(Parser)]
#[command(name = "auctioneer")]
#[command(version)]
#[command(about = "Cricket player auction with AI franchise bidders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and per-environment overrides
    #[arg(short, long, default_value = "config")]
    pub config: PathBuf,

    /// Player catalog (JSON array); overrides catalog.path
    #[arg(short, long, global = true)]
    pub players: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP/WebSocket server with the moderator and AI agents
    Serve {
        /// Start the auction as soon as the server is up
        #[arg(long)]
        auto_start: bool,
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a headless auction to completion with dry-run collaborators
    Simulate {
        /// Override agents.seed
        #[arg(long)]
        seed: Option<u64>,
        /// Wall-clock length of one auction second
        #[arg(long, default_value = "50")]
        tick_ms: u64,
        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show how every team rates every catalog player
    Score,
}

/// Display name for a bidder identity
pub fn bidder_label(address: &str, teams: &[TeamPersonality]) -> String {
    teams
        .iter()
        .find(|t| t.wallet == address)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| address.to_string())
}

#[derive(Debug, Serialize, Tabled)]
pub struct ResultRow {
    pub player: String,
    pub role: String,
    #[tabled(rename = "base")]
    pub base_price: String,
    pub outcome: String,
    pub winner: String,
    pub price: String,
}

impl ResultRow {
    pub fn from_outcome(outcome: &AuctionOutcome, teams: &[TeamPersonality]) -> Self {
        let player = outcome.player();
        let (status, winner, price) = match outcome {
            AuctionOutcome::Sold { winner, amount, .. } => {
                ("sold", bidder_label(winner, teams), amount.to_string())
            }
            AuctionOutcome::Unsold { .. } => ("unsold", "-".to_string(), "-".to_string()),
        };
        Self {
            player: player.name.clone(),
            role: player.role.to_string(),
            base_price: player.base_price.to_string(),
            outcome: status.to_string(),
            winner,
            price,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct BalanceRow {
    pub team: String,
    pub strategy: String,
    pub balance: String,
}

pub fn results_table(outcomes: &[AuctionOutcome], teams: &[TeamPersonality]) -> String {
    if outcomes.is_empty() {
        return "(no results)".to_string();
    }
    let rows: Vec<ResultRow> = outcomes
        .iter()
        .map(|o| ResultRow::from_outcome(o, teams))
        .collect();
    Table::new(rows).to_string()
}

/// Fit score of every player against every team, one column per team
pub fn score_table(players: &[Player], teams: &[TeamPersonality]) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["player".to_string(), "role".to_string(), "age".to_string()];
    header.extend(teams.iter().map(|t| t.name.clone()));
    builder.push_record(header);

    for player in players {
        let mut row = vec![
            player.name.clone(),
            player.role.to_string(),
            player.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
        ];
        row.extend(
            teams
                .iter()
                .map(|team| score_player(player, team).round_dp(2).to_string()),
        );
        builder.push_record(row);
    }

    builder.build().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo_players;
    use crate::domain::default_personalities;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["auctioneer", "simulate", "--seed", "9"]);
        match cli.command {
            Some(Commands::Simulate { seed, tick_ms, json }) => {
                assert_eq!(seed, Some(9));
                assert_eq!(tick_ms, 50);
                assert!(!json);
            }
            _ => panic!("expected simulate"),
        }

        let cli = Cli::parse_from(["auctioneer", "serve", "--auto-start", "--port", "4000"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Serve { auto_start: true, port: Some(4000) })
        ));
    }

    #[test]
    fn result_rows_name_the_winning_team() {
        let teams = default_personalities();
        let player = demo_players().remove(0);
        let sold = AuctionOutcome::Sold {
            player: player.clone(),
            winner: "bot-chennai".into(),
            amount: dec!(2.5),
            finalized_at: Utc::now(),
        };
        let unsold = AuctionOutcome::Unsold {
            player,
            finalized_at: Utc::now(),
        };

        let row = ResultRow::from_outcome(&sold, &teams);
        assert_eq!(row.winner, "Chennai Chargers");
        assert_eq!(row.price, "2.5");

        let row = ResultRow::from_outcome(&unsold, &teams);
        assert_eq!(row.outcome, "unsold");
        assert_eq!(row.winner, "-");
    }

    #[test]
    fn score_table_has_a_column_per_team() {
        let table = score_table(&demo_players(), &default_personalities());
        assert!(table.contains("Kolkata Knights"));
        assert!(table.contains("Arjun Mehra"));
    }
}
