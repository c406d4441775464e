use auctioneer::adapters::DryRunRegistry;
use auctioneer::agents::AgentRunnerConfig;
use auctioneer::api::{create_router, AppState};
use auctioneer::cli::{self, BalanceRow, Cli, Commands};
use auctioneer::config::AppConfig;
use auctioneer::domain::{default_personalities, BidderWallet};
use auctioneer::error::{AuctionError, Result};
use auctioneer::runtime::{AgentSetup, AuctionRuntime};
use clap::Parser;
use std::sync::Arc;
use tabled::Table;
use tracing::{info, warn};

mod main_runtime;

use main_runtime::{
    build_registry, init_logging, init_logging_simple, load_config, load_players, shutdown_signal,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Score) => {
            init_logging_simple();
            let config = load_config(&cli.config, cli.players.as_deref())?;
            let players = load_players(&config).await?;
            println!("{}", cli::score_table(&players, &default_personalities()));
        }
        Some(Commands::Simulate {
            seed,
            tick_ms,
            json,
        }) => {
            init_logging_simple();
            let mut config = load_config(&cli.config, cli.players.as_deref())?;
            if let Some(seed) = seed {
                config.agents.seed = *seed;
            }
            run_simulation(config, *tick_ms, *json).await?;
        }
        Some(Commands::Serve { auto_start, port }) => {
            let mut config = load_config(&cli.config, cli.players.as_deref())?;
            if let Some(port) = port {
                config.server.port = *port;
            }
            init_logging(&config.logging);
            run_server(config, *auto_start).await?;
        }
        None => {
            let config = load_config(&cli.config, cli.players.as_deref())?;
            init_logging(&config.logging);
            run_server(config, false).await?;
        }
    }

    Ok(())
}

fn agent_setup(config: &AppConfig, runner: AgentRunnerConfig) -> Option<AgentSetup> {
    config.agents.enabled.then(|| AgentSetup {
        teams: default_personalities(),
        starting_balance: config.agents.starting_balance,
        runner,
        seed: config.agents.seed,
    })
}

async fn run_server(config: AppConfig, auto_start: bool) -> Result<()> {
    let players = load_players(&config).await?;
    let registry = build_registry(&config)?;
    let runtime = AuctionRuntime::spawn(
        config.auction.clone(),
        players,
        registry,
        agent_setup(&config, config.agents.runner_config()),
    );

    let state = AppState::new(
        runtime.moderator().clone(),
        BidderWallet::human(config.human.starting_balance),
        default_personalities(),
        runtime.balances(),
        config.agents.starting_balance,
    );
    let app = create_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("auction server listening on {}", addr);

    if auto_start {
        match runtime.moderator().start().await {
            Ok(state) => info!(player_index = state.current_player_index, "auction started"),
            Err(e) => warn!(error = %e, "auto start failed"),
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    runtime.shutdown().await;
    Ok(())
}

async fn run_simulation(mut config: AppConfig, tick_ms: u64, json: bool) -> Result<()> {
    let players = load_players(&config).await?;
    config.auction.tick_ms = tick_ms.max(1);

    // Reaction delays keep their proportion to one auction second
    let scale = |ms: u64| ms.saturating_mul(config.auction.tick_ms) / 1000;
    let runner = AgentRunnerConfig {
        reaction_min_ms: scale(config.agents.reaction_min_ms),
        reaction_max_ms: scale(config.agents.reaction_max_ms),
    };

    let teams = default_personalities();
    let runtime = AuctionRuntime::spawn(
        config.auction.clone(),
        players,
        Arc::new(DryRunRegistry),
        agent_setup(&config, runner),
    );

    runtime.moderator().start().await?;
    let final_state = runtime.wait_for_completion().await;
    let outcomes = runtime.moderator().results().await;
    let balances = runtime.balances().read().await.clone();
    runtime.shutdown().await;

    if let Some(e) = final_state.error {
        warn!(error = %e, "auction finished with an error");
    }

    if json {
        let rendered = serde_json::to_string_pretty(&outcomes).map_err(AuctionError::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", cli::results_table(&outcomes, &teams));
    let rows: Vec<BalanceRow> = teams
        .iter()
        .map(|team| BalanceRow {
            team: team.name.clone(),
            strategy: team.bid_strategy.as_str().to_string(),
            balance: balances
                .get(&team.wallet)
                .copied()
                .unwrap_or(config.agents.starting_balance)
                .to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}
