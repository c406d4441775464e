//! Auction runtime — wires the moderator service and the AI agent runners
//!
//! Shared by `serve` and `simulate`: one moderator task, one task per AI
//! franchise, a single broadcast shutdown signal.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::{ArtifactRegistry, ModeratorTransfer};
use crate::agents::{AgentRunner, AgentRunnerConfig, BalanceBoard, BiddingAgent};
use crate::domain::{AuctionState, AuctionStatus, Player, TeamPersonality};
use crate::moderator::{ModeratorConfig, ModeratorHandle, ModeratorService};
use crate::sync::StateSync;

const STATE_CHANNEL_CAPACITY: usize = 256;

/// AI side of the runtime
#[derive(Debug, Clone)]
pub struct AgentSetup {
    pub teams: Vec<TeamPersonality>,
    pub starting_balance: Decimal,
    pub runner: AgentRunnerConfig,
    pub seed: u64,
}

pub struct AuctionRuntime {
    moderator: ModeratorHandle,
    balances: BalanceBoard,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl AuctionRuntime {
    /// Spawn the moderator and, when given, one runner per team
    pub fn spawn(
        config: ModeratorConfig,
        players: Vec<Player>,
        registry: Arc<dyn ArtifactRegistry>,
        agents: Option<AgentSetup>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (sync, remote_rx) = StateSync::new(STATE_CHANNEL_CAPACITY);
        let service = ModeratorService::new(config, players, sync, remote_rx, registry);
        let moderator = service.handle();
        let balances: BalanceBoard = Arc::new(RwLock::new(HashMap::new()));

        let mut tasks = vec![tokio::spawn(service.run(shutdown_tx.subscribe()))];

        if let Some(setup) = agents {
            for (offset, team) in setup.teams.into_iter().enumerate() {
                let transfer = Arc::new(ModeratorTransfer::new(moderator.clone()));
                let agent = BiddingAgent::new(team, setup.starting_balance, transfer);
                let runner = AgentRunner::new(
                    agent,
                    moderator.clone(),
                    setup.runner.clone(),
                    setup.seed.wrapping_add(offset as u64),
                    balances.clone(),
                );
                tasks.push(tokio::spawn(runner.run(shutdown_tx.subscribe())));
            }
        }

        info!(tasks = tasks.len(), "auction runtime started");
        Self {
            moderator,
            balances,
            shutdown_tx,
            tasks,
        }
    }

    pub fn moderator(&self) -> &ModeratorHandle {
        &self.moderator
    }

    pub fn balances(&self) -> BalanceBoard {
        self.balances.clone()
    }

    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Resolve once every queued player has been finalized
    pub async fn wait_for_completion(&self) -> AuctionState {
        let mut updates = self.moderator.subscribe();
        loop {
            let latest = self.moderator.snapshot().await;
            if latest.status == AuctionStatus::Completed {
                return latest;
            }
            match updates.recv().await {
                Ok(state) if state.status == AuctionStatus::Completed => return state,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return self.moderator.snapshot().await,
            }
        }
    }

    /// Signal every task and wait for them to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "runtime task ended abnormally");
            }
        }
        info!("auction runtime stopped");
    }
}
