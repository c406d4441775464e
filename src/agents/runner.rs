//! AgentRunner — drives one BiddingAgent from the state broadcast
//!
//! The runner owns its agent and loop. It reacts to each new (player, price)
//! pair once, after a seeded reaction delay, and re-checks the latest state
//! before submitting so stale decisions are dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tokio::time::Duration;
use tracing::{debug, info};

use super::bidding::{BidOutcome, BiddingAgent, DeclineReason};
use crate::domain::AuctionState;
use crate::moderator::ModeratorHandle;

/// Read-only mirror of every wallet balance, keyed by bidder identity
pub type BalanceBoard = Arc<RwLock<HashMap<String, Decimal>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentRunnerConfig {
    pub reaction_min_ms: u64,
    pub reaction_max_ms: u64,
}

impl Default for AgentRunnerConfig {
    fn default() -> Self {
        Self {
            reaction_min_ms: 500,
            reaction_max_ms: 2500,
        }
    }
}

pub struct AgentRunner {
    agent: BiddingAgent,
    moderator: ModeratorHandle,
    config: AgentRunnerConfig,
    rng: StdRng,
    balances: BalanceBoard,
    /// Last (player id, price) this agent evaluated
    last_seen: Option<(String, Decimal)>,
}

impl AgentRunner {
    pub fn new(
        agent: BiddingAgent,
        moderator: ModeratorHandle,
        config: AgentRunnerConfig,
        seed: u64,
        balances: BalanceBoard,
    ) -> Self {
        Self {
            agent,
            moderator,
            config,
            rng: StdRng::seed_from_u64(seed),
            balances,
            last_seen: None,
        }
    }

    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut states = self.moderator.subscribe();
        self.report_balance().await;
        info!(team = self.agent.team_name(), balance = %self.agent.balance(), "agent online");

        loop {
            tokio::select! {
                received = states.recv() => match received {
                    Ok(state) => {
                        let Some(key) = self.observe(&state) else { continue };
                        // Shutdown cuts the reaction delay short
                        tokio::select! {
                            _ = tokio::time::sleep(self.reaction_delay()) => self.react(key).await,
                            _ = shutdown_rx.recv() => break,
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(team = self.agent.team_name(), skipped, "agent lagged behind state updates");
                    }
                    Err(RecvError::Closed) => break,
                },

                _ = shutdown_rx.recv() => break,
            }
        }

        info!(
            team = self.agent.team_name(),
            bids = self.agent.history().len(),
            balance = %self.agent.balance(),
            "agent stopped"
        );
    }

    fn reaction_delay(&mut self) -> Duration {
        let min = self.config.reaction_min_ms;
        let max = self.config.reaction_max_ms;
        let ms = if max <= min { min } else { self.rng.gen_range(min..=max) };
        Duration::from_millis(ms)
    }

    /// The (player id, price) pair to react to, if this state is new to the agent
    fn observe(&mut self, state: &AuctionState) -> Option<(String, Decimal)> {
        if !state.is_active() || state.current_bidder.as_deref() == Some(self.agent.address()) {
            return None;
        }
        let player_id = state.current_player.as_ref()?.id.clone();
        let key = (player_id, state.current_bid);
        if self.last_seen.as_ref() == Some(&key) {
            return None;
        }
        self.last_seen = Some(key.clone());
        Some(key)
    }

    async fn react(&mut self, key: (String, Decimal)) {
        let latest = self.moderator.snapshot().await;
        let still_current = latest.is_active()
            && latest.current_bid == key.1
            && latest.current_player.as_ref().map(|p| p.id.as_str()) == Some(key.0.as_str());
        if !still_current {
            debug!(team = self.agent.team_name(), "discarding stale decision");
            return;
        }

        let outcome = self
            .agent
            .evaluate_and_bid(
                latest.current_player.as_ref(),
                latest.current_bid,
                latest.current_bidder.as_deref(),
            )
            .await;

        match outcome {
            BidOutcome::Accepted { amount, .. } => {
                debug!(team = self.agent.team_name(), %amount, "raised");
                self.report_balance().await;
            }
            BidOutcome::Declined(DeclineReason::TransferFailed(reason)) => {
                debug!(team = self.agent.team_name(), reason = %reason, "bid not placed");
                // Allow another attempt at the same price
                self.last_seen = None;
            }
            BidOutcome::Declined(reason) => {
                debug!(team = self.agent.team_name(), reason = %reason, "passing");
            }
            BidOutcome::AlreadyLeading => {}
        }
    }

    async fn report_balance(&self) {
        self.balances
            .write()
            .await
            .insert(self.agent.address().to_string(), self.agent.balance());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DryRunRegistry, ModeratorTransfer};
    use crate::domain::{AuctionStatus, Player, PlayerRole, TeamPersonality};
    use crate::moderator::{ModeratorConfig, ModeratorService};
    use crate::sync::StateSync;
    use rust_decimal_macros::dec;

    fn spawn_auction() -> (ModeratorHandle, broadcast::Sender<()>) {
        let (sync, remote_rx) = StateSync::new(64);
        let queue = vec![Player::new("p1", "Opener", PlayerRole::Batsman, dec!(100)).with_age(30)];
        let service = ModeratorService::new(
            ModeratorConfig::default(),
            queue,
            sync,
            remote_rx,
            Arc::new(DryRunRegistry),
        );
        let handle = service.handle();
        let (shutdown_tx, _) = broadcast::channel(1);
        tokio::spawn(service.run(shutdown_tx.subscribe()));
        (handle, shutdown_tx)
    }

    fn runner(handle: &ModeratorHandle, team: TeamPersonality, balances: BalanceBoard) -> AgentRunner {
        let transfer = Arc::new(ModeratorTransfer::new(handle.clone()));
        AgentRunner::new(
            BiddingAgent::new(team, dec!(1000), transfer),
            handle.clone(),
            AgentRunnerConfig::default(),
            7,
            balances,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn runner_bids_once_and_then_holds_the_lead() {
        let (handle, shutdown) = spawn_auction();
        let balances: BalanceBoard = Arc::new(RwLock::new(HashMap::new()));
        let task = tokio::spawn(
            runner(&handle, TeamPersonality::mumbai(), balances.clone()).run(shutdown.subscribe()),
        );
        tokio::task::yield_now().await;

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_000)).await;

        let snap = handle.snapshot().await;
        assert_eq!(snap.status, AuctionStatus::Active);
        assert_eq!(snap.current_bidder.as_deref(), Some("bot-mumbai"));
        let paid = snap.current_bid;
        assert!(paid > dec!(100));
        assert_eq!(balances.read().await["bot-mumbai"], dec!(1000) - paid);

        // Leading: later snapshots do not trigger another raise
        tokio::time::sleep(Duration::from_millis(8_000)).await;
        assert_eq!(handle.snapshot().await.bid_history.len(), 1);

        shutdown.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn poor_fit_runner_stays_out() {
        let (handle, shutdown) = spawn_auction();
        let balances: BalanceBoard = Arc::new(RwLock::new(HashMap::new()));
        let task = tokio::spawn(
            runner(&handle, TeamPersonality::kolkata(), balances.clone()).run(shutdown.subscribe()),
        );
        tokio::task::yield_now().await;

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5_000)).await;

        assert!(handle.snapshot().await.bid_history.is_empty());
        assert_eq!(balances.read().await["bot-kolkata"], dec!(1000));

        shutdown.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_the_reaction_delay() {
        let (handle, shutdown) = spawn_auction();
        let balances: BalanceBoard = Arc::new(RwLock::new(HashMap::new()));
        let transfer = Arc::new(ModeratorTransfer::new(handle.clone()));
        let slow = AgentRunner::new(
            BiddingAgent::new(TeamPersonality::mumbai(), dec!(1000), transfer),
            handle.clone(),
            AgentRunnerConfig {
                reaction_min_ms: 60_000,
                reaction_max_ms: 60_000,
            },
            7,
            balances,
        );
        let task = tokio::spawn(slow.run(shutdown.subscribe()));
        tokio::task::yield_now().await;

        handle.start().await.unwrap();
        // Let the runner pick up the live lot and enter its delay
        tokio::time::sleep(Duration::from_millis(10)).await;

        shutdown.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("runner should stop without finishing its delay")
            .unwrap();
        assert!(handle.snapshot().await.bid_history.is_empty());
    }
}
