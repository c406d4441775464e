//! Moderator service — owns the `AuctionModerator` and drives it
//!
//! The main `run()` loop uses `tokio::select!` to:
//!   - Process commands from handles (start / bid / stop / advance)
//!   - Apply validated remote snapshots (last writer wins)
//!   - Tick the auction clock once per `tick_ms`
//! Every state change is published to the sync channel.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::command::ModeratorCommand;
use super::config::ModeratorConfig;
use super::machine::{Advance, AuctionModerator, TickEvent};
use crate::adapters::ArtifactRegistry;
use crate::domain::{AuctionOutcome, AuctionState, Bid, Player};
use crate::error::{AuctionError, Result};
use crate::sync::StateSync;

/// Clonable handle for agents, the API and the CLI
#[derive(Clone)]
pub struct ModeratorHandle {
    command_tx: mpsc::Sender<ModeratorCommand>,
    sync: StateSync,
    results: Arc<RwLock<Vec<AuctionOutcome>>>,
}

impl ModeratorHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ModeratorCommand,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(make(tx))
            .await
            .map_err(|_| AuctionError::ChannelClosed("moderator command"))?;
        rx.await
            .map_err(|_| AuctionError::ChannelClosed("moderator reply"))
    }

    pub async fn start(&self) -> Result<AuctionState> {
        self.request(ModeratorCommand::Start).await?
    }

    /// Submit a bid; rejections come back as `BidTooLow` / `AuctionNotActive`
    pub async fn place_bid(&self, bidder: &str, amount: Decimal) -> Result<Bid> {
        let bidder = bidder.to_string();
        let reply = self
            .request(|reply| ModeratorCommand::PlaceBid {
                bidder,
                amount,
                reply,
            })
            .await?;
        reply.map_err(AuctionError::from)
    }

    pub async fn stop(&self) -> Result<AuctionState> {
        self.request(ModeratorCommand::Stop).await?
    }

    pub async fn advance(&self) -> Result<AuctionState> {
        self.request(ModeratorCommand::Advance).await?
    }

    /// Apply a remote snapshot and wait for the moderator's verdict
    pub async fn apply_remote(&self, state: AuctionState) -> Result<AuctionState> {
        state.validate()?;
        self.request(|reply| ModeratorCommand::RemoteUpdate { state, reply })
            .await?
    }

    pub async fn report_error(&self, message: impl Into<String>) -> Result<()> {
        self.command_tx
            .send(ModeratorCommand::ReportError(message.into()))
            .await
            .map_err(|_| AuctionError::ChannelClosed("moderator command"))
    }

    /// Latest published snapshot
    pub async fn snapshot(&self) -> AuctionState {
        self.sync.latest().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuctionState> {
        self.sync.subscribe()
    }

    pub fn sync(&self) -> &StateSync {
        &self.sync
    }

    /// Finalized lots so far
    pub async fn results(&self) -> Vec<AuctionOutcome> {
        self.results.read().await.clone()
    }
}

pub struct ModeratorService {
    moderator: AuctionModerator,
    sync: StateSync,
    registry: Arc<dyn ArtifactRegistry>,
    results: Arc<RwLock<Vec<AuctionOutcome>>>,
    command_tx: mpsc::Sender<ModeratorCommand>,
    command_rx: mpsc::Receiver<ModeratorCommand>,
    remote_rx: mpsc::Receiver<AuctionState>,
}

impl ModeratorService {
    pub fn new(
        config: ModeratorConfig,
        queue: Vec<Player>,
        sync: StateSync,
        remote_rx: mpsc::Receiver<AuctionState>,
        registry: Arc<dyn ArtifactRegistry>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        Self {
            moderator: AuctionModerator::new(config, queue),
            sync,
            registry,
            results: Arc::new(RwLock::new(Vec::new())),
            command_tx,
            command_rx,
            remote_rx,
        }
    }

    pub fn handle(&self) -> ModeratorHandle {
        ModeratorHandle {
            command_tx: self.command_tx.clone(),
            sync: self.sync.clone(),
            results: self.results.clone(),
        }
    }

    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        let period = Duration::from_millis(self.moderator.config().tick_ms.max(1));
        let mut clock = tokio::time::interval_at(Instant::now() + period, period);
        // Don't burst-fire missed ticks
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            players = self.moderator.queue().len(),
            tick_ms = period.as_millis() as u64,
            "moderator starting main loop"
        );
        self.publish().await;

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if self.handle_command(cmd).await {
                        // A fresh lot gets a full second before its first countdown
                        clock.reset();
                    }
                }

                Some(remote) = self.remote_rx.recv() => {
                    if let Err(e) = self.apply_remote(remote).await {
                        warn!(error = %e, "remote snapshot not applied");
                    }
                }

                _ = clock.tick() => {
                    self.on_tick().await;
                }

                _ = shutdown_rx.recv() => {
                    info!("moderator: shutdown signal received");
                    break;
                }
            }
        }

        info!("moderator: main loop exited");
    }

    /// Returns true when a new lot went live
    async fn handle_command(&mut self, cmd: ModeratorCommand) -> bool {
        match cmd {
            ModeratorCommand::Start(reply) => {
                let result = self.moderator.start_auction().map(|_| self.moderator.snapshot());
                let started = result.is_ok();
                if let Err(e) = &result {
                    warn!(error = %e, "start rejected");
                }
                if started {
                    self.publish().await;
                }
                let _ = reply.send(result);
                started
            }
            ModeratorCommand::PlaceBid {
                bidder,
                amount,
                reply,
            } => {
                let result = self.moderator.place_bid(&bidder, amount);
                match &result {
                    Ok(_) => self.publish().await,
                    Err(rejection) => debug!(bidder = %bidder, %amount, %rejection, "bid rejected"),
                }
                let _ = reply.send(result);
                false
            }
            ModeratorCommand::Stop(reply) => {
                let result = self.moderator.stop_auction();
                let response = match result {
                    Ok(outcome) => {
                        if let Some(outcome) = outcome {
                            self.record(outcome).await;
                        }
                        self.publish().await;
                        Ok(self.moderator.snapshot())
                    }
                    Err(e) => Err(e),
                };
                let _ = reply.send(response);
                false
            }
            ModeratorCommand::Advance(reply) => {
                let result = self.moderator.move_to_next_player();
                let advanced = matches!(result, Ok(Advance::NextPlayer(_)));
                if result.is_ok() {
                    self.publish().await;
                }
                let _ = reply.send(result.map(|_| self.moderator.snapshot()));
                advanced
            }
            ModeratorCommand::RemoteUpdate { state, reply } => {
                let result = self.apply_remote(state).await;
                if let Err(e) = &result {
                    warn!(error = %e, "remote snapshot rejected");
                }
                let _ = reply.send(result);
                false
            }
            ModeratorCommand::ReportError(message) => {
                self.moderator.handle_error(message);
                self.publish().await;
                false
            }
        }
    }

    async fn apply_remote(&mut self, remote: AuctionState) -> Result<AuctionState> {
        if let Some(outcome) = self.moderator.apply_remote(remote)? {
            self.record(outcome).await;
        }
        self.publish().await;
        Ok(self.moderator.snapshot())
    }

    async fn on_tick(&mut self) {
        match self.moderator.tick() {
            Ok(TickEvent::Idle) => {}
            Ok(TickEvent::Finalized(outcome)) => {
                self.record(outcome).await;
                self.publish().await;
            }
            Ok(TickEvent::Advanced(index)) => {
                debug!(index, "advanced to next player");
                self.publish().await;
            }
            Ok(_) => self.publish().await,
            Err(e) => {
                error!(error = %e, "tick failed");
                self.moderator.handle_error(e.to_string());
                self.publish().await;
            }
        }
    }

    /// Keep the result and mint for sold players without blocking the loop
    async fn record(&mut self, outcome: AuctionOutcome) {
        self.results.write().await.push(outcome.clone());

        if let AuctionOutcome::Sold { player, winner, .. } = outcome {
            let registry = self.registry.clone();
            let handle = self.handle();
            tokio::spawn(async move {
                let failure = match registry.mint(&winner, &player).await {
                    Ok(receipt) if receipt.success => {
                        info!(
                            player = %player.name,
                            winner = %winner,
                            artifact_id = ?receipt.artifact_id,
                            "artifact minted"
                        );
                        None
                    }
                    Ok(receipt) => Some(receipt.error.unwrap_or_else(|| "mint refused".into())),
                    Err(e) => Some(e.to_string()),
                };
                if let Some(reason) = failure {
                    warn!(player = %player.name, winner = %winner, reason = %reason, "artifact mint failed");
                    let _ = handle
                        .report_error(format!("mint failed for {}: {reason}", player.name))
                        .await;
                }
            });
        }
    }

    async fn publish(&self) {
        self.sync.publish(self.moderator.snapshot()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::{ArtifactReceipt, MockArtifactRegistry};
    use crate::adapters::DryRunRegistry;
    use crate::domain::{AuctionStatus, PlayerRole};
    use rust_decimal_macros::dec;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(format!("p{i}"), format!("P{i}"), PlayerRole::Bowler, dec!(100)))
            .collect()
    }

    fn spawn_service(
        n: usize,
        registry: Arc<dyn ArtifactRegistry>,
    ) -> (ModeratorHandle, broadcast::Sender<()>) {
        let (sync, remote_rx) = StateSync::new(64);
        let service =
            ModeratorService::new(ModeratorConfig::default(), players(n), sync, remote_rx, registry);
        let handle = service.handle();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(service.run(shutdown_rx));
        (handle, shutdown_tx)
    }

    #[tokio::test(start_paused = true)]
    async fn bids_are_serialized_through_the_loop() {
        let (handle, _shutdown) = spawn_service(1, Arc::new(DryRunRegistry));
        let state = handle.start().await.unwrap();
        assert_eq!(state.status, AuctionStatus::Active);

        handle.place_bid("a", dec!(110)).await.unwrap();
        let err = handle.place_bid("b", dec!(105)).await.unwrap_err();
        assert!(matches!(err, AuctionError::BidTooLow { .. }));
        handle.place_bid("b", dec!(121)).await.unwrap();

        let snap = handle.snapshot().await;
        assert_eq!(snap.current_bid, dec!(121));
        assert_eq!(snap.current_bidder.as_deref(), Some("b"));
        assert_eq!(snap.bid_history.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_closes_lot_and_mints_for_winner() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_mint()
            .withf(|winner, player| winner.to_string() == "a" && player.id == "p0")
            .times(1)
            .returning(|_, _| {
                Ok(ArtifactReceipt {
                    success: true,
                    artifact_id: Some("nft-1".into()),
                    error: None,
                })
            });
        let (handle, _shutdown) = spawn_service(1, Arc::new(registry));

        handle.start().await.unwrap();
        handle.place_bid("a", dec!(150)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(15_500)).await;
        let snap = handle.snapshot().await;
        assert_eq!(snap.status, AuctionStatus::Ended);

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(handle.snapshot().await.status, AuctionStatus::Completed);

        let results = handle.results().await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_sold());
    }

    #[tokio::test(start_paused = true)]
    async fn mint_failure_surfaces_as_state_error() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_mint()
            .returning(|_, _| Err(AuctionError::Registry("offline".into())));
        let (handle, _shutdown) = spawn_service(2, Arc::new(registry));

        handle.start().await.unwrap();
        handle.place_bid("a", dec!(150)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(15_500)).await;

        let snap = handle.snapshot().await;
        assert_eq!(snap.status, AuctionStatus::Ended);
        assert!(snap.error.unwrap().contains("offline"));
        // Result stands
        assert!(handle.results().await[0].is_sold());
    }

    #[tokio::test(start_paused = true)]
    async fn remote_snapshot_replaces_state() {
        let (handle, _shutdown) = spawn_service(2, Arc::new(DryRunRegistry));
        handle.start().await.unwrap();

        let mut updates = handle.subscribe();
        let mut remote = handle.snapshot().await;
        remote.bid_history.push(Bid::new("remote", dec!(300)));
        remote.current_bid = dec!(300);
        remote.current_bidder = Some("remote".into());
        handle.sync().on_remote_update(remote).await.unwrap();

        let snap = loop {
            let snap = updates.recv().await.unwrap();
            if snap.current_bid == dec!(300) {
                break snap;
            }
        };
        assert_eq!(snap.current_bidder.as_deref(), Some("remote"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_then_advance() {
        let (handle, _shutdown) = spawn_service(2, Arc::new(DryRunRegistry));
        handle.start().await.unwrap();

        let stopped = handle.stop().await.unwrap();
        assert_eq!(stopped.status, AuctionStatus::Ended);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(handle.snapshot().await.current_player_index, 0);

        let next = handle.advance().await.unwrap();
        assert_eq!(next.status, AuctionStatus::Active);
        assert_eq!(next.current_player_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remote_ended_snapshot_records_and_mints() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_mint()
            .withf(|winner, player| winner.to_string() == "human" && player.id == "p0")
            .times(1)
            .returning(|_, _| {
                Ok(ArtifactReceipt {
                    success: true,
                    artifact_id: Some("nft-remote".into()),
                    error: None,
                })
            });
        let (handle, _shutdown) = spawn_service(2, Arc::new(registry));
        handle.start().await.unwrap();
        handle.place_bid("human", dec!(150)).await.unwrap();

        let mut updates = handle.subscribe();
        let mut remote = handle.snapshot().await;
        remote.status = AuctionStatus::Ended;
        remote.timer = 0;
        handle.sync().on_remote_update(remote).await.unwrap();
        loop {
            if updates.recv().await.unwrap().status == AuctionStatus::Ended {
                break;
            }
        }

        let results = handle.results().await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_sold());
        assert_eq!(results[0].player().id, "p0");

        // Settle restarts from the remote close, then lot 1 goes live
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let snap = handle.snapshot().await;
        assert_eq!(snap.status, AuctionStatus::Active);
        assert_eq!(snap.current_player_index, 1);

        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(handle.snapshot().await.status, AuctionStatus::Completed);
        let results = handle.results().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|o| o.is_sold()).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remote_completed_snapshot_closes_the_auction() {
        let (handle, _shutdown) = spawn_service(2, Arc::new(DryRunRegistry));
        handle.start().await.unwrap();
        handle.place_bid("a", dec!(120)).await.unwrap();

        let mut remote = handle.snapshot().await;
        remote.status = AuctionStatus::Completed;
        remote.timer = 0;
        let applied = handle.apply_remote(remote).await.unwrap();
        assert_eq!(applied.status, AuctionStatus::Completed);

        let results = handle.results().await;
        assert_eq!(results.len(), 1);
        assert!(results[0].is_sold());

        // Terminal: the clock never revives it
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.snapshot().await.status, AuctionStatus::Completed);
        assert_eq!(handle.results().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_remote_snapshot_reports_back_and_keeps_state() {
        let (handle, _shutdown) = spawn_service(2, Arc::new(DryRunRegistry));
        let before = handle.start().await.unwrap();

        let mut remote = before.clone();
        remote.timer = 99;
        let err = handle.apply_remote(remote).await.unwrap_err();
        assert!(matches!(err, AuctionError::InvalidSnapshot(_)));

        let mut remote = before.clone();
        remote.current_player_index = 7;
        let err = handle.apply_remote(remote).await.unwrap_err();
        assert!(matches!(err, AuctionError::InvalidSnapshot(_)));

        let snap = handle.snapshot().await;
        assert_eq!(snap.current_player_index, 0);
        assert!(snap.timer <= 15);
    }
}
