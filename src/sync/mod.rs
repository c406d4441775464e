//! State Sync Channel
//!
//! Outbound: every snapshot the moderator publishes is fanned out to all
//! subscribers (agents, WebSocket clients) and cached as `latest`.
//! Inbound: externally pushed snapshots are validated here and queued for the
//! moderator, which overwrites its state with them (last writer wins).
//!
//! There is no version counter on snapshots, so two concurrent writers can
//! silently overwrite each other.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, warn};

use crate::domain::AuctionState;
use crate::error::{AuctionError, Result};

const INBOUND_BUFFER: usize = 32;

#[derive(Clone)]
pub struct StateSync {
    outbound: broadcast::Sender<AuctionState>,
    inbound: mpsc::Sender<AuctionState>,
    latest: Arc<RwLock<AuctionState>>,
}

impl StateSync {
    /// Create the channel. The returned receiver carries validated remote
    /// snapshots and belongs to the moderator service.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AuctionState>) {
        let (outbound, _) = broadcast::channel(capacity.max(1));
        let (inbound, remote_rx) = mpsc::channel(INBOUND_BUFFER);
        let sync = Self {
            outbound,
            inbound,
            latest: Arc::new(RwLock::new(AuctionState::new())),
        };
        (sync, remote_rx)
    }

    /// Broadcast a full snapshot and make it the cached latest
    pub async fn publish(&self, state: AuctionState) {
        *self.latest.write().await = state.clone();
        // No subscribers is fine; the snapshot is still cached
        if let Ok(receivers) = self.outbound.send(state) {
            debug!(receivers, "state published");
        }
    }

    /// Accept an externally pushed snapshot after schema validation
    pub async fn on_remote_update(&self, state: AuctionState) -> Result<()> {
        if let Err(e) = state.validate() {
            warn!(error = %e, "rejected malformed remote snapshot");
            return Err(e);
        }
        self.inbound
            .send(state)
            .await
            .map_err(|_| AuctionError::ChannelClosed("remote state"))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuctionState> {
        self.outbound.subscribe()
    }

    pub async fn latest(&self) -> AuctionState {
        self.latest.read().await.clone()
    }
}
