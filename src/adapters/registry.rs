//! Artifact registry — mints a collectible for every sold player.
//!
//! Failures are reported to the caller, who logs them; a finalized result is
//! never rolled back because minting failed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::Player;
use crate::error::{AuctionError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactReceipt {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactRegistry: Send + Sync {
    async fn mint(&self, winner: &str, player: &Player) -> Result<ArtifactReceipt>;
}

/// Logs the mint and hands back a synthetic artifact id
#[derive(Debug, Clone, Default)]
pub struct DryRunRegistry;

#[async_trait]
impl ArtifactRegistry for DryRunRegistry {
    async fn mint(&self, winner: &str, player: &Player) -> Result<ArtifactReceipt> {
        let artifact_id = format!("dry-{}", Uuid::new_v4());
        info!(winner, player = %player.name, artifact_id = %artifact_id, "dry-run mint");
        Ok(ArtifactReceipt {
            success: true,
            artifact_id: Some(artifact_id),
            error: None,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintRequest<'a> {
    recipient: &'a str,
    player: &'a Player,
}

/// POSTs `{ recipient, player }` as JSON to a minting endpoint
#[derive(Debug, Clone)]
pub struct HttpArtifactRegistry {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpArtifactRegistry {
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ArtifactRegistry for HttpArtifactRegistry {
    async fn mint(&self, winner: &str, player: &Player) -> Result<ArtifactReceipt> {
        debug!(endpoint = %self.endpoint, winner, player = %player.id, "minting artifact");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&MintRequest {
                recipient: winner,
                player,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuctionError::Registry(format!("{status}: {body}")));
        }
        Ok(response.json::<ArtifactReceipt>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerRole;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn dry_run_mint_succeeds() {
        let player = Player::new("p1", "Opener", PlayerRole::Batsman, dec!(100));
        let receipt = DryRunRegistry.mint("bot-mumbai", &player).await.unwrap();
        assert!(receipt.success);
        assert!(receipt.artifact_id.is_some());
    }

    #[test]
    fn receipt_parses_registry_response() {
        let receipt: ArtifactReceipt =
            serde_json::from_str(r#"{"success":true,"artifactId":"42"}"#).unwrap();
        assert_eq!(receipt.artifact_id.as_deref(), Some("42"));
    }
}
