use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info};

use crate::api::state::AppState;

/// WebSocket handler: pushes every published auction snapshot
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before reading the latest so nothing falls in between
    let mut rx = state.moderator.subscribe();
    let initial = state.moderator.snapshot().await;

    let send_task = tokio::spawn(async move {
        let mut next = Some(initial);
        loop {
            let snapshot = match next.take() {
                Some(snapshot) => snapshot,
                None => match rx.recv().await {
                    Ok(snapshot) => snapshot,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "websocket client lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            let json = match serde_json::to_string(&snapshot) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize auction snapshot: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Incoming frames are ignored apart from close
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    send_task.abort();

    info!("WebSocket connection closed");
}
