use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState, websocket::websocket_handler};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Auction endpoints
        .route(
            "/api/auction/state",
            get(handlers::get_state).post(handlers::replace_state),
        )
        .route("/api/auction/start", post(handlers::start_auction))
        .route("/api/auction/stop", post(handlers::stop_auction))
        .route("/api/auction/advance", post(handlers::advance_auction))
        .route("/api/auction/bid", post(handlers::place_bid))
        .route("/api/auction/results", get(handlers::get_results))
        // Team endpoints
        .route("/api/teams", get(handlers::get_teams))
        // System endpoints
        .route("/health", get(handlers::health_handler))
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        .with_state(state)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{demo_players, DryRunRegistry};
    use crate::domain::{default_personalities, AuctionState, AuctionStatus, BidderWallet};
    use crate::moderator::{ModeratorConfig, ModeratorService};
    use crate::sync::StateSync;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{broadcast, RwLock};
    use tower::ServiceExt;

    fn app() -> (Router, broadcast::Sender<()>) {
        let (sync, remote_rx) = StateSync::new(64);
        let service = ModeratorService::new(
            ModeratorConfig::default(),
            demo_players(),
            sync,
            remote_rx,
            Arc::new(DryRunRegistry),
        );
        let handle = service.handle();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(service.run(shutdown_rx));

        let state = AppState::new(
            handle,
            BidderWallet::human(dec!(1000)),
            default_personalities(),
            Arc::new(RwLock::new(HashMap::new())),
            dec!(1000),
        );
        (create_router(state), shutdown_tx)
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_auction_status() {
        let (router, _shutdown) = app();
        let response = router.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["auction"], "pending");
    }

    #[tokio::test]
    async fn bid_before_start_conflicts() {
        let (router, _shutdown) = app();
        let response = router
            .oneshot(post("/api/auction/bid", r#"{"amount":"3"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn human_bid_is_debited_only_when_accepted() {
        let (router, _shutdown) = app();

        let response = router
            .clone()
            .oneshot(post("/api/auction/start", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let state: AuctionState = serde_json::from_value(json(response).await).unwrap();
        assert_eq!(state.status, AuctionStatus::Active);

        let response = router
            .clone()
            .oneshot(post("/api/auction/bid", r#"{"bidder":"human","amount":"3"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["balance"], "997");

        // Still leading: a self-raise is refused and nothing is debited
        let response = router
            .clone()
            .oneshot(post("/api/auction/bid", r#"{"amount":"4"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = router.oneshot(get("/api/teams")).await.unwrap();
        let body = json(response).await;
        assert_eq!(body["humanBalance"], "997");
        assert_eq!(body["teams"].as_array().unwrap().len(), 4);
        assert_eq!(body["teams"][0]["balance"], "1000");
    }

    #[tokio::test]
    async fn bid_boundary_rejects_bad_input() {
        let (router, _shutdown) = app();
        router
            .clone()
            .oneshot(post("/api/auction/start", ""))
            .await
            .unwrap();

        let response = router
            .clone()
            .oneshot(post("/api/auction/bid", r#"{"bidder":"bot-mumbai","amount":"5"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router
            .oneshot(post("/api/auction/bid", r#"{"amount":"5000"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_remote_snapshot_is_rejected() {
        let (router, _shutdown) = app();
        let mut bogus = AuctionState::new();
        bogus.status = AuctionStatus::Active;

        let response = router
            .oneshot(post(
                "/api/auction/state",
                &serde_json::to_string(&bogus).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn results_start_empty() {
        let (router, _shutdown) = app();
        let response = router.oneshot(get("/api/auction/results")).await.unwrap();
        let body = json(response).await;
        assert_eq!(body["sold"], 0);
        assert_eq!(body["outcomes"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn remote_snapshot_outside_clock_bounds_is_rejected() {
        let (router, _shutdown) = app();
        let response = router
            .clone()
            .oneshot(post("/api/auction/start", ""))
            .await
            .unwrap();
        let mut remote: AuctionState = serde_json::from_value(json(response).await).unwrap();
        remote.timer = 99;

        let response = router
            .clone()
            .oneshot(post(
                "/api/auction/state",
                &serde_json::to_string(&remote).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router.oneshot(get("/api/auction/state")).await.unwrap();
        let current: AuctionState = serde_json::from_value(json(response).await).unwrap();
        assert!(current.timer <= 15);
    }

    #[tokio::test]
    async fn remote_snapshot_is_applied_before_responding() {
        let (router, _shutdown) = app();
        let response = router
            .clone()
            .oneshot(post("/api/auction/start", ""))
            .await
            .unwrap();
        let mut remote: AuctionState = serde_json::from_value(json(response).await).unwrap();
        remote.status = AuctionStatus::Ended;
        remote.timer = 0;

        let response = router
            .clone()
            .oneshot(post(
                "/api/auction/state",
                &serde_json::to_string(&remote).unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["status"], "ended");

        let response = router.oneshot(get("/api/auction/results")).await.unwrap();
        let body = json(response).await;
        assert_eq!(body["outcomes"].as_array().unwrap().len(), 1);
        assert_eq!(body["sold"], 0);
    }
}
