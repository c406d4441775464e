use axum::{extract::State, Json};

use crate::api::{state::AppState, types::*};

/// GET /api/teams
pub async fn get_teams(State(state): State<AppState>) -> Json<TeamsResponse> {
    let balances = state.balances.read().await;
    let teams = state
        .teams
        .iter()
        .map(|personality| TeamView {
            balance: balances
                .get(&personality.wallet)
                .copied()
                .unwrap_or(state.default_balance),
            personality: personality.clone(),
        })
        .collect();

    Json(TeamsResponse {
        teams,
        human_balance: state.human.read().await.balance,
    })
}
