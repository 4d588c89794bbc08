use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::error_response;
use crate::state::AppState;
use crate::{models::game::ActionRequest, services::game_service};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest(
            "/:groupid",
            Router::new()
                .route("/state", get(get_public_state))
                .route("/menu/:playerid", get(get_action_menu))
                .route("/actions", post(submit_action))
                .route("/stop/:playerid", post(stop_game)),
        )
        .with_state(state)
}

pub async fn get_public_state(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Response {
    match game_service::get_public_state(&state, &group_id).await {
        Ok(public) => (StatusCode::OK, Json(public)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_action_menu(
    State(state): State<AppState>,
    Path((group_id, player_id)): Path<(String, String)>,
) -> Response {
    match game_service::action_menu(&state, &group_id, &player_id).await {
        Ok(menu) => (StatusCode::OK, Json(menu)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn submit_action(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Response {
    match game_service::submit_action(&state, &group_id, request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn stop_game(
    State(state): State<AppState>,
    Path((group_id, player_id)): Path<(String, String)>,
) -> Response {
    match game_service::stop(&state, &group_id, &player_id).await {
        Ok(()) => (StatusCode::OK, Json("Game stopped")).into_response(),
        Err(e) => error_response(e),
    }
}
