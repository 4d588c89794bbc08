use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error_response;
use crate::{services::game_service, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenLobby {
    pub host_id: String,
    pub channel: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        // ロビー作成
        // curl -X POST -H 'Content-Type: application/json' -d '{"host_id":"1","channel":"town-square"}' http://localhost:8080/api/lobby/{groupid}/open
        .route("/:groupid/open", post(open_lobby))
        // curl -X POST http://localhost:8080/api/lobby/{groupid}/join/{playerid}
        .route("/:groupid/join/:playerid", post(join_lobby))
        // curl -X POST http://localhost:8080/api/lobby/{groupid}/leave/{playerid}
        .route("/:groupid/leave/:playerid", post(leave_lobby))
        // host のみ
        .route("/:groupid/start/:playerid", post(force_start))
        .route("/:groupid/cancel/:playerid", post(cancel_lobby))
        .with_state(state)
}

pub async fn open_lobby(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(req): Json<OpenLobby>,
) -> Response {
    match game_service::start_lobby(&state, &group_id, &req.host_id, &req.channel).await {
        Ok(public) => (StatusCode::OK, Json(public)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn join_lobby(
    State(state): State<AppState>,
    Path((group_id, player_id)): Path<(String, String)>,
) -> Response {
    match game_service::join(&state, &group_id, &player_id).await {
        Ok(public) => (StatusCode::OK, Json(public)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn leave_lobby(
    State(state): State<AppState>,
    Path((group_id, player_id)): Path<(String, String)>,
) -> Response {
    match game_service::leave(&state, &group_id, &player_id).await {
        Ok(public) => (StatusCode::OK, Json(public)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn force_start(
    State(state): State<AppState>,
    Path((group_id, player_id)): Path<(String, String)>,
) -> Response {
    match game_service::force_start(&state, &group_id, &player_id).await {
        Ok(public) => (StatusCode::OK, Json(public)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn cancel_lobby(
    State(state): State<AppState>,
    Path((group_id, player_id)): Path<(String, String)>,
) -> Response {
    match game_service::cancel(&state, &group_id, &player_id).await {
        Ok(()) => (StatusCode::OK, Json("Lobby cancelled")).into_response(),
        Err(e) => error_response(e),
    }
}
