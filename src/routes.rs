use crate::error::{ErrorKind, GameError};
use crate::state::AppState;
use crate::utils::websocket;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

mod game;
mod lobby;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/lobby", lobby::routes(state.clone()))
        .nest("/api/game", game::routes(state.clone()))
        .nest(
            "/api/feed",
            Router::new()
                // websocat ws://localhost:8080/api/feed/{channel}?player_id={playerid}
                .route("/:channel", get(websocket::handler))
                .with_state(state),
        )
}

pub(crate) fn status_for(error: &GameError) -> StatusCode {
    match error {
        GameError::NoActiveGame => StatusCode::NOT_FOUND,
        GameError::NotHost | GameError::NotHostOrAdmin => StatusCode::FORBIDDEN,
        GameError::GameAlreadyExists => StatusCode::CONFLICT,
        e if e.kind() == ErrorKind::Stale => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

pub(crate) fn error_response(error: GameError) -> Response {
    (status_for(&error), Json(error.to_string())).into_response()
}
