use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

use mafia_engine::{
    app,
    models::{
        config::EngineConfig,
        game::{ActionMenu, GamePhase, PublicState, SubmitOutcome},
        role::{ActionCategory, Role},
    },
    utils::test_setup::setup_test_env,
    AppState,
};

const GROUP: &str = "guild-7";

fn post(uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder().method("POST").uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

fn test_app() -> (AppState, Router) {
    setup_test_env();
    let config = EngineConfig {
        lobby_duration: None,
        ..EngineConfig::default()
    };
    let state = AppState::with_config(config);
    let router = app::create_app_with_state(state.clone());
    (state, router)
}

async fn open_full_lobby(app: &Router) {
    let (status, _) = send(
        app,
        post(
            &format!("/api/lobby/{}/open", GROUP),
            Some(json!({ "host_id": "p1", "channel": "square" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for i in 2..=5 {
        let (status, _) = send(app, post(&format!("/api/lobby/{}/join/p{}", GROUP, i), None)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test(start_paused = true)]
async fn test_lobby_to_first_night_over_http() {
    let (_, app) = test_app();
    open_full_lobby(&app).await;

    let (status, body) = send(&app, get(&format!("/api/game/{}/state", GROUP))).await;
    assert_eq!(status, StatusCode::OK);
    let public: PublicState = parse(&body);
    assert_eq!(public.phase, GamePhase::Lobby);
    assert_eq!(public.player_count, 5);

    let (status, _) = send(&app, post(&format!("/api/lobby/{}/start/p2", GROUP), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, post(&format!("/api/lobby/{}/start/p1", GROUP), None)).await;
    assert_eq!(status, StatusCode::OK);
    let public: PublicState = parse(&body);
    assert_eq!(public.phase, GamePhase::Night);
    assert_eq!(public.round, 1);
    assert_eq!(public.living_count, 5);
}

#[tokio::test(start_paused = true)]
async fn test_menu_and_kill_submission_over_http() {
    let (state, app) = test_app();
    open_full_lobby(&app).await;
    send(&app, post(&format!("/api/lobby/{}/start/p1", GROUP), None)).await;

    let mafia = {
        let handle = state.games.get(GROUP).await.unwrap();
        let game = handle.lock().await;
        game.players
            .iter()
            .find(|p| game.role_of(p) == Some(Role::Mafia))
            .cloned()
            .unwrap()
    };

    let (status, body) = send(&app, get(&format!("/api/game/{}/menu/{}", GROUP, mafia))).await;
    assert_eq!(status, StatusCode::OK);
    let menu: ActionMenu = parse(&body);
    assert_eq!(menu.category, ActionCategory::Kill);
    let target = menu.targets.iter().find(|t| **t != mafia).unwrap().clone();

    let request = json!({
        "actor_id": mafia,
        "phase": menu.phase,
        "round": menu.round,
        "category": menu.category,
        "target_id": target,
    });
    let (status, body) = send(
        &app,
        post(&format!("/api/game/{}/actions", GROUP), Some(request.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<SubmitOutcome>(&body), SubmitOutcome::Recorded);

    // The same menu is stale once the night is over.
    tokio::time::sleep(std::time::Duration::from_secs(61)).await;
    let (status, _) = send(
        &app,
        post(&format!("/api/game/{}/actions", GROUP), Some(request)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_group_is_not_found() {
    let (_, app) = test_app();
    let (status, _) = send(&app, get("/api/game/nowhere/state")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, post("/api/lobby/nowhere/join/p1", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_stop_over_http() {
    let (state, app) = test_app();
    open_full_lobby(&app).await;
    send(&app, post(&format!("/api/lobby/{}/start/p1", GROUP), None)).await;

    let (status, _) = send(&app, post(&format!("/api/game/{}/stop/p3", GROUP), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, post(&format!("/api/game/{}/stop/p1", GROUP), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!state.games.contains(GROUP).await);
}
