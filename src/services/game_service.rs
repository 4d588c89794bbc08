//! Phase engine: drives one game per group through
//! lobby → setup → night → day → (night | ended).
//!
//! Every state change for a game happens while holding that game's lock,
//! including timer-driven resolutions. A phase timer carries the
//! [`DeadlineToken`] it was armed with and only acts if the game still holds
//! that exact token, so timers that lost a race with a cancellation or a later
//! phase are no-ops.

use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::error::GameError;
use crate::models::{
    game::{
        ActionMenu, ActionRequest, DeadlineToken, Elimination, Game, GamePhase, GameResult,
        PublicState, SubmitOutcome,
    },
    role::{Faction, Role},
};
use crate::services::{
    action_gateway,
    game_store::GameHandle,
    role_allocator::{self, RoleCounts},
    win_evaluator,
};
use crate::state::AppState;

/// Opens a lobby in `group_id` with the host as its first member.
pub async fn start_lobby(
    state: &AppState,
    group_id: &str,
    host_id: &str,
    channel: &str,
) -> Result<PublicState, GameError> {
    let handle = state
        .games
        .create(Game::new(group_id.into(), host_id.into(), channel.into()))
        .await?;
    let mut game = handle.lock().await;

    let wait = match state.config.lobby_duration {
        Some(duration) => {
            arm_deadline(state, &mut game, duration);
            format!(" The game starts in {} seconds.", duration.as_secs())
        }
        None => String::new(),
    };
    narrate(
        state,
        &game,
        format!(
            "{} opened a Mafia lobby. At least {} players are needed.{}",
            host_id, state.config.required_players(), wait
        ),
    );
    info!(group_id, host_id, "lobby opened");
    Ok(game.public_state())
}

pub async fn join(state: &AppState, group_id: &str, player_id: &str) -> Result<PublicState, GameError> {
    let (_, mut game) = active_game(state, group_id).await?;
    if game.join(player_id, state.config.max_players)? {
        let count = game.players.len();
        narrate(
            state,
            &game,
            format!("{} joined the lobby ({} players).", player_id, count),
        );
        debug!(group_id, player_id, count, "player joined");
    }
    Ok(game.public_state())
}

pub async fn leave(state: &AppState, group_id: &str, player_id: &str) -> Result<PublicState, GameError> {
    let (_, mut game) = active_game(state, group_id).await?;
    if game.leave(player_id)? {
        let count = game.players.len();
        narrate(
            state,
            &game,
            format!("{} left the lobby ({} players).", player_id, count),
        );
        debug!(group_id, player_id, count, "player left");
    }
    Ok(game.public_state())
}

/// Host-only: start now instead of waiting for the lobby deadline. Too few
/// players closes the lobby for good.
pub async fn force_start(
    state: &AppState,
    group_id: &str,
    requester_id: &str,
) -> Result<PublicState, GameError> {
    let (handle, mut game) = active_game(state, group_id).await?;
    if !game.is_host(requester_id) {
        return Err(GameError::NotHost);
    }
    if game.phase != GamePhase::Lobby {
        return Err(GameError::LobbyClosed);
    }
    begin(state, &handle, &mut game).await?;
    Ok(game.public_state())
}

/// Host-only, lobby-only.
pub async fn cancel(state: &AppState, group_id: &str, requester_id: &str) -> Result<(), GameError> {
    let (handle, mut game) = active_game(state, group_id).await?;
    if !game.is_host(requester_id) {
        return Err(GameError::NotHost);
    }
    if game.phase != GamePhase::Lobby {
        return Err(GameError::LobbyClosed);
    }
    narrate(state, &game, "The lobby was cancelled by the host.");
    close(state, &handle, &mut game).await;
    info!(group_id, "lobby cancelled");
    Ok(())
}

/// Ends the game in any phase. Host or group admin only.
pub async fn stop(state: &AppState, group_id: &str, requester_id: &str) -> Result<(), GameError> {
    let (handle, mut game) = active_game(state, group_id).await?;
    if !game.is_host(requester_id) && !state.roster.is_admin(group_id, requester_id) {
        return Err(GameError::NotHostOrAdmin);
    }
    narrate(
        state,
        &game,
        format!("The game was stopped by {}.", requester_id),
    );
    close(state, &handle, &mut game).await;
    info!(group_id, requester_id, "game stopped");
    Ok(())
}

/// Records a secret action. Investigations are answered immediately, both in
/// the return value and privately to the detective.
pub async fn submit_action(
    state: &AppState,
    group_id: &str,
    request: ActionRequest,
) -> Result<SubmitOutcome, GameError> {
    let (_, mut game) = active_game(state, group_id).await?;
    let outcome = action_gateway::submit(&mut game, &request)?;

    if let SubmitOutcome::Investigated { target_id, verdict } = &outcome {
        tell(
            state,
            &game,
            &request.actor_id,
            format!("Your investigation reveals: {} is {}.", target_id, verdict),
        );
    }
    Ok(outcome)
}

/// What `actor_id` may do right now, for building their action prompt.
pub async fn action_menu(
    state: &AppState,
    group_id: &str,
    actor_id: &str,
) -> Result<ActionMenu, GameError> {
    let (_, game) = active_game(state, group_id).await?;
    action_gateway::menu_for(&game, actor_id, |p| state.roster.is_present(group_id, p))
}

pub async fn get_public_state(state: &AppState, group_id: &str) -> Result<PublicState, GameError> {
    let (_, game) = active_game(state, group_id).await?;
    Ok(game.public_state())
}

/// Entry point of every phase timer.
pub async fn on_deadline(state: &AppState, group_id: &str, token: DeadlineToken) {
    let Some(handle) = state.games.get(group_id).await else {
        debug!(group_id, phase = %token.phase, "deadline fired after the game was removed");
        return;
    };
    let mut game = handle.lock().await;
    if game.is_over() || game.pending_deadline != Some(token) {
        debug!(group_id, phase = %token.phase, round = token.round, "stale deadline ignored");
        return;
    }
    game.pending_deadline = None;
    // This task is the timer; dropping the handle keeps it from aborting itself.
    game.timer = None;

    match token.phase {
        GamePhase::Lobby => {
            if let Err(e) = begin(state, &handle, &mut game).await {
                info!(group_id, error = %e, "lobby expired without starting");
            }
        }
        GamePhase::Night => resolve_night(state, &handle, &mut game).await,
        GamePhase::Day => resolve_day(state, &handle, &mut game).await,
        GamePhase::Setup | GamePhase::Ended => {}
    }
}

async fn active_game(
    state: &AppState,
    group_id: &str,
) -> Result<(GameHandle, OwnedMutexGuard<Game>), GameError> {
    let handle = state
        .games
        .get(group_id)
        .await
        .ok_or(GameError::NoActiveGame)?;
    let game = handle.clone().lock_owned().await;
    if game.is_over() {
        return Err(GameError::NoActiveGame);
    }
    Ok((handle, game))
}

/// Setup: deal roles, announce the counts, reveal each role privately, and
/// go straight to the first night.
async fn begin(state: &AppState, handle: &GameHandle, game: &mut Game) -> Result<(), GameError> {
    let have = game.players.len();
    let need = state.config.required_players();
    if have < need {
        narrate(
            state,
            game,
            format!(
                "Not enough players to start ({}/{}). The lobby has been closed.",
                have, need
            ),
        );
        close(state, handle, game).await;
        return Err(GameError::NotEnoughPlayers { have, need });
    }

    let roles = role_allocator::allocate(&game.players, &mut rand::thread_rng());
    game.enter_setup(roles);
    info!(group_id = %game.group_id, players = have, "game setup");
    debug!(group_id = %game.group_id, roles = ?game.roles, "roles dealt");

    narrate(
        state,
        game,
        format!(
            "The game begins with {} players: {}.",
            have,
            RoleCounts::for_players(have).describe()
        ),
    );

    let mafia: Vec<String> = game
        .players
        .iter()
        .filter(|p| game.role_of(p) == Some(Role::Mafia))
        .cloned()
        .collect();
    for player in &game.players {
        let role = game.role_of(player).unwrap_or(Role::Villager);
        let mut text = format!("You are a {}.", role);
        if role == Role::Mafia && mafia.len() > 1 {
            let partners: Vec<&str> = mafia
                .iter()
                .filter(|m| *m != player)
                .map(String::as_str)
                .collect();
            text.push_str(&format!(" Your fellow Mafia: {}.", partners.join(", ")));
        }
        tell(state, game, player, text);
    }

    open_night(state, game);
    Ok(())
}

fn open_night(state: &AppState, game: &mut Game) {
    game.enter_night();
    info!(group_id = %game.group_id, round = game.round, "night begins");
    narrate(
        state,
        game,
        format!(
            "Night {} falls. Those with night roles have {} seconds to act.",
            game.round,
            state.config.night_duration.as_secs()
        ),
    );

    let actors: Vec<String> = game
        .living_players()
        .into_iter()
        .filter(|p| game.role_of(p).and_then(Role::night_action).is_some())
        .cloned()
        .collect();
    for actor in actors {
        let group_id = game.group_id.clone();
        match action_gateway::menu_for(game, &actor, |p| state.roster.is_present(&group_id, p)) {
            Ok(menu) => tell(
                state,
                game,
                &actor,
                format!(
                    "Night {}: choose someone to {}: {}",
                    menu.round,
                    menu.category,
                    menu.targets.join(", ")
                ),
            ),
            Err(e) => debug!(group_id = %game.group_id, error = %e, "no prompt for actor"),
        }
    }

    let duration = state.config.night_duration;
    arm_deadline(state, game, duration);
}

fn open_day(state: &AppState, game: &mut Game) {
    game.enter_day();
    info!(group_id = %game.group_id, round = game.round, "day begins");
    let alive: Vec<&str> = game.living_players().into_iter().map(String::as_str).collect();
    narrate(
        state,
        game,
        format!(
            "Day {}. Discuss and vote within {} seconds. Alive: {}.",
            game.round,
            state.config.day_duration.as_secs(),
            alive.join(", ")
        ),
    );

    let duration = state.config.day_duration;
    arm_deadline(state, game, duration);
}

async fn resolve_night(state: &AppState, handle: &GameHandle, game: &mut Game) {
    let outcome = game.resolve_night();
    match &outcome {
        Elimination::Eliminated(victim) => {
            narrate(
                state,
                game,
                format!("Dawn breaks. {} was killed in the night.", victim),
            );
            tell(state, game, victim, "You were killed during the night.");
        }
        Elimination::Saved(_) | Elimination::Nobody => {
            narrate(state, game, "Dawn breaks. Nobody was eliminated last night.");
        }
    }
    info!(group_id = %game.group_id, round = game.round, outcome = ?outcome, "night resolved");
    advance(state, handle, game, GamePhase::Day).await;
}

async fn resolve_day(state: &AppState, handle: &GameHandle, game: &mut Game) {
    let outcome = game.resolve_day();
    match &outcome {
        Elimination::Eliminated(condemned) => {
            narrate(
                state,
                game,
                format!("The town has voted. {} was eliminated.", condemned),
            );
            tell(state, game, condemned, "You were eliminated by the town vote.");
        }
        Elimination::Saved(_) | Elimination::Nobody => {
            narrate(state, game, "The town could not decide. Nobody was eliminated.");
        }
    }
    info!(group_id = %game.group_id, round = game.round, outcome = ?outcome, "day resolved");
    advance(state, handle, game, GamePhase::Night).await;
}

async fn advance(state: &AppState, handle: &GameHandle, game: &mut Game, next: GamePhase) {
    match win_evaluator::evaluate(&game.living, &game.roles) {
        GameResult::InProgress if next == GamePhase::Day => open_day(state, game),
        GameResult::InProgress => open_night(state, game),
        decided => finish(state, handle, game, decided).await,
    }
}

/// Announces the winner, reveals every role, pays out, and removes the game.
async fn finish(state: &AppState, handle: &GameHandle, game: &mut Game, result: GameResult) {
    let Some(winner) = result.winner() else {
        return;
    };
    let headline = match winner {
        Faction::Town => "The Town wins! Every Mafia member has been eliminated.",
        Faction::Mafia => "The Mafia wins! They now control the town.",
    };
    let reveal: Vec<String> = game
        .players
        .iter()
        .map(|p| format!("{} ({})", p, game.role_of(p).unwrap_or(Role::Villager)))
        .collect();
    narrate(
        state,
        game,
        format!("{} Roles: {}.", headline, reveal.join(", ")),
    );
    info!(group_id = %game.group_id, round = game.round, winner = %winner, "game over");

    for player in &game.players {
        let faction = game.role_of(player).unwrap_or(Role::Villager).faction();
        let reward = if faction == winner {
            state.config.winner_reward
        } else {
            state.config.loser_reward
        };
        if let Err(e) = state
            .rewards
            .award_player(&game.group_id, player, reward.coins, reward.xp)
        {
            warn!(group_id = %game.group_id, player_id = %player, error = %e, "reward not issued");
        }
    }

    close(state, handle, game).await;
}

/// Marks the game over, disarms its timer and drops it from the store.
async fn close(state: &AppState, handle: &GameHandle, game: &mut Game) {
    game.enter_ended();
    if let Some(timer) = game.timer.take() {
        timer.abort();
    }
    state.games.remove(&game.group_id, handle).await;
}

fn arm_deadline(state: &AppState, game: &mut Game, duration: Duration) {
    let token = DeadlineToken::new(game.phase, game.round);
    game.pending_deadline = Some(token);

    let task_state = state.clone();
    let group_id = game.group_id.clone();
    let task = tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        on_deadline(&task_state, &group_id, token).await;
    });
    if let Some(previous) = game.timer.replace(task.abort_handle()) {
        previous.abort();
    }
}

fn narrate(state: &AppState, game: &Game, text: impl AsRef<str>) {
    if let Err(e) = state.notifier.narrate(&game.channel, text.as_ref()) {
        warn!(group_id = %game.group_id, error = %e, "narration not delivered");
    }
}

fn tell(state: &AppState, game: &Game, player_id: &str, text: impl AsRef<str>) {
    if let Err(e) = state.notifier.notify_private(player_id, text.as_ref()) {
        warn!(group_id = %game.group_id, player_id, error = %e, "private notice not delivered");
    }
}
