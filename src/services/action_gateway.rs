use tracing::debug;

use crate::error::GameError;
use crate::models::{
    game::{ActionMenu, ActionRequest, Game, GamePhase, SubmitOutcome, Verdict},
    role::{ActionCategory, Role},
};

/// Validates and records one secret action. Checks run in a fixed order and
/// the first failure is returned; a rejected request never touches the buffers.
pub fn submit(game: &mut Game, request: &ActionRequest) -> Result<SubmitOutcome, GameError> {
    let actor = request.actor_id.as_str();
    let target = request.target_id.as_str();

    if game.is_over() {
        return Err(GameError::NoActiveGame);
    }
    if !game.is_living(actor) {
        return Err(GameError::ActorNotLiving);
    }
    if request.phase != game.phase || request.round != game.round {
        return Err(GameError::PhaseNotActive);
    }
    check_target(game, actor, request.category, target)?;

    let role = game.role_of(actor).ok_or(GameError::ActorNotLiving)?;
    if !role.can_perform(request.category) || request.category.phase() != game.phase {
        return Err(GameError::ActionNotPermitted(request.category));
    }

    let outcome = match request.category {
        ActionCategory::Kill => {
            game.night.kills.record(actor, target);
            SubmitOutcome::Recorded
        }
        ActionCategory::Save => {
            game.night.save = Some(target.to_string());
            SubmitOutcome::Recorded
        }
        ActionCategory::Investigate => {
            game.night.investigations.record(actor, target);
            let verdict = if game.role_of(target) == Some(Role::Mafia) {
                Verdict::Mafia
            } else {
                Verdict::NotMafia
            };
            SubmitOutcome::Investigated {
                target_id: target.to_string(),
                verdict,
            }
        }
        ActionCategory::Vote => {
            game.day.votes.record(actor, target);
            SubmitOutcome::Recorded
        }
    };

    debug!(
        group_id = %game.group_id,
        round = game.round,
        category = %request.category,
        "action recorded"
    );
    Ok(outcome)
}

fn check_target(
    game: &Game,
    actor: &str,
    category: ActionCategory,
    target: &str,
) -> Result<(), GameError> {
    let eligible = match category {
        ActionCategory::Kill | ActionCategory::Save | ActionCategory::Vote => {
            game.is_living(target)
        }
        ActionCategory::Investigate => game.has_player(target),
    };
    if !eligible || (category.excludes_self() && actor == target) {
        return Err(GameError::InvalidTarget);
    }
    Ok(())
}

/// The action `actor` may take right now and whom they may target.
/// `is_present` filters out players who have left the group.
pub fn menu_for(
    game: &Game,
    actor: &str,
    is_present: impl Fn(&str) -> bool,
) -> Result<ActionMenu, GameError> {
    if game.is_over() {
        return Err(GameError::NoActiveGame);
    }
    if !game.is_living(actor) {
        return Err(GameError::ActorNotLiving);
    }
    let role = game.role_of(actor).ok_or(GameError::ActorNotLiving)?;
    let category = match game.phase {
        GamePhase::Night => role
            .night_action()
            .ok_or(GameError::ActionNotPermitted(ActionCategory::Kill))?,
        GamePhase::Day => ActionCategory::Vote,
        _ => return Err(GameError::PhaseNotActive),
    };

    let targets = game
        .living_players()
        .into_iter()
        .filter(|p| !(category.excludes_self() && p.as_str() == actor))
        .filter(|p| is_present(p))
        .cloned()
        .collect();

    Ok(ActionMenu {
        phase: game.phase,
        round: game.round,
        category,
        targets,
    })
}
