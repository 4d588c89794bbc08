use std::collections::{HashMap, HashSet};

use crate::models::{
    game::GameResult,
    player::PlayerId,
    role::{Faction, Role},
};

/// Decides the game from who is still alive. Pure; safe to call repeatedly.
pub fn evaluate(living: &HashSet<PlayerId>, roles: &HashMap<PlayerId, Role>) -> GameResult {
    let (mafia, town) = living
        .iter()
        .filter_map(|p| roles.get(p))
        .fold((0usize, 0usize), |(mafia, town), role| match role.faction() {
            Faction::Mafia => (mafia + 1, town),
            Faction::Town => (mafia, town + 1),
        });

    if mafia == 0 {
        GameResult::TownWin
    } else if mafia >= town {
        GameResult::MafiaWin
    } else {
        GameResult::InProgress
    }
}
