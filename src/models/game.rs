use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::task::AbortHandle;
use uuid::Uuid;

use super::player::{ChannelRef, GroupId, PlayerId};
use super::role::{ActionCategory, Faction, Role};
use crate::error::GameError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Lobby,
    Setup,
    Night,
    Day,
    Ended,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameResult {
    InProgress,
    TownWin,
    MafiaWin,
}

impl GameResult {
    pub fn winner(self) -> Option<Faction> {
        match self {
            GameResult::InProgress => None,
            GameResult::TownWin => Some(Faction::Town),
            GameResult::MafiaWin => Some(Faction::Mafia),
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Lobby => write!(f, "lobby"),
            GamePhase::Setup => write!(f, "setup"),
            GamePhase::Night => write!(f, "night"),
            GamePhase::Day => write!(f, "day"),
            GamePhase::Ended => write!(f, "ended"),
        }
    }
}

/// Secret ballots for one category in one round, kept in receipt order.
///
/// Each actor holds at most one ballot. Recording again replaces the old
/// ballot and counts as a new receipt, so it moves to the back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballots {
    entries: Vec<(PlayerId, PlayerId)>,
}

impl Ballots {
    pub fn record(&mut self, actor: &str, target: &str) {
        self.entries.retain(|(a, _)| a != actor);
        self.entries.push((actor.to_string(), target.to_string()));
    }

    pub fn target_of(&self, actor: &str) -> Option<&PlayerId> {
        self.entries
            .iter()
            .find(|(a, _)| a == actor)
            .map(|(_, t)| t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Target with the strictly highest count. Ties go to the target that
    /// reached its count first in receipt order.
    pub fn leader(&self) -> Option<PlayerId> {
        let mut tally: Vec<(&PlayerId, usize)> = Vec::new();
        for (_, target) in &self.entries {
            match tally.iter_mut().find(|(t, _)| *t == target) {
                Some((_, count)) => *count += 1,
                None => tally.push((target, 1)),
            }
        }

        let mut best: Option<(&PlayerId, usize)> = None;
        for (target, count) in tally {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((target, count));
            }
        }
        best.map(|(target, _)| target.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NightBuffer {
    pub kills: Ballots,
    pub save: Option<PlayerId>,
    pub investigations: Ballots,
}

impl NightBuffer {
    pub fn clear(&mut self) {
        self.kills.clear();
        self.save = None;
        self.investigations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.kills.is_empty() && self.save.is_none() && self.investigations.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DayBuffer {
    pub votes: Ballots,
}

impl DayBuffer {
    pub fn clear(&mut self) {
        self.votes.clear();
    }
}

/// Identifies one armed phase timer. A timer may only resolve the phase it
/// was armed for; any mismatch with the game's current token makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineToken {
    pub id: Uuid,
    pub phase: GamePhase,
    pub round: u32,
}

impl DeadlineToken {
    pub fn new(phase: GamePhase, round: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase,
            round,
        }
    }
}

/// What a resolution did to the living set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elimination {
    Eliminated(PlayerId),
    /// The kill candidate was protected by the Medic.
    Saved(PlayerId),
    Nobody,
}

#[derive(Debug)]
pub struct Game {
    pub group_id: GroupId,
    pub host_id: PlayerId,
    pub channel: ChannelRef,
    pub phase: GamePhase,
    /// Lobby joiners in join order; frozen once setup begins.
    pub players: Vec<PlayerId>,
    pub roles: HashMap<PlayerId, Role>,
    pub living: HashSet<PlayerId>,
    pub round: u32,
    pub night: NightBuffer,
    pub day: DayBuffer,
    pub pending_deadline: Option<DeadlineToken>,
    pub timer: Option<AbortHandle>,
}

impl Game {
    pub fn new(group_id: GroupId, host_id: PlayerId, channel: ChannelRef) -> Self {
        Game {
            group_id,
            players: vec![host_id.clone()],
            host_id,
            channel,
            phase: GamePhase::Lobby,
            roles: HashMap::new(),
            living: HashSet::new(),
            round: 0,
            night: NightBuffer::default(),
            day: DayBuffer::default(),
            pending_deadline: None,
            timer: None,
        }
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }

    pub fn is_living(&self, player_id: &str) -> bool {
        self.living.contains(player_id)
    }

    pub fn role_of(&self, player_id: &str) -> Option<Role> {
        self.roles.get(player_id).copied()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Living players in join order.
    pub fn living_players(&self) -> Vec<&PlayerId> {
        self.players
            .iter()
            .filter(|p| self.living.contains(*p))
            .collect()
    }

    /// Adds a lobby member. Returns false when the player was already in.
    pub fn join(&mut self, player_id: &str, max_players: usize) -> Result<bool, GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::LobbyClosed);
        }
        if self.has_player(player_id) {
            return Ok(false);
        }
        if self.players.len() >= max_players {
            return Err(GameError::LobbyFull);
        }
        self.players.push(player_id.to_string());
        Ok(true)
    }

    /// Removes a lobby member. Returns false when the player was not in.
    pub fn leave(&mut self, player_id: &str) -> Result<bool, GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::LobbyClosed);
        }
        let before = self.players.len();
        self.players.retain(|p| p != player_id);
        Ok(self.players.len() != before)
    }

    /// Freezes the roster and hands out roles. Assignments for identities
    /// that never joined are ignored.
    pub fn enter_setup(&mut self, roles: HashMap<PlayerId, Role>) {
        self.phase = GamePhase::Setup;
        self.roles = roles
            .into_iter()
            .filter(|(player, _)| self.players.contains(player))
            .collect();
        for player in &self.players {
            self.roles.entry(player.clone()).or_insert(Role::Villager);
        }
        self.living = self.players.iter().cloned().collect();
        self.round = 0;
        self.night.clear();
        self.day.clear();
    }

    pub fn enter_night(&mut self) {
        self.round += 1;
        self.phase = GamePhase::Night;
        self.night.clear();
        self.day.clear();
    }

    pub fn enter_day(&mut self) {
        self.phase = GamePhase::Day;
        self.night.clear();
        self.day.clear();
    }

    pub fn enter_ended(&mut self) {
        self.phase = GamePhase::Ended;
        self.pending_deadline = None;
        self.night.clear();
        self.day.clear();
    }

    /// Applies the Mafia kill unless the Medic protected the same target.
    pub fn resolve_night(&mut self) -> Elimination {
        let outcome = match self.night.kills.leader() {
            None => Elimination::Nobody,
            Some(candidate) if self.night.save.as_ref() == Some(&candidate) => {
                Elimination::Saved(candidate)
            }
            Some(candidate) => {
                self.living.remove(&candidate);
                Elimination::Eliminated(candidate)
            }
        };
        self.night.clear();
        outcome
    }

    pub fn resolve_day(&mut self) -> Elimination {
        let outcome = match self.day.votes.leader() {
            None => Elimination::Nobody,
            Some(candidate) => {
                self.living.remove(&candidate);
                Elimination::Eliminated(candidate)
            }
        };
        self.day.clear();
        outcome
    }

    pub fn public_state(&self) -> PublicState {
        PublicState {
            group_id: self.group_id.clone(),
            phase: self.phase,
            player_count: self.players.len(),
            living_count: self.living.len(),
            round: self.round,
        }
    }
}

/// What the lobby panel is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub group_id: GroupId,
    pub phase: GamePhase,
    pub player_count: usize,
    pub living_count: usize,
    pub round: u32,
}

/// A secret action as submitted by a player. `phase` and `round` echo the
/// menu the player acted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub actor_id: PlayerId,
    pub phase: GamePhase,
    pub round: u32,
    pub category: ActionCategory,
    pub target_id: PlayerId,
}

/// The choices offered to one player for the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMenu {
    pub phase: GamePhase,
    pub round: u32,
    pub category: ActionCategory,
    pub targets: Vec<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "MAFIA")]
    Mafia,
    #[serde(rename = "NOT MAFIA")]
    NotMafia,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Mafia => write!(f, "MAFIA"),
            Verdict::NotMafia => write!(f, "NOT MAFIA"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Recorded,
    Investigated { target_id: PlayerId, verdict: Verdict },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_game(players: &[&str], roles: &[(&str, Role)]) -> Game {
        let mut game = Game::new("g".into(), players[0].into(), "c".into());
        for p in &players[1..] {
            game.join(p, 20).unwrap();
        }
        let roles = roles
            .iter()
            .map(|(p, r)| (p.to_string(), *r))
            .collect();
        game.enter_setup(roles);
        game.enter_night();
        game
    }

    #[test]
    fn resubmission_replaces_ballot() {
        let mut ballots = Ballots::default();
        ballots.record("m1", "a");
        ballots.record("m1", "b");
        assert_eq!(ballots.len(), 1);
        assert_eq!(ballots.target_of("m1"), Some(&"b".to_string()));
        assert_eq!(ballots.leader(), Some("b".to_string()));
    }

    #[test]
    fn highest_tally_leads() {
        let mut ballots = Ballots::default();
        ballots.record("p1", "y");
        ballots.record("p2", "x");
        ballots.record("p3", "x");
        assert_eq!(ballots.leader(), Some("x".to_string()));
    }

    #[test]
    fn tie_goes_to_first_seen_target() {
        let mut ballots = Ballots::default();
        ballots.record("p1", "y");
        ballots.record("p2", "x");
        assert_eq!(ballots.leader(), Some("y".to_string()));

        // p1 changes their mind, so "x" is now the earliest ballot.
        ballots.record("p1", "z");
        assert_eq!(ballots.leader(), Some("x".to_string()));
    }

    #[test]
    fn empty_ballots_have_no_leader() {
        assert_eq!(Ballots::default().leader(), None);
    }

    #[test]
    fn join_is_idempotent_and_bounded() {
        let mut game = Game::new("g".into(), "host".into(), "c".into());
        assert!(game.join("a", 3).unwrap());
        assert!(!game.join("a", 3).unwrap());
        assert!(game.join("b", 3).unwrap());
        assert_eq!(game.join("c", 3), Err(GameError::LobbyFull));
        assert_eq!(game.players, vec!["host", "a", "b"]);
    }

    #[test]
    fn leave_of_non_member_is_noop() {
        let mut game = Game::new("g".into(), "host".into(), "c".into());
        assert!(!game.leave("stranger").unwrap());
        assert_eq!(game.players.len(), 1);
    }

    #[test]
    fn lobby_closes_at_setup() {
        let mut game = started_game(&["a", "b", "c", "d", "e"], &[("a", Role::Mafia)]);
        assert_eq!(game.join("f", 20), Err(GameError::LobbyClosed));
        assert_eq!(game.leave("a"), Err(GameError::LobbyClosed));
    }

    #[test]
    fn setup_fills_missing_roles_with_villager() {
        let game = started_game(&["a", "b", "c", "d", "e"], &[("a", Role::Mafia), ("zz", Role::Medic)]);
        assert_eq!(game.roles.len(), 5);
        assert_eq!(game.role_of("b"), Some(Role::Villager));
        assert!(game.role_of("zz").is_none());
        assert_eq!(game.round, 1);
    }

    #[test]
    fn medic_save_blocks_kill() {
        let mut game = started_game(
            &["a", "b", "c", "d", "e"],
            &[("a", Role::Mafia), ("b", Role::Medic)],
        );
        game.night.kills.record("a", "c");
        game.night.save = Some("c".into());
        assert_eq!(game.resolve_night(), Elimination::Saved("c".into()));
        assert_eq!(game.living.len(), 5);
        assert!(game.night.is_empty());
    }

    #[test]
    fn unprotected_kill_eliminates() {
        let mut game = started_game(
            &["a", "b", "c", "d", "e"],
            &[("a", Role::Mafia), ("b", Role::Medic)],
        );
        game.night.kills.record("a", "c");
        game.night.save = Some("d".into());
        assert_eq!(game.resolve_night(), Elimination::Eliminated("c".into()));
        assert!(!game.is_living("c"));
        assert!(game.has_player("c"));
    }

    #[test]
    fn buffers_do_not_leak_across_phases() {
        let mut game = started_game(&["a", "b", "c", "d", "e"], &[("a", Role::Mafia)]);
        game.night.kills.record("a", "c");
        game.enter_day();
        assert!(game.night.is_empty());
        game.day.votes.record("b", "a");
        game.enter_night();
        assert!(game.day.votes.is_empty());
        assert_eq!(game.round, 2);
    }

    #[test]
    fn day_without_votes_eliminates_nobody() {
        let mut game = started_game(&["a", "b", "c", "d", "e"], &[("a", Role::Mafia)]);
        game.enter_day();
        assert_eq!(game.resolve_day(), Elimination::Nobody);
        assert_eq!(game.living.len(), 5);
    }
}
