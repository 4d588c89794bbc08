use serde::{Deserialize, Serialize};
use std::fmt;

use super::game::GamePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Mafia,
    Medic,
    Detective,
    Villager,
}

/// Which side a role plays for when the game is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Town,
    Mafia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Kill,
    Save,
    Investigate,
    Vote,
}

impl Role {
    pub fn faction(self) -> Faction {
        match self {
            Role::Mafia => Faction::Mafia,
            Role::Medic | Role::Detective | Role::Villager => Faction::Town,
        }
    }

    /// The night action this role is allowed to take, if any.
    pub fn night_action(self) -> Option<ActionCategory> {
        match self {
            Role::Mafia => Some(ActionCategory::Kill),
            Role::Medic => Some(ActionCategory::Save),
            Role::Detective => Some(ActionCategory::Investigate),
            Role::Villager => None,
        }
    }

    /// Capability table: every living player votes by day, night actions are role-gated.
    pub fn can_perform(self, category: ActionCategory) -> bool {
        match category {
            ActionCategory::Vote => true,
            night => self.night_action() == Some(night),
        }
    }
}

impl ActionCategory {
    pub fn phase(self) -> GamePhase {
        match self {
            ActionCategory::Kill | ActionCategory::Save | ActionCategory::Investigate => {
                GamePhase::Night
            }
            ActionCategory::Vote => GamePhase::Day,
        }
    }

    /// Investigations and votes may not target the actor.
    pub fn excludes_self(self) -> bool {
        matches!(self, ActionCategory::Investigate | ActionCategory::Vote)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Mafia => write!(f, "Mafia"),
            Role::Medic => write!(f, "Medic"),
            Role::Detective => write!(f, "Detective"),
            Role::Villager => write!(f, "Villager"),
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Faction::Town => write!(f, "Town"),
            Faction::Mafia => write!(f, "Mafia"),
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Kill => write!(f, "kill"),
            ActionCategory::Save => write!(f, "save"),
            ActionCategory::Investigate => write!(f, "investigate"),
            ActionCategory::Vote => write!(f, "vote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_matching_roles_get_night_actions() {
        assert!(Role::Mafia.can_perform(ActionCategory::Kill));
        assert!(!Role::Mafia.can_perform(ActionCategory::Save));
        assert!(Role::Medic.can_perform(ActionCategory::Save));
        assert!(!Role::Medic.can_perform(ActionCategory::Investigate));
        assert!(Role::Detective.can_perform(ActionCategory::Investigate));
        assert!(!Role::Detective.can_perform(ActionCategory::Kill));
        assert!(Role::Villager.night_action().is_none());
    }

    #[test]
    fn everyone_votes() {
        for role in [Role::Mafia, Role::Medic, Role::Detective, Role::Villager] {
            assert!(role.can_perform(ActionCategory::Vote));
        }
    }

    #[test]
    fn only_mafia_is_mafia_aligned() {
        assert_eq!(Role::Mafia.faction(), Faction::Mafia);
        assert_eq!(Role::Detective.faction(), Faction::Town);
        assert_eq!(Role::Villager.faction(), Faction::Town);
    }
}
