/// Where a rejection belongs when it is reported back to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself was wrong; game state is unchanged.
    User,
    /// The request was valid for a phase, round or game that no longer exists.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no active game in this group")]
    NoActiveGame,
    #[error("a game is already running in this group")]
    GameAlreadyExists,
    #[error("only the host can do that")]
    NotHost,
    #[error("only the host or an admin can stop the game")]
    NotHostOrAdmin,
    #[error("not enough players: {have} joined, {need} needed")]
    NotEnoughPlayers { have: usize, need: usize },
    #[error("the lobby is full")]
    LobbyFull,
    #[error("the lobby is closed")]
    LobbyClosed,
    #[error("you are not among the living players")]
    ActorNotLiving,
    #[error("that phase is not active")]
    PhaseNotActive,
    #[error("that target cannot be chosen")]
    InvalidTarget,
    #[error("your role cannot {0} right now")]
    ActionNotPermitted(crate::models::role::ActionCategory),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NoActiveGame | GameError::PhaseNotActive => ErrorKind::Stale,
            _ => ErrorKind::User,
        }
    }
}

/// Failure of a side channel (narration, private notice, reward issuance).
/// These are logged and never roll back game state.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("nobody is listening on {0}")]
    NoListeners(String),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::ActionCategory;

    #[test]
    fn stale_requests_are_classified() {
        assert_eq!(GameError::NoActiveGame.kind(), ErrorKind::Stale);
        assert_eq!(GameError::PhaseNotActive.kind(), ErrorKind::Stale);
        assert_eq!(GameError::InvalidTarget.kind(), ErrorKind::User);
        assert_eq!(
            GameError::NotEnoughPlayers { have: 3, need: 5 }.to_string(),
            "not enough players: 3 joined, 5 needed"
        );
        assert_eq!(
            GameError::ActionNotPermitted(ActionCategory::Kill).to_string(),
            "your role cannot kill right now"
        );
    }
}
