use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::GameError;
use crate::models::{game::Game, player::GroupId};

/// Exclusive handle to one live game. All mutations of a game happen while
/// holding this lock.
pub type GameHandle = Arc<Mutex<Game>>;

/// One live game per group, from lobby creation until the game ends or is
/// cancelled.
///
/// Lock order is game first, then the registry. The registry lock is never
/// held while waiting on a game.
#[derive(Clone, Default)]
pub struct GameStore {
    games: Arc<RwLock<HashMap<GroupId, GameHandle>>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, game: Game) -> Result<GameHandle, GameError> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.group_id) {
            return Err(GameError::GameAlreadyExists);
        }
        let group_id = game.group_id.clone();
        let handle = Arc::new(Mutex::new(game));
        games.insert(group_id, handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, group_id: &str) -> Option<GameHandle> {
        self.games.read().await.get(group_id).cloned()
    }

    /// Removes the entry only if it still points at `handle`, so a game that
    /// replaced it in the meantime is left alone.
    pub async fn remove(&self, group_id: &str, handle: &GameHandle) -> bool {
        let mut games = self.games.write().await;
        match games.get(group_id) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                games.remove(group_id);
                true
            }
            _ => false,
        }
    }

    pub async fn contains(&self, group_id: &str) -> bool {
        self.games.read().await.contains_key(group_id)
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }
}
