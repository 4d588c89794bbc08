use std::sync::Arc;

use crate::models::config::EngineConfig;
use crate::services::collaborators::{
    BroadcastNotifier, MemoryRewardLedger, Notifier, OpenRoster, RewardLedger, Roster,
};
use crate::services::game_store::GameStore;

#[derive(Clone)]
pub struct AppState {
    pub games: GameStore,
    /// Notice stream the websocket feed subscribes to.
    pub feed: BroadcastNotifier,
    pub notifier: Arc<dyn Notifier>,
    pub rewards: Arc<dyn RewardLedger>,
    pub roster: Arc<dyn Roster>,
    pub config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::from_env())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let feed = BroadcastNotifier::default();
        AppState {
            games: GameStore::new(),
            notifier: Arc::new(feed.clone()),
            feed,
            rewards: Arc::new(MemoryRewardLedger::new()),
            roster: Arc::new(OpenRoster::new(config.admins.clone())),
            config: Arc::new(config),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_rewards(mut self, rewards: Arc<dyn RewardLedger>) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_roster(mut self, roster: Arc<dyn Roster>) -> Self {
        self.roster = roster;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
