//! Capabilities the engine consumes from the hosting community: message
//! delivery, reward issuance and roster lookup. Every call is best-effort; the
//! engine logs failures and carries on.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::error::DeliveryError;
use crate::models::{
    config::Reward,
    notice::Notice,
    player::{GroupId, PlayerId},
};

pub trait Notifier: Send + Sync {
    /// Public message to the game's shared channel.
    fn narrate(&self, channel: &str, text: &str) -> Result<(), DeliveryError>;
    /// Secret message to exactly one player.
    fn notify_private(&self, player_id: &str, text: &str) -> Result<(), DeliveryError>;
}

pub trait RewardLedger: Send + Sync {
    fn award_player(
        &self,
        group_id: &str,
        player_id: &str,
        coins: u32,
        xp: u32,
    ) -> Result<(), DeliveryError>;
}

pub trait Roster: Send + Sync {
    /// Whether the player is still a member of the group.
    fn is_present(&self, group_id: &str, player_id: &str) -> bool;
    fn is_admin(&self, group_id: &str, player_id: &str) -> bool;
}

/// Fans every notice out to all subscribers; each subscriber keeps the
/// notices addressed to it.
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    fn send(&self, notice: Notice, target: &str) -> Result<(), DeliveryError> {
        self.tx
            .send(notice)
            .map(|_| ())
            .map_err(|_| DeliveryError::NoListeners(target.to_string()))
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Notifier for BroadcastNotifier {
    fn narrate(&self, channel: &str, text: &str) -> Result<(), DeliveryError> {
        self.send(Notice::public(channel, text), channel)
    }

    fn notify_private(&self, player_id: &str, text: &str) -> Result<(), DeliveryError> {
        self.send(Notice::private(player_id, text), player_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub group_id: GroupId,
    pub player_id: PlayerId,
    pub reward: Reward,
}

/// Keeps coin and xp totals in memory.
#[derive(Default)]
pub struct MemoryRewardLedger {
    awards: Mutex<Vec<Award>>,
}

impl MemoryRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn awards(&self) -> Vec<Award> {
        self.awards
            .lock()
            .map(|awards| awards.clone())
            .unwrap_or_default()
    }

    /// Totals per player for one group.
    pub fn balances(&self, group_id: &str) -> HashMap<PlayerId, Reward> {
        let mut totals: HashMap<PlayerId, Reward> = HashMap::new();
        for award in self.awards().into_iter().filter(|a| a.group_id == group_id) {
            let total = totals
                .entry(award.player_id)
                .or_insert(Reward { coins: 0, xp: 0 });
            total.coins += award.reward.coins;
            total.xp += award.reward.xp;
        }
        totals
    }
}

impl RewardLedger for MemoryRewardLedger {
    fn award_player(
        &self,
        group_id: &str,
        player_id: &str,
        coins: u32,
        xp: u32,
    ) -> Result<(), DeliveryError> {
        let mut awards = self
            .awards
            .lock()
            .map_err(|e| DeliveryError::Unavailable(e.to_string()))?;
        awards.push(Award {
            group_id: group_id.to_string(),
            player_id: player_id.to_string(),
            reward: Reward { coins, xp },
        });
        Ok(())
    }
}

/// Treats everyone as present; admins come from configuration.
#[derive(Debug, Clone, Default)]
pub struct OpenRoster {
    admins: HashSet<PlayerId>,
}

impl OpenRoster {
    pub fn new(admins: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

impl Roster for OpenRoster {
    fn is_present(&self, _group_id: &str, _player_id: &str) -> bool {
        true
    }

    fn is_admin(&self, _group_id: &str, player_id: &str) -> bool {
        self.admins.contains(player_id)
    }
}
