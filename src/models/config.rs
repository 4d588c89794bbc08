use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::player::PlayerId;

/// Hard floor for starting a game; configuration can raise it, never lower it.
pub const MIN_PLAYERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub coins: u32,
    pub xp: u32,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub min_players: usize,
    pub max_players: usize,
    pub night_duration: Duration,
    pub day_duration: Duration,
    // 自動開始までの待ち時間。None なら host が開始するまで待つ
    pub lobby_duration: Option<Duration>,
    pub winner_reward: Reward,
    pub loser_reward: Reward,
    pub admins: Vec<PlayerId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_players: MIN_PLAYERS,
            max_players: 20,
            night_duration: Duration::from_secs(60),
            day_duration: Duration::from_secs(60),
            lobby_duration: Some(Duration::from_secs(120)),
            winner_reward: Reward { coins: 30, xp: 60 },
            loser_reward: Reward { coins: 10, xp: 20 },
            admins: Vec::new(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl EngineConfig {
    /// Players needed to leave the lobby.
    pub fn required_players(&self) -> usize {
        self.min_players.max(MIN_PLAYERS)
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let min_players = env_parse::<usize>("MAFIA_MIN_PLAYERS")
            .unwrap_or(defaults.min_players)
            .max(MIN_PLAYERS);
        let max_players = env_parse::<usize>("MAFIA_MAX_PLAYERS")
            .unwrap_or(defaults.max_players)
            .max(min_players);
        let night_duration = env_parse::<u64>("MAFIA_NIGHT_SECONDS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.night_duration);
        let day_duration = env_parse::<u64>("MAFIA_DAY_SECONDS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.day_duration);
        let lobby_duration = match env_parse::<u64>("MAFIA_LOBBY_SECONDS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.lobby_duration,
        };
        let winner_reward = Reward {
            coins: env_parse::<u32>("MAFIA_WIN_COINS")
                .unwrap_or(defaults.winner_reward.coins),
            xp: env_parse::<u32>("MAFIA_WIN_XP")
                .unwrap_or(defaults.winner_reward.xp),
        };
        let loser_reward = Reward {
            coins: env_parse::<u32>("MAFIA_LOSE_COINS")
                .unwrap_or(defaults.loser_reward.coins),
            xp: env_parse::<u32>("MAFIA_LOSE_XP")
                .unwrap_or(defaults.loser_reward.xp),
        };
        let admins = env::var("MAFIA_ADMINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            min_players,
            max_players,
            night_duration,
            day_duration,
            lobby_duration,
            winner_reward,
            loser_reward,
            admins,
        }
    }
}
