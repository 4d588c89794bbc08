use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::player::{ChannelRef, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "to", rename_all = "snake_case")]
pub enum Audience {
    Channel(ChannelRef), // 全体へのナレーション
    Player(PlayerId),    // 本人だけに届く通知（役職、調査結果など）
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub notice_id: String,
    pub audience: Audience,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn new(audience: Audience, content: String) -> Self {
        Notice {
            notice_id: uuid::Uuid::new_v4().to_string(),
            audience,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn public(channel: &str, content: impl Into<String>) -> Self {
        Self::new(Audience::Channel(channel.to_string()), content.into())
    }

    pub fn private(player_id: &str, content: impl Into<String>) -> Self {
        Self::new(Audience::Player(player_id.to_string()), content.into())
    }

    pub fn is_for_channel(&self, channel: &str) -> bool {
        matches!(&self.audience, Audience::Channel(c) if c == channel)
    }

    pub fn is_for_player(&self, player_id: &str) -> bool {
        matches!(&self.audience, Audience::Player(p) if p == player_id)
    }
}
