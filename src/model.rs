use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bot::BotProfile;

/// A real player as supplied by the (external) auth/profile layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    pub level: u32,
    pub points: i64,
}

/// One side of a duel. The `Bot` variant carries the internal skill band;
/// client-facing views only ever see [`DisplayIdentity`], so human and bot
/// render identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    Human(PlayerRef),
    Bot(BotProfile),
}

impl Participant {
    pub fn id(&self) -> &str {
        match self {
            Participant::Human(p) => &p.id,
            Participant::Bot(b) => &b.id,
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self, Participant::Bot(_))
    }

    pub fn display(&self) -> DisplayIdentity {
        match self {
            Participant::Human(p) => DisplayIdentity {
                id: p.id.clone(),
                name: p.name.clone(),
                avatar: p.avatar.clone(),
                level: p.level,
                points: p.points,
            },
            Participant::Bot(b) => DisplayIdentity {
                id: b.id.clone(),
                name: b.name.clone(),
                avatar: b.avatar.clone(),
                level: b.level,
                points: b.points,
            },
        }
    }
}

/// The uniform shape every participant is exposed as. Never contains
/// accuracy bands, latency ranges or any other bot internals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayIdentity {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub level: u32,
    pub points: i64,
}

/// An answer as recorded against a turn or round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub choice: usize,
    pub elapsed_ms: u64,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Active,
    Over,
}

pub fn new_match_id() -> Uuid {
    Uuid::new_v4()
}
