//! Injected persistence for async matches. The duel service only knows this
//! trait; the binary wires the JSON file store, tests use the memory store.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::duel::DuelMatch;

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn save(&self, m: &DuelMatch) -> anyhow::Result<()>;
    async fn load_all(&self) -> anyhow::Result<Vec<DuelMatch>>;
}

/// One JSON file per match under a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating match directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl MatchStore for JsonFileStore {
    async fn save(&self, m: &DuelMatch) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(m).context("serializing match")?;
        let path = self.path_for(m.id);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<DuelMatch>> {
        let mut matches = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("reading {}", self.dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<DuelMatch>(&raw) {
                Ok(m) => matches.push(m),
                Err(err) => tracing::warn!("skipping unreadable match file {path:?}: {err}"),
            }
        }
        Ok(matches)
    }
}

/// Store used by tests and as a fallback when no data directory is wanted.
#[derive(Default)]
pub struct MemoryStore {
    matches: DashMap<Uuid, DuelMatch>,
}

impl MemoryStore {
    pub fn saved(&self, id: Uuid) -> Option<DuelMatch> {
        self.matches.get(&id).map(|m| m.value().clone())
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn save(&self, m: &DuelMatch) -> anyhow::Result<()> {
        self.matches.insert(m.id, m.clone());
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<DuelMatch>> {
        Ok(self.matches.iter().map(|m| m.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchStatus, Participant, PlayerRef};
    use chrono::Utc;

    fn sample_match() -> DuelMatch {
        let player = |id: &str| {
            Participant::Human(PlayerRef {
                id: id.to_string(),
                name: id.to_string(),
                avatar: String::new(),
                level: 1,
                points: 0,
            })
        };
        DuelMatch {
            id: Uuid::new_v4(),
            subject: "geo".to_string(),
            players: [player("alice"), player("bob")],
            scores: [0, 0],
            round: 0,
            best_of: 7,
            status: MatchStatus::Active,
            winner_id: None,
            has_bot: false,
            turns: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn json_store_round_trips_a_match() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let m = sample_match();
        store.save(&m).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, m.id);
        assert_eq!(loaded[0].players[0].id(), "alice");
    }
}
