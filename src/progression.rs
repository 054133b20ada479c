use async_trait::async_trait;
use dashmap::DashMap;

/// External progression collaborator: receives point/XP deltas at match
/// settlement. Bot participants are never forwarded here.
#[async_trait]
pub trait ProgressionStore: Send + Sync {
    async fn settle(&self, participant_id: &str, won: bool, points_delta: i64, xp_delta: i64);
}

/// In-process progression store. Stands in for the real profile service in
/// the binary and gives tests something to assert against.
#[derive(Default)]
pub struct MemoryProgression {
    totals: DashMap<String, PlayerTotals>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTotals {
    pub points: i64,
    pub xp: i64,
    pub wins: u32,
    pub losses: u32,
    pub settlements: u32,
}

impl MemoryProgression {
    pub fn totals(&self, participant_id: &str) -> PlayerTotals {
        self.totals
            .get(participant_id)
            .map(|t| *t)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProgressionStore for MemoryProgression {
    async fn settle(&self, participant_id: &str, won: bool, points_delta: i64, xp_delta: i64) {
        let mut entry = self.totals.entry(participant_id.to_string()).or_default();
        entry.points += points_delta;
        entry.xp += xp_delta;
        if won {
            entry.wins += 1;
        } else {
            entry.losses += 1;
        }
        entry.settlements += 1;
        tracing::debug!(
            participant_id,
            won,
            points_delta,
            xp_delta,
            "settlement applied"
        );
    }
}
