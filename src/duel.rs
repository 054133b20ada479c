//! Asynchronous (turn-based) duels. A match lives behind a per-match lock in
//! the match table; `submit_answer`, `reveal_current` and the deadline sweep
//! all mutate through that lock, which is what keeps settlement single-shot.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::bot;
use crate::config::Config;
use crate::error::AppError;
use crate::matchmaking::{OpenPool, PoolOutcome};
use crate::model::{self, DisplayIdentity, MatchStatus, Participant, PlayerRef, RecordedAnswer};
use crate::notify::Notifier;
use crate::progression::ProgressionStore;
use crate::question::{Question, QuestionSource};
use crate::score::{self, Outcome};
use crate::storage::MatchStore;

/// One persisted turn. The question's answer key stays server-side until
/// the turn is revealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub question: Question,
    pub deadline: DateTime<Utc>,
    pub answers: HashMap<String, RecordedAnswer>,
    pub revealed: bool,
}

/// Root aggregate of an async duel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelMatch {
    pub id: Uuid,
    pub subject: String,
    pub players: [Participant; 2],
    pub scores: [u32; 2],
    /// Number of turns opened so far.
    pub round: u32,
    pub best_of: u32,
    pub status: MatchStatus,
    pub winner_id: Option<String>,
    pub has_bot: bool,
    pub turns: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DuelMatch {
    pub fn seat_of(&self, participant_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id() == participant_id)
    }

    /// Index of the open turn, if the latest turn is still unrevealed.
    pub fn current_turn_index(&self) -> Option<usize> {
        match self.turns.last() {
            Some(t) if !t.revealed => Some(self.turns.len() - 1),
            _ => None,
        }
    }

    pub fn majority(&self) -> u32 {
        self.best_of.div_ceil(2)
    }

    fn used_question_ids(&self) -> Vec<String> {
        self.turns.iter().map(|t| t.question.id.clone()).collect()
    }

    fn bot_seat(&self) -> Option<usize> {
        self.players.iter().position(|p| p.is_bot())
    }
}

/// Redacted, client-facing match shape.
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub id: Uuid,
    pub subject: String,
    pub players: [DisplayIdentity; 2],
    pub scores: [u32; 2],
    pub round: u32,
    pub best_of: u32,
    pub status: MatchStatus,
    pub winner_id: Option<String>,
    pub turns: Vec<TurnView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub question_id: String,
    pub stem: String,
    pub choices: Vec<String>,
    pub deadline: DateTime<Utc>,
    pub revealed: bool,
    /// Hidden until the turn is revealed.
    pub correct_index: Option<usize>,
    pub explanation: Option<String>,
    /// Before reveal only the requester's own answer appears here.
    pub answers: HashMap<String, AnswerView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub choice: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboxEntry {
    pub match_id: Uuid,
    pub opponent: DisplayIdentity,
    pub round: u32,
    pub your_turn: bool,
    pub time_left_secs: Option<i64>,
    /// Requester's score first.
    pub scores: [u32; 2],
    pub status: MatchStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedMatch {
    /// True when an active match between the same pair already existed and
    /// was returned instead of creating a duplicate.
    pub existing: bool,
    #[serde(rename = "match")]
    pub view: MatchView,
}

/// Payload for creating a match.
#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub initiator: PlayerRef,
    pub subject: String,
    pub opponent_id: Option<String>,
}

pub struct DuelService {
    cfg: Config,
    matches: dashmap::DashMap<Uuid, Arc<Mutex<DuelMatch>>>,
    /// Players seen by this process; explicit challenges resolve here.
    players: dashmap::DashMap<String, PlayerRef>,
    pool: OpenPool,
    questions: Arc<dyn QuestionSource>,
    progression: Arc<dyn ProgressionStore>,
    notifier: Arc<Notifier>,
    store: Arc<dyn MatchStore>,
}

impl DuelService {
    pub fn new(
        cfg: Config,
        questions: Arc<dyn QuestionSource>,
        progression: Arc<dyn ProgressionStore>,
        notifier: Arc<Notifier>,
        store: Arc<dyn MatchStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            cfg,
            matches: dashmap::DashMap::new(),
            players: dashmap::DashMap::new(),
            pool: OpenPool::new(),
            questions,
            progression,
            notifier,
            store,
        })
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn register_player(&self, player: &PlayerRef) {
        self.players.insert(player.id.clone(), player.clone());
    }

    /// Reloads persisted matches on boot, reschedules bot answers for any
    /// open turn still missing one, and reopens the next turn for matches
    /// that went down between a reveal and the delayed turn start.
    pub async fn restore(self: &Arc<Self>) -> anyhow::Result<usize> {
        let loaded = self.store.load_all().await?;
        let count = loaded.len();
        for m in loaded {
            for p in &m.players {
                if let Participant::Human(p) = p {
                    self.players.insert(p.id.clone(), p.clone());
                }
            }
            let id = m.id;
            let round = m.round;
            let bot_pending = m.status == MatchStatus::Active
                && m.current_turn_index().is_some_and(|i| {
                    m.bot_seat()
                        .is_some_and(|s| !m.turns[i].answers.contains_key(m.players[s].id()))
                });
            let turn_pending = m.status == MatchStatus::Active
                && m.current_turn_index().is_none()
                && m.round < m.best_of;
            self.matches.insert(id, Arc::new(Mutex::new(m)));
            if bot_pending {
                self.schedule_bot_answer(id, round);
            }
            if turn_pending {
                if let Err(err) = self.start_turn(id).await {
                    tracing::warn!(%id, "could not reopen turn on restore: {err}");
                }
            }
        }
        tracing::info!(count, "restored matches");
        Ok(count)
    }

    /// Resolves an opponent (explicit challenge, pool pairing within the
    /// grace window, or stealth bot) and opens the match with turn 1.
    pub async fn create_match(
        self: &Arc<Self>,
        req: CreateMatchRequest,
    ) -> Result<CreatedMatch, AppError> {
        let CreateMatchRequest {
            initiator,
            subject,
            opponent_id,
        } = req;
        self.register_player(&initiator);

        if let Some(opponent_id) = opponent_id {
            if opponent_id == initiator.id {
                return Err(AppError::SelfChallenge);
            }
            let opponent = self
                .players
                .get(&opponent_id)
                .map(|p| p.value().clone())
                .ok_or(AppError::OpponentNotFound)?;
            if let Some(id) = self.find_active_pair(&initiator.id, &opponent_id).await {
                let view = self.get_match_for_user(id, &initiator.id).await?;
                return Ok(CreatedMatch {
                    existing: true,
                    view,
                });
            }
            let initiator_id = initiator.id.clone();
            let view = self
                .open_match(
                    [
                        Participant::Human(initiator.clone()),
                        Participant::Human(opponent),
                    ],
                    subject,
                    &initiator_id,
                )
                .await?;
            self.notifier.notify(
                &opponent_id,
                format!("{} challenged you to a duel!", initiator.name),
            );
            return Ok(CreatedMatch {
                existing: false,
                view,
            });
        }

        match self.pool.join(&subject, initiator.clone()) {
            PoolOutcome::Paired { waiter, reply } => {
                let waiter_id = waiter.id.clone();
                // The pair may already share an active match; hand both
                // joiners that one instead of opening a duplicate.
                if let Some(id) = self.find_active_pair(&initiator.id, &waiter_id).await {
                    let _ = reply.send(id);
                    let view = self.get_match_for_user(id, &initiator.id).await?;
                    return Ok(CreatedMatch {
                        existing: true,
                        view,
                    });
                }
                let joiner_name = initiator.name.clone();
                let view = self
                    .open_match(
                        [
                            Participant::Human(waiter),
                            Participant::Human(initiator.clone()),
                        ],
                        subject,
                        &initiator.id,
                    )
                    .await?;
                // A dropped reply just means the waiter gave up.
                let _ = reply.send(view.id);
                self.notifier
                    .notify(&waiter_id, format!("{joiner_name} accepted your duel!"));
                Ok(CreatedMatch {
                    existing: false,
                    view,
                })
            }
            PoolOutcome::Waiting { ticket_id, mut rx } => {
                match tokio::time::timeout(self.cfg.queue_grace, &mut rx).await {
                    Ok(Ok(id)) => {
                        let view = self.get_match_for_user(id, &initiator.id).await?;
                        Ok(CreatedMatch {
                            existing: false,
                            view,
                        })
                    }
                    Ok(Err(_)) => Err(AppError::Internal(anyhow::anyhow!(
                        "pairing counterpart vanished"
                    ))),
                    Err(_) => {
                        let Some(player) = self.pool.take(&subject, ticket_id) else {
                            // Pairing won the race at the deadline; the match
                            // id is already in flight.
                            let id = rx.await.map_err(|_| {
                                AppError::Internal(anyhow::anyhow!("pairing counterpart vanished"))
                            })?;
                            let view = self.get_match_for_user(id, &initiator.id).await?;
                            return Ok(CreatedMatch {
                                existing: false,
                                view,
                            });
                        };
                        let profile = bot::create_bot(player.level, player.points);
                        tracing::info!(
                            %subject,
                            player = %player.id,
                            bot = %profile.id,
                            "no pairing within grace, falling back to bot"
                        );
                        let view = self
                            .open_match(
                                [Participant::Human(player.clone()), Participant::Bot(profile)],
                                subject,
                                &player.id,
                            )
                            .await?;
                        Ok(CreatedMatch {
                            existing: false,
                            view,
                        })
                    }
                }
            }
        }
    }

    pub async fn submit_answer(
        self: &Arc<Self>,
        match_id: Uuid,
        participant_id: &str,
        choice: usize,
        elapsed_ms: u64,
    ) -> Result<MatchView, AppError> {
        let entry = self.entry(match_id)?;
        let mut m = entry.lock().await;
        m.seat_of(participant_id).ok_or(AppError::NotAMember)?;
        if m.status != MatchStatus::Active {
            return Err(AppError::NotActive);
        }
        let idx = m.current_turn_index().ok_or(AppError::NoOpenTurn)?;
        {
            let turn = &m.turns[idx];
            if Utc::now() > turn.deadline {
                return Err(AppError::DeadlinePassed);
            }
            if turn.answers.contains_key(participant_id) {
                return Err(AppError::AlreadyAnswered);
            }
            if choice >= turn.question.choices.len() {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "choice {choice} out of range"
                )));
            }
        }
        m.turns[idx].answers.insert(
            participant_id.to_string(),
            RecordedAnswer {
                choice,
                elapsed_ms,
                answered_at: Utc::now(),
            },
        );
        m.updated_at = Utc::now();
        if m.turns[idx].answers.len() == 2 {
            self.reveal_current(&mut m, false).await;
        }
        self.persist(&m).await;
        Ok(Self::view_for(&m, participant_id))
    }

    pub async fn resign_match(
        self: &Arc<Self>,
        match_id: Uuid,
        participant_id: &str,
    ) -> Result<MatchView, AppError> {
        let entry = self.entry(match_id)?;
        let mut m = entry.lock().await;
        let seat = m.seat_of(participant_id).ok_or(AppError::NotAMember)?;
        if m.status != MatchStatus::Active {
            return Err(AppError::NotActive);
        }
        tracing::info!(%match_id, participant_id, "match resigned");
        self.finish(&mut m, Some(1 - seat)).await;
        self.persist(&m).await;
        Ok(Self::view_for(&m, participant_id))
    }

    pub async fn get_match_for_user(
        &self,
        match_id: Uuid,
        participant_id: &str,
    ) -> Result<MatchView, AppError> {
        let entry = self.entry(match_id)?;
        let m = entry.lock().await;
        m.seat_of(participant_id).ok_or(AppError::NotAMember)?;
        Ok(Self::view_for(&m, participant_id))
    }

    /// Every match the participant belongs to, most recently updated first.
    pub async fn inbox(&self, participant_id: &str) -> Vec<InboxEntry> {
        let entries: Vec<Arc<Mutex<DuelMatch>>> = self
            .matches
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        let mut rows = Vec::new();
        for entry in entries {
            let m = entry.lock().await;
            let Some(seat) = m.seat_of(participant_id) else {
                continue;
            };
            let open = m.current_turn_index().map(|i| &m.turns[i]);
            let now = Utc::now();
            let your_turn = m.status == MatchStatus::Active
                && open.is_some_and(|t| {
                    !t.answers.contains_key(participant_id) && now <= t.deadline
                });
            rows.push(InboxEntry {
                match_id: m.id,
                opponent: m.players[1 - seat].display(),
                round: m.round,
                your_turn,
                time_left_secs: open.map(|t| (t.deadline - now).num_seconds().max(0)),
                scores: [m.scores[seat], m.scores[1 - seat]],
                status: m.status,
                updated_at: m.updated_at,
            });
        }
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows
    }

    /// One pass of the deadline sweep: forfeit-reveals every active match
    /// whose open turn is past its deadline. Never fails; problems are
    /// logged and the pass moves on.
    pub async fn sweep_once(self: &Arc<Self>) {
        let entries: Vec<(Uuid, Arc<Mutex<DuelMatch>>)> = self
            .matches
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();
        for (id, entry) in entries {
            let mut m = entry.lock().await;
            if m.status != MatchStatus::Active {
                continue;
            }
            let Some(idx) = m.current_turn_index() else {
                continue;
            };
            if Utc::now() <= m.turns[idx].deadline {
                continue;
            }
            tracing::info!(%id, turn = idx + 1, "turn deadline passed, forfeiting");
            self.reveal_current(&mut m, true).await;
            self.persist(&m).await;
        }
    }

    pub fn run_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let svc = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(svc.cfg.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                svc.sweep_once().await;
            }
        })
    }

    fn entry(&self, match_id: Uuid) -> Result<Arc<Mutex<DuelMatch>>, AppError> {
        self.matches
            .get(&match_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or(AppError::MatchNotFound)
    }

    async fn find_active_pair(&self, a: &str, b: &str) -> Option<Uuid> {
        let entries: Vec<Arc<Mutex<DuelMatch>>> = self
            .matches
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        for entry in entries {
            let m = entry.lock().await;
            if m.status == MatchStatus::Active
                && m.seat_of(a).is_some()
                && m.seat_of(b).is_some()
            {
                return Some(m.id);
            }
        }
        None
    }

    async fn open_match(
        self: &Arc<Self>,
        players: [Participant; 2],
        subject: String,
        viewer: &str,
    ) -> Result<MatchView, AppError> {
        let now = Utc::now();
        let id = model::new_match_id();
        let has_bot = players.iter().any(Participant::is_bot);
        let m = DuelMatch {
            id,
            subject,
            players,
            scores: [0, 0],
            round: 0,
            best_of: self.cfg.best_of,
            status: MatchStatus::Active,
            winner_id: None,
            has_bot,
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.matches.insert(id, Arc::new(Mutex::new(m)));
        if let Err(err) = self.start_turn(id).await {
            // A match that cannot open turn 1 is not worth keeping.
            self.matches.remove(&id);
            return Err(err);
        }
        let entry = self.entry(id)?;
        let m = entry.lock().await;
        tracing::info!(%id, subject = %m.subject, has_bot, "match created");
        Ok(Self::view_for(&m, viewer))
    }

    /// Opens the next turn. A no-op when a turn is already open or the match
    /// has run its course; both happen routinely with delayed schedulers.
    async fn start_turn(self: &Arc<Self>, match_id: Uuid) -> Result<(), AppError> {
        let entry = self.entry(match_id)?;
        let mut m = entry.lock().await;
        if m.status != MatchStatus::Active {
            return Err(AppError::NotActive);
        }
        if m.current_turn_index().is_some() || m.round >= m.best_of {
            return Ok(());
        }
        let exclude = m.used_question_ids();
        let question = self.questions.pick(&m.subject, &exclude).await?;
        m.turns.push(Turn {
            question,
            deadline: Utc::now() + self.cfg.turn_deadline,
            answers: HashMap::new(),
            revealed: false,
        });
        m.round = m.turns.len() as u32;
        m.updated_at = Utc::now();
        if m.has_bot {
            self.schedule_bot_answer(match_id, m.round);
        }
        self.persist(&m).await;
        Ok(())
    }

    fn schedule_bot_answer(self: &Arc<Self>, match_id: Uuid, expected_round: u32) {
        let delay = bot::turn_delivery_delay(self.cfg.bot_delay_min, self.cfg.bot_delay_max);
        tracing::debug!(%match_id, expected_round, ?delay, "bot answer scheduled");
        let svc = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            svc.bot_answer(match_id, expected_round).await;
        });
    }

    /// Fires when a scheduled bot answer comes due. Revalidates everything:
    /// the match may have ended, advanced or been forfeited since scheduling.
    async fn bot_answer(self: &Arc<Self>, match_id: Uuid, expected_round: u32) {
        let Ok(entry) = self.entry(match_id) else {
            return;
        };
        let mut m = entry.lock().await;
        if m.status != MatchStatus::Active || m.round != expected_round {
            tracing::debug!(%match_id, expected_round, "stale bot timer, skipping");
            return;
        }
        let Some(idx) = m.current_turn_index() else {
            return;
        };
        let Some(bot_seat) = m.bot_seat() else {
            return;
        };
        let bot_id = m.players[bot_seat].id().to_string();
        if m.turns[idx].answers.contains_key(&bot_id) || Utc::now() > m.turns[idx].deadline {
            return;
        }
        let turn = &m.turns[idx];
        let answer = bot::decide_turn(turn.question.correct_index, turn.question.choices.len());
        m.turns[idx].answers.insert(
            bot_id,
            RecordedAnswer {
                choice: answer.choice,
                elapsed_ms: answer.latency.as_millis() as u64,
                answered_at: Utc::now(),
            },
        );
        m.updated_at = Utc::now();
        if m.turns[idx].answers.len() == 2 {
            self.reveal_current(&mut m, false).await;
        }
        self.persist(&m).await;
    }

    /// Reveals the open turn, applies the round point, and either finishes
    /// the match or schedules the next turn. `forfeit` switches to deadline
    /// scoring, where a sole answer wins regardless of correctness.
    async fn reveal_current(self: &Arc<Self>, m: &mut DuelMatch, forfeit: bool) {
        let Some(idx) = m.current_turn_index() else {
            return;
        };
        m.turns[idx].revealed = true;
        let correct_index = m.turns[idx].question.correct_index;
        let ids = [
            m.players[0].id().to_string(),
            m.players[1].id().to_string(),
        ];
        let answers = [
            m.turns[idx].answers.get(&ids[0]),
            m.turns[idx].answers.get(&ids[1]),
        ];
        let round_winner = if forfeit {
            score::forfeit_winner(answers)
        } else {
            score::round_winner(answers, correct_index)
        };
        if let Some(seat) = round_winner {
            m.scores[seat] += 1;
        }
        m.updated_at = Utc::now();

        let majority = m.majority();
        let exhausted = m.turns.len() as u32 >= m.best_of;
        if m.scores[0] >= majority || m.scores[1] >= majority || exhausted {
            let winner_seat = match m.scores[0].cmp(&m.scores[1]) {
                std::cmp::Ordering::Greater => Some(0),
                std::cmp::Ordering::Less => Some(1),
                std::cmp::Ordering::Equal => None,
            };
            self.finish(m, winner_seat).await;
            return;
        }

        for (seat, player) in m.players.iter().enumerate() {
            if !player.is_bot() {
                self.notifier.notify(
                    player.id(),
                    format!(
                        "Round {} against {} is in: you {} – {} them.",
                        idx + 1,
                        m.players[1 - seat].display().name,
                        m.scores[seat],
                        m.scores[1 - seat]
                    ),
                );
            }
        }

        let svc = Arc::clone(self);
        let match_id = m.id;
        let delay = self.cfg.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match svc.start_turn(match_id).await {
                Ok(()) => {}
                Err(err) => tracing::warn!(%match_id, "could not open next turn: {err}"),
            }
        });
    }

    /// The single `active → over` transition. Guarded so settlement runs at
    /// most once per match no matter who observes the terminal score.
    async fn finish(&self, m: &mut DuelMatch, winner_seat: Option<usize>) {
        if m.status == MatchStatus::Over {
            return;
        }
        m.status = MatchStatus::Over;
        m.winner_id = winner_seat.map(|s| m.players[s].id().to_string());
        m.updated_at = Utc::now();
        tracing::info!(
            id = %m.id,
            winner = ?m.winner_id,
            scores = ?m.scores,
            "match over"
        );

        for (seat, player) in m.players.iter().enumerate() {
            if player.is_bot() {
                continue;
            }
            let outcome = match winner_seat {
                Some(w) if w == seat => Outcome::Won,
                Some(_) => Outcome::Lost,
                None => Outcome::Drew,
            };
            let (points_delta, xp_delta) = score::deltas(outcome);
            self.progression
                .settle(player.id(), outcome == Outcome::Won, points_delta, xp_delta)
                .await;
            let opponent = m.players[1 - seat].display().name;
            let message = match outcome {
                Outcome::Won => format!(
                    "You beat {} {}–{}! +{} points",
                    opponent, m.scores[seat], m.scores[1 - seat], points_delta
                ),
                Outcome::Lost => format!(
                    "{} won your duel {}–{}.",
                    opponent, m.scores[1 - seat], m.scores[seat]
                ),
                Outcome::Drew => format!(
                    "Your duel with {} ended {}–{}.",
                    opponent, m.scores[seat], m.scores[1 - seat]
                ),
            };
            self.notifier.notify(player.id(), message);
        }
    }

    async fn persist(&self, m: &DuelMatch) {
        if let Err(err) = self.store.save(m).await {
            tracing::error!(id = %m.id, "failed to persist match: {err:#}");
        }
    }

    fn view_for(m: &DuelMatch, participant_id: &str) -> MatchView {
        let turns = m
            .turns
            .iter()
            .map(|t| {
                let answers = t
                    .answers
                    .iter()
                    .filter(|(id, _)| t.revealed || id.as_str() == participant_id)
                    .map(|(id, a)| {
                        (
                            id.clone(),
                            AnswerView {
                                choice: a.choice,
                                elapsed_ms: a.elapsed_ms,
                            },
                        )
                    })
                    .collect();
                TurnView {
                    question_id: t.question.id.clone(),
                    stem: t.question.stem.clone(),
                    choices: t.question.choices.clone(),
                    deadline: t.deadline,
                    revealed: t.revealed,
                    correct_index: t.revealed.then_some(t.question.correct_index),
                    explanation: t.revealed.then(|| t.question.explanation.clone()),
                    answers,
                }
            })
            .collect();
        MatchView {
            id: m.id,
            subject: m.subject.clone(),
            players: [m.players[0].display(), m.players[1].display()],
            scores: m.scores,
            round: m.round,
            best_of: m.best_of,
            status: m.status,
            winner_id: m.winner_id.clone(),
            turns,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
