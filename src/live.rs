//! Synchronous duel sessions. One task per session runs the round loop;
//! answers arrive on per-seat channels fed by the websocket layer, bot
//! answers are scheduled onto an identical channel by the session itself.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::bot;
use crate::config::Config;
use crate::model::{DisplayIdentity, Participant, RecordedAnswer};
use crate::notify::Notifier;
use crate::progression::ProgressionStore;
use crate::question::QuestionSource;
use crate::score::{self, Outcome};

/// Everything a session needs besides its two seats.
pub struct LiveDeps {
    pub cfg: Config,
    pub questions: Arc<dyn QuestionSource>,
    pub progression: Arc<dyn ProgressionStore>,
    pub notifier: Arc<Notifier>,
}

/// Events pushed to a live client over its connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Start {
        session_id: Uuid,
        subject: String,
        best_of: u32,
        opponent: DisplayIdentity,
    },
    Question {
        id: String,
        round: u32,
        stem: String,
        choices: Vec<String>,
        time_limit_secs: u64,
        deadline: chrono::DateTime<Utc>,
    },
    Result {
        id: String,
        correct_index: usize,
        explanation: String,
        results: Vec<RoundResult>,
        scores: Vec<u32>,
    },
    Finished {
        winner_id: Option<String>,
        final_scores: Vec<u32>,
        point_deltas: Vec<i64>,
        xp_deltas: Vec<i64>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundResult {
    pub participant_id: String,
    pub answered: bool,
    pub choice: Option<usize>,
    pub correct: bool,
    pub elapsed_ms: Option<u64>,
}

/// An inbound answer, attributed to a round by question id.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerMsg {
    pub question_id: String,
    pub choice: usize,
    pub elapsed_ms: u64,
}

/// One side of a live session. Bots carry no channels; the session produces
/// their answers itself.
pub struct LiveSeat {
    pub participant: Participant,
    pub events: Option<mpsc::Sender<ServerEvent>>,
    pub answers: Option<mpsc::Receiver<AnswerMsg>>,
}

impl LiveSeat {
    pub fn bot(profile: crate::bot::BotProfile) -> Self {
        Self {
            participant: Participant::Bot(profile),
            events: None,
            answers: None,
        }
    }
}

pub fn spawn_session(deps: Arc<LiveDeps>, subject: String, seats: [LiveSeat; 2]) {
    tokio::spawn(async move {
        run_session(deps, subject, seats).await;
    });
}

async fn run_session(deps: Arc<LiveDeps>, subject: String, mut seats: [LiveSeat; 2]) {
    let session_id = Uuid::new_v4();
    let best_of = deps.cfg.best_of;
    let majority = deps.cfg.majority();
    tracing::info!(
        %session_id,
        %subject,
        a = seats[0].participant.id(),
        b = seats[1].participant.id(),
        "live session starting"
    );

    for i in 0..2 {
        let opponent = seats[1 - i].participant.display();
        send_event(
            &seats[i],
            ServerEvent::Start {
                session_id,
                subject: subject.clone(),
                best_of,
                opponent,
            },
        )
        .await;
    }

    // Bot answers flow through the same channel shape as human ones.
    let mut bot_feeds: [Option<mpsc::Sender<AnswerMsg>>; 2] = [None, None];
    for (i, seat) in seats.iter_mut().enumerate() {
        if seat.participant.is_bot() && seat.answers.is_none() {
            let (tx, rx) = mpsc::channel(4);
            seat.answers = Some(rx);
            bot_feeds[i] = Some(tx);
        }
    }

    let mut scores: [u32; 2] = [0, 0];
    let mut used_ids: Vec<String> = Vec::new();
    let mut round: u32 = 0;
    let mut aborted = false;

    while round < best_of && scores[0] < majority && scores[1] < majority {
        round += 1;
        let question = match deps.questions.pick(&subject, &used_ids).await {
            Ok(q) => q,
            Err(err) => {
                tracing::error!(%session_id, round, "aborting live session: {err}");
                aborted = true;
                break;
            }
        };
        used_ids.push(question.id.clone());

        let window = deps.cfg.round_window;
        let deadline_wall = Utc::now() + chrono::Duration::from_std(window).unwrap_or_default();
        for seat in &seats {
            send_event(
                seat,
                ServerEvent::Question {
                    id: question.id.clone(),
                    round,
                    stem: question.stem.clone(),
                    choices: question.choices.clone(),
                    time_limit_secs: window.as_secs(),
                    deadline: deadline_wall,
                },
            )
            .await;
        }

        for (i, seat) in seats.iter().enumerate() {
            if let (Participant::Bot(profile), Some(feed)) = (&seat.participant, &bot_feeds[i]) {
                let answer = bot::decide(profile, question.correct_index, question.choices.len());
                let feed = feed.clone();
                let question_id = question.id.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(answer.latency).await;
                    let _ = feed
                        .send(AnswerMsg {
                            question_id,
                            choice: answer.choice,
                            elapsed_ms: answer.latency.as_millis() as u64,
                        })
                        .await;
                });
            }
        }

        let answers = collect_answers(&mut seats, &question.id, window).await;
        let winner = score::round_winner(
            [answers[0].as_ref(), answers[1].as_ref()],
            question.correct_index,
        );
        if let Some(w) = winner {
            scores[w] += 1;
        }

        let results: Vec<RoundResult> = seats
            .iter()
            .enumerate()
            .map(|(i, seat)| RoundResult {
                participant_id: seat.participant.id().to_string(),
                answered: answers[i].is_some(),
                choice: answers[i].as_ref().map(|a| a.choice),
                correct: answers[i]
                    .as_ref()
                    .is_some_and(|a| a.choice == question.correct_index),
                elapsed_ms: answers[i].as_ref().map(|a| a.elapsed_ms),
            })
            .collect();
        for seat in &seats {
            send_event(
                seat,
                ServerEvent::Result {
                    id: question.id.clone(),
                    correct_index: question.correct_index,
                    explanation: question.explanation.clone(),
                    results: results.clone(),
                    scores: scores.to_vec(),
                },
            )
            .await;
        }
    }

    if aborted {
        // No settlement for a session that never resolved.
        return;
    }

    let winner_seat = match scores[0].cmp(&scores[1]) {
        std::cmp::Ordering::Greater => Some(0),
        std::cmp::Ordering::Less => Some(1),
        std::cmp::Ordering::Equal => None,
    };
    let winner_id = winner_seat.map(|w| seats[w].participant.id().to_string());

    let mut point_deltas = vec![0i64; 2];
    let mut xp_deltas = vec![0i64; 2];
    for (i, seat) in seats.iter().enumerate() {
        let outcome = match winner_seat {
            Some(w) if w == i => Outcome::Won,
            Some(_) => Outcome::Lost,
            None => Outcome::Drew,
        };
        let (points, xp) = score::deltas(outcome);
        point_deltas[i] = points;
        xp_deltas[i] = xp;
        if !seat.participant.is_bot() {
            deps.progression
                .settle(
                    seat.participant.id(),
                    outcome == Outcome::Won,
                    points,
                    xp,
                )
                .await;
            let message = match outcome {
                Outcome::Won => format!("You won the duel {}–{}!", scores[i], scores[1 - i]),
                Outcome::Lost => format!("You lost the duel {}–{}.", scores[i], scores[1 - i]),
                Outcome::Drew => format!("The duel ended {}–{}.", scores[i], scores[1 - i]),
            };
            deps.notifier.notify(seat.participant.id(), message);
        }
    }

    for seat in &seats {
        send_event(
            seat,
            ServerEvent::Finished {
                winner_id: winner_id.clone(),
                final_scores: scores.to_vec(),
                point_deltas: point_deltas.clone(),
                xp_deltas: xp_deltas.clone(),
            },
        )
        .await;
    }
    tracing::info!(%session_id, ?winner_id, ?scores, "live session finished");
}

/// Runs the fixed answer window to wall-clock completion, recording at most
/// one answer per seat and only for the current question id.
async fn collect_answers(
    seats: &mut [LiveSeat; 2],
    question_id: &str,
    window: std::time::Duration,
) -> [Option<RecordedAnswer>; 2] {
    let deadline = Instant::now() + window;
    let mut answers: [Option<RecordedAnswer>; 2] = [None, None];
    let mut open = [seats[0].answers.is_some(), seats[1].answers.is_some()];
    let [seat_a, seat_b] = seats;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            msg = recv_from(&mut seat_a.answers), if open[0] => {
                match msg {
                    Some(msg) => record(&mut answers[0], msg, question_id, window),
                    None => open[0] = false,
                }
            }
            msg = recv_from(&mut seat_b.answers), if open[1] => {
                match msg {
                    Some(msg) => record(&mut answers[1], msg, question_id, window),
                    None => open[1] = false,
                }
            }
        }
    }
    answers
}

async fn recv_from(rx: &mut Option<mpsc::Receiver<AnswerMsg>>) -> Option<AnswerMsg> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn record(
    slot: &mut Option<RecordedAnswer>,
    msg: AnswerMsg,
    question_id: &str,
    window: std::time::Duration,
) {
    if slot.is_some() || msg.question_id != question_id {
        return;
    }
    let cap = window.as_millis() as u64;
    *slot = Some(RecordedAnswer {
        choice: msg.choice,
        elapsed_ms: msg.elapsed_ms.min(cap),
        answered_at: Utc::now(),
    });
}

async fn send_event(seat: &LiveSeat, event: ServerEvent) {
    if let Some(tx) = &seat.events {
        // A gone connection is skipped; the round runs on regardless.
        if tx.send(event).await.is_err() {
            tracing::debug!(
                participant = seat.participant.id(),
                "dropping event for closed connection"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::MemoryProgression;
    use crate::question::{BankSource, Question};

    fn deps(questions: Vec<Question>) -> (Arc<LiveDeps>, Arc<MemoryProgression>) {
        let progression = Arc::new(MemoryProgression::default());
        let mut cfg = Config::default();
        cfg.round_window = std::time::Duration::from_millis(50);
        cfg.best_of = 3;
        (
            Arc::new(LiveDeps {
                cfg,
                questions: Arc::new(BankSource::new(questions)),
                progression: progression.clone(),
                notifier: Arc::new(Notifier::new()),
            }),
            progression,
        )
    }

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            subject: "geo".to_string(),
            stem: "capital?".to_string(),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 1,
            explanation: String::new(),
        }
    }

    fn human_seat(
        id: &str,
    ) -> (LiveSeat, mpsc::Receiver<ServerEvent>, mpsc::Sender<AnswerMsg>) {
        let (etx, erx) = mpsc::channel(32);
        let (atx, arx) = mpsc::channel(32);
        let seat = LiveSeat {
            participant: Participant::Human(crate::model::PlayerRef {
                id: id.to_string(),
                name: id.to_string(),
                avatar: String::new(),
                level: 5,
                points: 500,
            }),
            events: Some(etx),
            answers: Some(arx),
        };
        (seat, erx, atx)
    }

    async fn drive(mut erx: mpsc::Receiver<ServerEvent>, atx: mpsc::Sender<AnswerMsg>, choice: usize, elapsed_ms: u64) -> Vec<ServerEvent> {
        let mut seen = Vec::new();
        while let Some(event) = erx.recv().await {
            if let ServerEvent::Question { id, .. } = &event {
                let _ = atx
                    .send(AnswerMsg {
                        question_id: id.clone(),
                        choice,
                        elapsed_ms,
                    })
                    .await;
            }
            let done = matches!(event, ServerEvent::Finished { .. });
            seen.push(event);
            if done {
                break;
            }
        }
        seen
    }

    #[tokio::test]
    async fn faster_correct_player_wins_best_of_three() {
        let (deps, progression) = deps(vec![question("q1"), question("q2"), question("q3")]);
        let (seat_a, erx_a, atx_a) = human_seat("alice");
        let (seat_b, erx_b, atx_b) = human_seat("bob");

        let a = tokio::spawn(drive(erx_a, atx_a, 1, 2000));
        let b = tokio::spawn(drive(erx_b, atx_b, 1, 2500));
        run_session(deps, "geo".to_string(), [seat_a, seat_b]).await;

        let events = a.await.unwrap();
        let finished = events
            .iter()
            .find_map(|e| match e {
                ServerEvent::Finished {
                    winner_id,
                    final_scores,
                    ..
                } => Some((winner_id.clone(), final_scores.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(finished.0.as_deref(), Some("alice"));
        // Majority of 3 is 2; alice takes the first two rounds.
        assert_eq!(finished.1, vec![2, 0]);
        b.await.unwrap();

        let alice = progression.totals("alice");
        let bob = progression.totals("bob");
        assert_eq!(alice.wins, 1);
        assert_eq!(alice.settlements, 1);
        assert_eq!(bob.losses, 1);
        assert_eq!(alice.points, score::WIN_POINTS);
        assert_eq!(bob.points, score::LOSS_POINTS);
    }

    #[tokio::test]
    async fn bot_opponent_answers_within_the_window() {
        // Band latency floor exceeds the shrunken test window, so pin the
        // window above the floor instead.
        let progression = Arc::new(MemoryProgression::default());
        let mut cfg = Config::default();
        cfg.round_window = std::time::Duration::from_secs(15);
        cfg.best_of = 1;
        let deps = Arc::new(LiveDeps {
            cfg,
            questions: Arc::new(BankSource::new(vec![question("q1")])),
            progression: progression.clone(),
            notifier: Arc::new(Notifier::new()),
        });

        tokio::time::pause();
        let (seat_a, erx_a, atx_a) = human_seat("alice");
        let bot_profile = crate::bot::create_bot(5, 500);
        let bot_id = bot_profile.id.clone();
        let seat_b = LiveSeat::bot(bot_profile);

        // Alice answers wrong; only the bot can take the round.
        let a = tokio::spawn(drive(erx_a, atx_a, 0, 1500));
        run_session(deps, "geo".to_string(), [seat_a, seat_b]).await;
        let events = a.await.unwrap();

        let result = events
            .iter()
            .find_map(|e| match e {
                ServerEvent::Result { results, .. } => Some(results.clone()),
                _ => None,
            })
            .unwrap();
        let bot_result = result.iter().find(|r| r.participant_id == bot_id).unwrap();
        assert!(bot_result.answered, "bot latency must beat the window");
        // Bot settlement never reaches the progression store.
        assert_eq!(progression.totals(&bot_id).settlements, 0);
    }

    #[tokio::test]
    async fn question_exhaustion_aborts_without_settlement() {
        let (deps, progression) = deps(vec![]);
        let (seat_a, erx_a, atx_a) = human_seat("alice");
        let (seat_b, erx_b, atx_b) = human_seat("bob");
        drop(erx_b);

        let a = tokio::spawn(async move {
            let mut erx = erx_a;
            let mut events = Vec::new();
            while let Some(e) = erx.recv().await {
                events.push(e);
            }
            events
        });
        run_session(deps, "geo".to_string(), [seat_a, seat_b]).await;
        drop(atx_a);
        drop(atx_b);

        let events = a.await.unwrap();
        assert!(events
            .iter()
            .all(|e| !matches!(e, ServerEvent::Finished { .. })));
        assert_eq!(progression.totals("alice").settlements, 0);
        assert_eq!(progression.totals("bob").settlements, 0);
    }
}
