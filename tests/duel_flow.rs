//! End-to-end coverage of the async duel state machine: turn lifecycle,
//! deadlines, forfeiture, settlement and redaction.

use std::sync::Arc;
use std::time::Duration;

use duel_backend::config::Config;
use duel_backend::duel::{CreateMatchRequest, DuelService};
use duel_backend::error::AppError;
use duel_backend::model::{MatchStatus, PlayerRef};
use duel_backend::notify::Notifier;
use duel_backend::progression::MemoryProgression;
use duel_backend::question::{BankSource, Question};
use duel_backend::score;
use duel_backend::storage::MemoryStore;

const CORRECT: usize = 1;
const WRONG: usize = 0;

struct Harness {
    duels: Arc<DuelService>,
    progression: Arc<MemoryProgression>,
    notifier: Arc<Notifier>,
}

fn harness(cfg: Config) -> Harness {
    harness_with_store(cfg, Arc::new(MemoryStore::default()))
}

fn harness_with_store(cfg: Config, store: Arc<MemoryStore>) -> Harness {
    let questions: Vec<Question> = (0..20)
        .map(|i| Question {
            id: format!("q{i}"),
            subject: "geo".to_string(),
            stem: format!("question {i}"),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: CORRECT,
            explanation: "because".to_string(),
        })
        .collect();
    let progression = Arc::new(MemoryProgression::default());
    let notifier = Arc::new(Notifier::new());
    let duels = DuelService::new(
        cfg,
        Arc::new(BankSource::new(questions)),
        progression.clone(),
        notifier.clone(),
        store,
    );
    Harness {
        duels,
        progression,
        notifier,
    }
}

fn player(id: &str) -> PlayerRef {
    PlayerRef {
        id: id.to_string(),
        name: id.to_string(),
        avatar: String::new(),
        level: 10,
        points: 700,
    }
}

fn base_cfg() -> Config {
    let mut cfg = Config::default();
    cfg.settle_delay = Duration::from_millis(10);
    cfg
}

/// Creates an alice-vs-bob match via explicit challenge and returns its id.
async fn challenge(h: &Harness) -> uuid::Uuid {
    h.duels.register_player(&player("bob"));
    let created = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("alice"),
            subject: "geo".to_string(),
            opponent_id: Some("bob".to_string()),
        })
        .await
        .unwrap();
    assert!(!created.existing);
    created.view.id
}

#[tokio::test(start_paused = true)]
async fn best_of_seven_terminates_at_four_and_settles_once() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    for turn in 1..=4u32 {
        let view = h
            .duels
            .submit_answer(id, "alice", CORRECT, 2000)
            .await
            .unwrap();
        assert_eq!(view.round, turn);
        let view = h
            .duels
            .submit_answer(id, "bob", CORRECT, 2500)
            .await
            .unwrap();
        // Both correct: the faster answer takes the point.
        assert_eq!(view.scores, [turn, 0]);
        if turn < 4 {
            assert_eq!(view.status, MatchStatus::Active);
            // Let the next turn open.
            tokio::time::sleep(Duration::from_millis(50)).await;
        } else {
            assert_eq!(view.status, MatchStatus::Over);
            assert_eq!(view.winner_id.as_deref(), Some("alice"));
        }
    }

    let alice = h.progression.totals("alice");
    let bob = h.progression.totals("bob");
    assert_eq!(alice.settlements, 1);
    assert_eq!(bob.settlements, 1);
    assert_eq!(alice.wins, 1);
    assert_eq!(bob.losses, 1);
    assert_eq!(alice.points, score::WIN_POINTS);
    assert_eq!(bob.points, score::LOSS_POINTS);

    // Observing the terminal state again must not re-settle.
    h.duels.sweep_once().await;
    let err = h.duels.resign_match(id, "bob").await.unwrap_err();
    assert!(matches!(err, AppError::NotActive));
    assert_eq!(h.progression.totals("alice").settlements, 1);
}

#[tokio::test(start_paused = true)]
async fn second_answer_by_same_participant_is_rejected() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    h.duels.submit_answer(id, "alice", WRONG, 1500).await.unwrap();
    let err = h
        .duels
        .submit_answer(id, "alice", CORRECT, 900)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyAnswered));

    // The recorded answer is still the first submission.
    let view = h.duels.get_match_for_user(id, "alice").await.unwrap();
    let own = &view.turns[0].answers["alice"];
    assert_eq!(own.choice, WRONG);
    assert_eq!(own.elapsed_ms, 1500);
}

#[tokio::test(start_paused = true)]
async fn revealed_turn_accepts_no_more_answers() {
    let mut cfg = base_cfg();
    // Keep the next turn from opening under the test.
    cfg.settle_delay = Duration::from_secs(3600);
    let h = harness(cfg);
    let id = challenge(&h).await;

    h.duels.submit_answer(id, "alice", CORRECT, 1000).await.unwrap();
    let view = h.duels.submit_answer(id, "bob", WRONG, 1200).await.unwrap();
    assert!(view.turns[0].revealed);

    let err = h
        .duels
        .submit_answer(id, "alice", CORRECT, 500)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoOpenTurn));
}

#[tokio::test(start_paused = true)]
async fn membership_and_challenge_targets_are_checked() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    let err = h
        .duels
        .submit_answer(id, "mallory", CORRECT, 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAMember));

    let err = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("alice"),
            subject: "geo".to_string(),
            opponent_id: Some("nobody".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::OpponentNotFound));

    let err = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("alice"),
            subject: "geo".to_string(),
            opponent_id: Some("alice".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SelfChallenge));
}

#[tokio::test(start_paused = true)]
async fn challenging_the_same_pair_returns_the_existing_match() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    let again = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("bob"),
            subject: "geo".to_string(),
            opponent_id: Some("alice".to_string()),
        })
        .await
        .unwrap();
    assert!(again.existing);
    assert_eq!(again.view.id, id);
}

#[tokio::test]
async fn sweep_awards_forfeit_point_to_the_sole_answerer() {
    let mut cfg = base_cfg();
    cfg.turn_deadline = chrono::Duration::zero();
    cfg.settle_delay = Duration::from_secs(3600);
    let h = harness(cfg);
    let id = challenge(&h).await;

    // Deadline is already in the past; record alice's answer directly.
    // A wrong answer still wins a forfeited turn.
    let err = h
        .duels
        .submit_answer(id, "alice", WRONG, 3000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DeadlinePassed));

    // Re-run with a deadline that leaves room to answer first.
    let mut cfg = base_cfg();
    cfg.turn_deadline = chrono::Duration::milliseconds(80);
    cfg.settle_delay = Duration::from_secs(3600);
    let h = harness(cfg);
    let id = challenge(&h).await;
    h.duels.submit_answer(id, "alice", WRONG, 3000).await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    h.duels.sweep_once().await;

    let view = h.duels.get_match_for_user(id, "alice").await.unwrap();
    assert!(view.turns[0].revealed);
    assert_eq!(view.scores, [1, 0]);
    assert_eq!(view.status, MatchStatus::Active);
}

#[tokio::test]
async fn sweep_reveals_unanswered_turn_without_a_point() {
    let mut cfg = base_cfg();
    cfg.turn_deadline = chrono::Duration::milliseconds(40);
    cfg.best_of = 1;
    let h = harness(cfg);
    let id = challenge(&h).await;

    tokio::time::sleep(Duration::from_millis(80)).await;
    h.duels.sweep_once().await;

    let view = h.duels.get_match_for_user(id, "bob").await.unwrap();
    assert!(view.turns[0].revealed);
    assert_eq!(view.scores, [0, 0]);
    // best_of exhausted with equal scores: the match ends as a draw.
    assert_eq!(view.status, MatchStatus::Over);
    assert_eq!(view.winner_id, None);
    assert_eq!(h.progression.totals("alice").settlements, 1);
    assert_eq!(h.progression.totals("alice").points, score::DRAW_POINTS);
}

#[tokio::test(start_paused = true)]
async fn unrevealed_turns_are_redacted_for_the_opponent() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    h.duels.submit_answer(id, "alice", CORRECT, 1000).await.unwrap();

    let bob_view = h.duels.get_match_for_user(id, "bob").await.unwrap();
    let turn = &bob_view.turns[0];
    assert!(!turn.revealed);
    assert_eq!(turn.correct_index, None);
    assert_eq!(turn.explanation, None);
    assert!(!turn.answers.contains_key("alice"));

    let alice_view = h.duels.get_match_for_user(id, "alice").await.unwrap();
    assert!(alice_view.turns[0].answers.contains_key("alice"));
    assert_eq!(alice_view.turns[0].correct_index, None);
}

#[tokio::test(start_paused = true)]
async fn resignation_hands_the_match_to_the_opponent() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    let view = h.duels.resign_match(id, "bob").await.unwrap();
    assert_eq!(view.status, MatchStatus::Over);
    assert_eq!(view.winner_id.as_deref(), Some("alice"));
    assert_eq!(h.progression.totals("alice").wins, 1);
    assert_eq!(h.progression.totals("bob").losses, 1);
    // No further turn may open after resignation.
    tokio::time::sleep(Duration::from_secs(5)).await;
    let view = h.duels.get_match_for_user(id, "alice").await.unwrap();
    assert_eq!(view.turns.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn restore_reopens_the_next_turn_after_a_restart() {
    let mut cfg = base_cfg();
    // Long enough that turn 2 cannot open before the "restart".
    cfg.settle_delay = Duration::from_secs(3600);
    let store = Arc::new(MemoryStore::default());
    let h = harness_with_store(cfg.clone(), store.clone());
    let id = challenge(&h).await;

    h.duels.submit_answer(id, "alice", CORRECT, 1000).await.unwrap();
    h.duels.submit_answer(id, "bob", WRONG, 1500).await.unwrap();
    let view = h.duels.get_match_for_user(id, "alice").await.unwrap();
    assert!(view.turns[0].revealed);
    assert_eq!(view.turns.len(), 1, "next turn is still pending its delay");

    // A fresh service over the same store stands in for a restarted process.
    let restarted = harness_with_store(cfg, store);
    restarted.duels.restore().await.unwrap();

    let view = restarted
        .duels
        .get_match_for_user(id, "alice")
        .await
        .unwrap();
    assert_eq!(view.status, MatchStatus::Active);
    assert_eq!(view.round, 2, "restore must reopen the pending turn");
    assert!(!view.turns[1].revealed);

    // The reopened turn plays like any other.
    restarted
        .duels
        .submit_answer(id, "alice", CORRECT, 900)
        .await
        .unwrap();
    let view = restarted
        .duels
        .submit_answer(id, "bob", WRONG, 1100)
        .await
        .unwrap();
    assert_eq!(view.scores, [2, 0]);
}

#[tokio::test(start_paused = true)]
async fn pool_pairing_reuses_an_existing_match_between_the_pair() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    let duels = h.duels.clone();
    let first = tokio::spawn(async move {
        duels
            .create_match(CreateMatchRequest {
                initiator: player("alice"),
                subject: "geo".to_string(),
                opponent_id: None,
            })
            .await
            .unwrap()
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("bob"),
            subject: "geo".to_string(),
            opponent_id: None,
        })
        .await
        .unwrap();
    let first = first.await.unwrap();

    assert!(second.existing);
    assert_eq!(second.view.id, id);
    assert_eq!(first.view.id, id);
    assert_eq!(h.duels.inbox("alice").await.len(), 1, "no duplicate match");
}

#[tokio::test(start_paused = true)]
async fn pool_creation_pairs_two_concurrent_requests() {
    let h = harness(base_cfg());
    let duels = h.duels.clone();
    let first = tokio::spawn(async move {
        duels
            .create_match(CreateMatchRequest {
                initiator: player("alice"),
                subject: "geo".to_string(),
                opponent_id: None,
            })
            .await
            .unwrap()
    });
    // Give the first request time to enqueue its ticket.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("bob"),
            subject: "geo".to_string(),
            opponent_id: None,
        })
        .await
        .unwrap();
    let first = first.await.unwrap();

    assert_eq!(first.view.id, second.view.id);
    let ids: Vec<&str> = second.view.players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "bob"]);
}

#[tokio::test(start_paused = true)]
async fn pool_creation_falls_back_to_a_stealth_bot() {
    let h = harness(base_cfg());
    let created = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("alice"),
            subject: "geo".to_string(),
            opponent_id: None,
        })
        .await
        .unwrap();

    assert_eq!(created.view.players[0].id, "alice");
    assert!(created.view.players[1].id.starts_with("bot-"));
    assert_eq!(created.view.round, 1, "turn 1 opens immediately");
    // The opponent's display shape carries no hint of its nature.
    let json = serde_json::to_value(&created.view.players[1]).unwrap();
    assert!(json.get("band").is_none());
    assert!(json.get("accuracy").is_none());
}

#[tokio::test(start_paused = true)]
async fn inbox_reports_turn_state_for_both_sides() {
    let h = harness(base_cfg());
    let id = challenge(&h).await;

    h.duels.submit_answer(id, "alice", CORRECT, 1000).await.unwrap();

    let alice_inbox = h.duels.inbox("alice").await;
    assert_eq!(alice_inbox.len(), 1);
    assert_eq!(alice_inbox[0].match_id, id);
    assert!(!alice_inbox[0].your_turn, "alice already answered");
    assert_eq!(alice_inbox[0].opponent.id, "bob");

    let bob_inbox = h.duels.inbox("bob").await;
    assert!(bob_inbox[0].your_turn);
    assert!(bob_inbox[0].time_left_secs.unwrap() > 0);
    assert_eq!(bob_inbox[0].scores, [0, 0]);

    assert!(h.duels.inbox("mallory").await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn match_outcome_notifies_humans_only() {
    let h = harness(base_cfg());
    let created = h
        .duels
        .create_match(CreateMatchRequest {
            initiator: player("alice"),
            subject: "geo".to_string(),
            opponent_id: None,
        })
        .await
        .unwrap();
    let id = created.view.id;
    let bot_id = created.view.players[1].id.clone();

    let view = h.duels.resign_match(id, "alice").await.unwrap();
    assert_eq!(view.winner_id.as_deref(), Some(bot_id.as_str()));
    assert!(h.notifier.unread_count("alice") > 0);
    assert_eq!(h.notifier.unread_count(&bot_id), 0);
    // The bot never reaches the progression store.
    assert_eq!(h.progression.totals(&bot_id).settlements, 0);
    assert_eq!(h.progression.totals("alice").losses, 1);
}
