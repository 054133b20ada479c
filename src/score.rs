//! Round-outcome and settlement logic shared by the live and async duel
//! paths, so the two temporal models cannot drift apart on scoring.

use crate::model::RecordedAnswer;

/// Point/XP deltas applied at settlement.
pub const WIN_POINTS: i64 = 30;
pub const WIN_XP: i64 = 60;
pub const LOSS_POINTS: i64 = -10;
pub const LOSS_XP: i64 = 15;
pub const DRAW_POINTS: i64 = 0;
pub const DRAW_XP: i64 = 20;

/// Index (0 or 1) of the participant who takes the round point, if anyone.
/// Exactly one correct answer wins; both correct falls to the faster elapsed
/// time; anything else awards nothing.
pub fn round_winner(
    answers: [Option<&RecordedAnswer>; 2],
    correct_index: usize,
) -> Option<usize> {
    let correct: [bool; 2] = [
        answers[0].is_some_and(|a| a.choice == correct_index),
        answers[1].is_some_and(|a| a.choice == correct_index),
    ];
    match correct {
        [true, false] => Some(0),
        [false, true] => Some(1),
        [true, true] => {
            // Both answers are present here by construction.
            let a = answers[0].map(|a| a.elapsed_ms).unwrap_or(u64::MAX);
            let b = answers[1].map(|a| a.elapsed_ms).unwrap_or(u64::MAX);
            if a <= b {
                Some(0)
            } else {
                Some(1)
            }
        }
        [false, false] => None,
    }
}

/// Outcome when a turn is forfeited at its deadline: a sole answerer takes
/// the point regardless of correctness; zero or two answers award nothing.
pub fn forfeit_winner(answers: [Option<&RecordedAnswer>; 2]) -> Option<usize> {
    match (answers[0], answers[1]) {
        (Some(_), None) => Some(0),
        (None, Some(_)) => Some(1),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Drew,
}

/// Deltas owed to one participant for a finished match.
pub fn deltas(outcome: Outcome) -> (i64, i64) {
    match outcome {
        Outcome::Won => (WIN_POINTS, WIN_XP),
        Outcome::Lost => (LOSS_POINTS, LOSS_XP),
        Outcome::Drew => (DRAW_POINTS, DRAW_XP),
    }
}
