//! Stealth opponent synthesis. Profiles look like ordinary players; the
//! accuracy band and latency range stay server-side and never reach a view.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const NAMES: &[&str] = &[
    "Mara", "Jonas", "Elif", "Theo", "Sanne", "Piotr", "Lena", "Marco", "Ines", "Viktor", "Amara",
    "Felix", "Noor", "Ruben", "Clara", "Dario", "Maja", "Oskar", "Livia", "Emre",
];

const AVATARS: &[&str] = &[
    "fox", "owl", "badger", "lynx", "otter", "raven", "hedgehog", "stoat",
];

/// Minimum plausible human latency; nobody taps an answer faster than this.
const LATENCY_FLOOR: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotProfile {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub level: u32,
    pub points: i64,
    pub band: SkillBand,
}

/// Accuracy and live-round latency range, derived from the points the bot
/// was targeted at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkillBand {
    pub accuracy: f64,
    pub latency_min_s: f64,
    pub latency_max_s: f64,
}

impl SkillBand {
    fn for_points(points: i64) -> Self {
        let (accuracy, latency_min_s, latency_max_s) = if points < 400 {
            (0.52, 6.0, 10.0)
        } else if points < 900 {
            (0.62, 5.0, 9.0)
        } else if points < 1500 {
            (0.70, 4.0, 8.0)
        } else {
            (0.78, 3.0, 7.0)
        };
        Self {
            accuracy,
            latency_min_s,
            latency_max_s,
        }
    }
}

/// Synthesizes an opponent resembling a player of comparable skill. Level and
/// points sit near the target with a little jitter so repeated fallbacks do
/// not produce identical-looking opponents.
pub fn create_bot(target_level: u32, target_points: i64) -> BotProfile {
    let mut rng = rand::rng();
    let level = target_level
        .saturating_add_signed(rng.random_range(-2..=2))
        .max(1);
    let points = (target_points + rng.random_range(-120..=120)).max(0);
    BotProfile {
        id: format!("bot-{}", Uuid::new_v4()),
        name: NAMES[rng.random_range(0..NAMES.len())].to_string(),
        avatar: AVATARS[rng.random_range(0..AVATARS.len())].to_string(),
        level,
        points,
        band: SkillBand::for_points(target_points),
    }
}

/// A decided answer: which choice the bot submits and how long it pretends
/// to have thought about it.
#[derive(Debug, Clone, Copy)]
pub struct BotAnswer {
    pub choice: usize,
    pub latency: Duration,
}

/// Decides one live round for this profile. Correct with the band's accuracy
/// (plus small jitter), otherwise a uniformly random wrong choice; latency is
/// triangular over the band's range with the mode near the midpoint.
pub fn decide(profile: &BotProfile, correct_index: usize, choice_count: usize) -> BotAnswer {
    let mut rng = rand::rng();
    let accuracy = (profile.band.accuracy + rng.random_range(-0.03..0.03)).clamp(0.0, 1.0);
    let choice = if rng.random_bool(accuracy) {
        correct_index
    } else {
        wrong_choice(&mut rng, correct_index, choice_count)
    };

    let lo = profile.band.latency_min_s;
    let hi = profile.band.latency_max_s;
    let mode = ((lo + hi) / 2.0 + rng.random_range(-0.5..0.5)).clamp(lo, hi);
    let seconds = triangular(&mut rng, lo, hi, mode);
    BotAnswer {
        choice,
        latency: Duration::from_secs_f64(seconds).max(LATENCY_FLOOR),
    }
}

/// Decides one async turn. Turn answers use their own, flatter distribution:
/// accuracy 65–85 %, response time 5–20 s.
pub fn decide_turn(correct_index: usize, choice_count: usize) -> BotAnswer {
    let mut rng = rand::rng();
    let accuracy = rng.random_range(0.65..0.85);
    let choice = if rng.random_bool(accuracy) {
        correct_index
    } else {
        wrong_choice(&mut rng, correct_index, choice_count)
    };
    BotAnswer {
        choice,
        latency: Duration::from_secs_f64(rng.random_range(5.0..20.0)),
    }
}

/// How long the bot waits before its async answer "arrives": uniform over the
/// configured range plus a few seconds of jitter.
pub fn turn_delivery_delay(min: Duration, max: Duration) -> Duration {
    let mut rng = rand::rng();
    let base = rng.random_range(min.as_secs_f64()..=max.as_secs_f64());
    Duration::from_secs_f64(base + rng.random_range(0.0..30.0))
}

fn wrong_choice<R: Rng>(rng: &mut R, correct_index: usize, choice_count: usize) -> usize {
    let pick = rng.random_range(0..choice_count.saturating_sub(1).max(1));
    if pick >= correct_index {
        pick + 1
    } else {
        pick
    }
}

fn triangular<R: Rng>(rng: &mut R, lo: f64, hi: f64, mode: f64) -> f64 {
    let u: f64 = rng.random_range(0.0..1.0);
    let cut = (mode - lo) / (hi - lo);
    if u < cut {
        lo + (u * (hi - lo) * (mode - lo)).sqrt()
    } else {
        hi - ((1.0 - u) * (hi - lo) * (hi - mode)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_points() {
        assert_eq!(SkillBand::for_points(0).accuracy, 0.52);
        assert_eq!(SkillBand::for_points(399).accuracy, 0.52);
        assert_eq!(SkillBand::for_points(400).accuracy, 0.62);
        assert_eq!(SkillBand::for_points(1200).accuracy, 0.70);
        assert_eq!(SkillBand::for_points(2000).accuracy, 0.78);
    }

    #[test]
    fn latency_never_implausibly_fast() {
        let profile = create_bot(30, 1800);
        for _ in 0..200 {
            let answer = decide(&profile, 1, 4);
            assert!(answer.latency >= LATENCY_FLOOR);
            assert!(answer.latency <= Duration::from_secs(8));
            assert!(answer.choice < 4);
        }
    }

    #[test]
    fn wrong_choices_never_hit_the_key() {
        let mut rng = rand::rng();
        for correct in 0..4 {
            for _ in 0..100 {
                let c = wrong_choice(&mut rng, correct, 4);
                assert_ne!(c, correct);
                assert!(c < 4);
            }
        }
    }

    #[test]
    fn turn_answers_stay_in_range() {
        for _ in 0..200 {
            let answer = decide_turn(2, 4);
            assert!(answer.choice < 4);
            assert!(answer.latency >= Duration::from_secs(5));
            assert!(answer.latency <= Duration::from_secs(20));
        }
    }
}
