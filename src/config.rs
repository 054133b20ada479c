use std::time::Duration;

/// Timing and scoring knobs, overridable via environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// How long a queue ticket waits for a human before bot fallback.
    pub queue_grace: Duration,
    /// Fixed answer window for one live round.
    pub round_window: Duration,
    /// Deadline granted to each async turn.
    pub turn_deadline: chrono::Duration,
    /// Interval of the background pass that forfeits overdue turns.
    pub sweep_interval: Duration,
    /// Range the async bot's answer delivery delay is drawn from.
    pub bot_delay_min: Duration,
    pub bot_delay_max: Duration,
    /// Pause between revealing a turn and opening the next one.
    pub settle_delay: Duration,
    /// Total rounds a match can run; majority of it ends the match early.
    pub best_of: u32,
    pub bind_addr: String,
    /// Directory match files are written to.
    pub data_dir: String,
    /// JSON question bank consumed by the built-in question source.
    pub question_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_grace: Duration::from_secs(8),
            round_window: Duration::from_secs(21),
            turn_deadline: chrono::Duration::hours(24),
            sweep_interval: Duration::from_secs(60),
            bot_delay_min: Duration::from_secs(8 * 60),
            bot_delay_max: Duration::from_secs(45 * 60),
            settle_delay: Duration::from_secs(2),
            best_of: 7,
            bind_addr: "127.0.0.1:8000".to_string(),
            data_dir: "./data/matches".to_string(),
            question_file: "./data/questions.json".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(secs) = env_u64("QUEUE_GRACE_SECS") {
            cfg.queue_grace = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("ROUND_WINDOW_SECS") {
            cfg.round_window = Duration::from_secs(secs);
        }
        if let Some(hours) = env_u64("TURN_DEADLINE_HOURS") {
            cfg.turn_deadline = chrono::Duration::hours(hours as i64);
        }
        if let Some(secs) = env_u64("SWEEP_INTERVAL_SECS") {
            cfg.sweep_interval = Duration::from_secs(secs);
        }
        if let Some(mins) = env_u64("BOT_DELAY_MIN_MINS") {
            cfg.bot_delay_min = Duration::from_secs(mins * 60);
        }
        if let Some(mins) = env_u64("BOT_DELAY_MAX_MINS") {
            cfg.bot_delay_max = Duration::from_secs(mins * 60);
        }
        if let Some(n) = env_u64("BEST_OF") {
            cfg.best_of = n as u32;
        }
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            cfg.bind_addr = addr;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            cfg.data_dir = dir;
        }
        if let Ok(path) = std::env::var("QUESTION_FILE") {
            cfg.question_file = path;
        }
        cfg
    }

    /// Score needed to end a match early: `ceil(best_of / 2)`.
    pub fn majority(&self) -> u32 {
        self.best_of.div_ceil(2)
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}
