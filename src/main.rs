use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_backend::config::Config;
use duel_backend::handler::AppState;
use duel_backend::live::LiveDeps;
use duel_backend::matchmaking::Lobby;
use duel_backend::notify::Notifier;
use duel_backend::progression::MemoryProgression;
use duel_backend::question::{BankSource, QuestionSource};
use duel_backend::storage::JsonFileStore;
use duel_backend::{duel::DuelService, router};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env();

    let questions: Arc<dyn QuestionSource> = match BankSource::from_file(&cfg.question_file) {
        Ok(bank) => Arc::new(bank),
        Err(err) => {
            tracing::warn!("starting with an empty question bank: {err:#}");
            Arc::new(BankSource::new(Vec::new()))
        }
    };
    let progression = Arc::new(MemoryProgression::default());
    let notifier = Arc::new(Notifier::new());
    let store = Arc::new(
        JsonFileStore::open(&cfg.data_dir)
            .await
            .expect("can't open match data directory"),
    );

    let duels = DuelService::new(
        cfg.clone(),
        Arc::clone(&questions),
        progression.clone(),
        Arc::clone(&notifier),
        store,
    );
    let restored = duels.restore().await.expect("can't restore matches");
    tracing::info!(restored, "duel service ready");
    let _sweeper = duels.run_sweeper();

    let live = Arc::new(LiveDeps {
        cfg: cfg.clone(),
        questions,
        progression,
        notifier,
    });
    let state = Arc::new(AppState {
        duels,
        lobby: Arc::new(Lobby::new()),
        live,
    });

    let app = router(state);
    let listener = TcpListener::bind(&cfg.bind_addr).await.unwrap();
    tracing::debug!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
