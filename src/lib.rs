pub mod bot;
pub mod config;
pub mod duel;
pub mod error;
pub mod handler;
pub mod live;
pub mod matchmaking;
pub mod model;
pub mod notify;
pub mod progression;
pub mod question;
pub mod score;
pub mod storage;

use std::sync::Arc;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use handler::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE]);

    let trace_layer =
        TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/ws", any(handler::handle_websocket))
        .route(
            "/api/duels",
            get(handler::get_inbox_handler).post(handler::create_match_handler),
        )
        .route("/api/duels/:match_id", get(handler::get_match_handler))
        .route(
            "/api/duels/:match_id/answer",
            post(handler::submit_answer_handler),
        )
        .route(
            "/api/duels/:match_id/resign",
            post(handler::resign_handler),
        )
        .route(
            "/api/notifications/:user",
            get(handler::unread_count_handler).delete(handler::clear_unread_handler),
        )
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}
