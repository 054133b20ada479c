use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::duel::{CreateMatchRequest, DuelService};
use crate::error::AppError;
use crate::live::{AnswerMsg, LiveDeps, LiveSeat};
use crate::matchmaking::Lobby;
use crate::model::{Participant, PlayerRef};

pub struct AppState {
    pub duels: Arc<DuelService>,
    pub lobby: Arc<Lobby>,
    pub live: Arc<LiveDeps>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub participant_id: String,
    pub choice: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ResignRequest {
    pub participant_id: String,
}

/// Messages a live client sends over its websocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Join { user: PlayerRef, subject: String },
    Answer(AnswerMsg),
}

pub async fn create_match_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.duels.create_match(req).await?;
    Ok(Json(created))
}

pub async fn get_inbox_handler(
    Query(q): Query<UserQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.duels.inbox(&q.user).await;
    Ok(Json(serde_json::json!({
        "count": rows.len(),
        "matches": rows,
    })))
}

pub async fn get_match_handler(
    Path(match_id): Path<Uuid>,
    Query(q): Query<UserQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.duels.get_match_for_user(match_id, &q.user).await?))
}

pub async fn submit_answer_handler(
    Path(match_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .duels
        .submit_answer(match_id, &req.participant_id, req.choice, req.elapsed_ms)
        .await?;
    Ok(Json(view))
}

pub async fn resign_handler(
    Path(match_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResignRequest>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .duels
        .resign_match(match_id, &req.participant_id)
        .await?;
    Ok(Json(view))
}

pub async fn unread_count_handler(
    Path(user): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let count = state.duels.notifier().unread_count(&user);
    Json(serde_json::json!({ "unread": count }))
}

pub async fn clear_unread_handler(
    Path(user): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state.duels.notifier().clear(&user);
    StatusCode::NO_CONTENT
}

pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket_connection(socket, state))
}

/// Bridges one live connection: the first message must be a join, which
/// enqueues the player; afterwards session events stream out and answer
/// submissions stream in.
async fn handle_socket_connection(mut socket: WebSocket, state: Arc<AppState>) {
    let (user, subject) = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Join { user, subject }) => break (user, subject),
                Ok(_) => continue,
                Err(err) => {
                    tracing::debug!("ignoring malformed client message: {err}");
                    continue;
                }
            },
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => continue,
            Some(Err(_)) => return,
        }
    };
    tracing::info!(user = %user.id, %subject, "live player joined queue");
    state.duels.register_player(&user);

    let (event_tx, mut event_rx) = mpsc::channel(32);
    let (answer_tx, answer_rx) = mpsc::channel(32);
    let seat = LiveSeat {
        participant: Participant::Human(user),
        events: Some(event_tx),
        answers: Some(answer_rx),
    };
    state.lobby.join(Arc::clone(&state.live), subject, seat);

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(msg) => {
                    if sender.send(Message::Text(msg)).await.is_err() {
                        break;
                    }
                }
                Err(err) => tracing::error!("failed to encode event: {err}"),
            }
        }
    });

    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Text(text) = message {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Answer(answer)) => {
                        if answer_tx.send(answer).await.is_err() {
                            break;
                        }
                    }
                    Ok(ClientMessage::Join { .. }) => {
                        tracing::debug!("ignoring second join on open connection");
                    }
                    Err(err) => tracing::debug!("ignoring malformed client message: {err}"),
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    };
    tracing::debug!("live connection closed");
}
