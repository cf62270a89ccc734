use crate::AppState;
use crate::error::AppError;
use crate::helpers::{generate_lobby_id, now_millis};
use crate::validation;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use dexquiz_core::{
    DetailedState, GuessResult, LobbySnapshot, Player, QuizError, QuizSession, SessionSummary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Attempts at drawing an unused lobby id before giving up.
const LOBBY_ID_ATTEMPTS: usize = 5;

#[derive(Deserialize)]
pub(crate) struct UsernameRequest {
    #[serde(default)]
    username: String,
}

#[derive(Deserialize)]
pub(crate) struct GuessRequest {
    #[serde(default)]
    player: String,
    #[serde(default)]
    guess: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LobbyResponse {
    lobby_id: String,
    player: String,
    state: SessionSummary,
}

#[derive(Serialize)]
pub(crate) struct StateResponse {
    lobby: Option<LobbySnapshot>,
    game: DetailedState,
}

#[derive(Serialize)]
pub(crate) struct GuessResponse {
    #[serde(flatten)]
    result: GuessResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    players: Option<Vec<Player>>,
}

#[derive(Serialize)]
pub(crate) struct StatusResponse<S> {
    status: S,
    state: SessionSummary,
}

#[debug_handler]
pub(crate) async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UsernameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.trim().to_string();
    validation::validate_username(&username)?;

    let mut lobby_id = None;
    for _ in 0..LOBBY_ID_ATTEMPTS {
        let candidate = generate_lobby_id();
        match state.registry.create_lobby(&candidate).await {
            Ok(_) => {
                lobby_id = Some(candidate);
                break;
            }
            Err(QuizError::LobbyAlreadyExists(_)) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    let lobby_id = lobby_id.ok_or_else(|| QuizError::LobbyAlreadyExists("<generated>".into()))?;

    add_player(&state, &lobby_id, &username).await?;

    let now = now_millis();
    let summary = state
        .registry
        .get_or_create(&lobby_id, None, |session| session.summary(now))
        .await;
    tracing::info!(lobby = %lobby_id, player = %username, "game created");

    Ok((
        StatusCode::CREATED,
        Json(LobbyResponse {
            lobby_id,
            player: username,
            state: summary,
        }),
    ))
}

#[debug_handler]
pub(crate) async fn join_game(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
    Json(payload): Json<UsernameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.trim().to_string();
    validation::validate_username(&username)?;

    add_player(&state, &lobby_id, &username).await?;

    let now = now_millis();
    let summary = state
        .registry
        .get_or_create(&lobby_id, None, |session| session.summary(now))
        .await;

    Ok(Json(LobbyResponse {
        lobby_id,
        player: username,
        state: summary,
    }))
}

pub(crate) async fn game_state(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = now_millis();
    let game = state
        .registry
        .require_session(&lobby_id, |session| session.detailed_state(now))
        .await?;
    let lobby = state.registry.lobby_snapshot(&lobby_id).await;

    Ok(Json(StateResponse { lobby, game }))
}

#[debug_handler]
pub(crate) async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
    Json(payload): Json<GuessRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_guess(&payload.guess)?;
    // Rosters hold trimmed names
    let player = payload.player.trim();

    let now = now_millis();
    let result = state
        .registry
        .require_session(&lobby_id, |session| {
            session.submit_guess(player, &payload.guess, now)
        })
        .await?;

    let mut players = None;
    if result.is_accepted() && !player.is_empty() {
        let scored = state
            .registry
            .with_lobby(&lobby_id, |lobby| {
                lobby
                    .add_score(player, 1)
                    .map(|score| (score, lobby.players().to_vec()))
            })
            .await;
        match scored {
            Some(Ok((score, roster))) => {
                tracing::debug!(lobby = %lobby_id, player = %player, score, "score updated");
                players = Some(roster);
            }
            Some(Err(err)) => {
                // Guess still counts for the board, just not for anyone's score
                tracing::warn!(lobby = %lobby_id, %err, "accepted guess from player outside the lobby");
            }
            None => {}
        }
    }

    let status = if result.is_accepted() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(GuessResponse { result, players })))
}

pub(crate) async fn lobby_players(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .registry
        .lobby_snapshot(&lobby_id)
        .await
        .ok_or(QuizError::LobbyNotFound(lobby_id))?;
    Ok(Json(snapshot))
}

pub(crate) async fn reset_game(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = now_millis();
    let summary = state
        .registry
        .require_session(&lobby_id, |session| {
            session.reset();
            session.summary(now)
        })
        .await?;

    Ok(Json(StatusResponse {
        status: "reset",
        state: summary,
    }))
}

pub(crate) async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = now_millis();
    let start = |session: &mut QuizSession| StatusResponse {
        status: session.start(now),
        state: session.summary(now),
    };

    if let Some(response) = state.registry.with_session(&lobby_id, start).await {
        return Ok(Json(response));
    }

    // Lobby exists but its session was never created: create it now
    if !state.registry.has_lobby(&lobby_id).await {
        return Err(QuizError::LobbyNotFound(lobby_id).into());
    }
    let response = state.registry.get_or_create(&lobby_id, None, start).await;
    Ok(Json(response))
}

pub(crate) async fn pause_game(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = now_millis();
    let response = state
        .registry
        .require_session(&lobby_id, |session| StatusResponse {
            status: session.pause(now),
            state: session.summary(now),
        })
        .await?;

    Ok(Json(response))
}

async fn add_player(state: &AppState, lobby_id: &str, username: &str) -> Result<(), AppError> {
    state
        .registry
        .with_lobby(lobby_id, |lobby| lobby.add_player(username).map(|_| ()))
        .await
        .ok_or_else(|| QuizError::LobbyNotFound(lobby_id.to_string()))??;
    Ok(())
}
