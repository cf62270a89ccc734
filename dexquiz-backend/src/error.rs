use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dexquiz_core::QuizError;
use serde::Serialize;

/// API error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>) -> Self {
    Self {
      error: error.into(),
      details: None,
    }
  }

  pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
    Self {
      error: error.into(),
      details: Some(details.into()),
    }
  }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
  Quiz(QuizError),
  ValidationError(String),
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::Quiz(err) => {
        let (status, code) = match &err {
          QuizError::DuplicateName(_) => (StatusCode::CONFLICT, "duplicate_name"),
          QuizError::LobbyAlreadyExists(_) => (StatusCode::CONFLICT, "lobby_exists"),
          QuizError::PlayerNotFound(_) => (StatusCode::NOT_FOUND, "player_not_found"),
          QuizError::LobbyNotFound(_) => (StatusCode::NOT_FOUND, "lobby_not_found"),
          QuizError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "game_not_found"),
          QuizError::EmptyCatalog | QuizError::DuplicateCatalogEntry(_) => {
            // Don't expose configuration problems
            tracing::error!(?err, "catalog error while handling request");
            let error_response = ErrorResponse::new("internal_error");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response();
          }
        };

        tracing::debug!(%err, "request rejected");
        let error_response = ErrorResponse::with_details(code, err.to_string());
        (status, Json(error_response)).into_response()
      }
      AppError::ValidationError(msg) => {
        tracing::warn!(validation_error = %msg, "Validation failed");
        let error_response = ErrorResponse::with_details("invalid_request", msg);
        (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
      }
    }
  }
}

impl From<QuizError> for AppError {
  fn from(err: QuizError) -> Self {
    AppError::Quiz(err)
  }
}

impl From<crate::validation::ValidationError> for AppError {
  fn from(err: crate::validation::ValidationError) -> Self {
    AppError::ValidationError(err.to_string())
  }
}
