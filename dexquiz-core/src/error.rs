use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("username '{0}' already exists; choose a different name")]
    DuplicateName(String),

    #[error("player '{0}' not found in lobby")]
    PlayerNotFound(String),

    #[error("lobby '{0}' already exists")]
    LobbyAlreadyExists(String),

    #[error("lobby '{0}' not found")]
    LobbyNotFound(String),

    #[error("no game session for lobby '{0}'")]
    SessionNotFound(String),

    #[error("catalog must contain at least one name")]
    EmptyCatalog,

    #[error("catalog contains duplicate name '{0}'")]
    DuplicateCatalogEntry(String),
}

pub type Result<T> = std::result::Result<T, QuizError>;
