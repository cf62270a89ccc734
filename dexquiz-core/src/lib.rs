//! Session state machine for timed multiplayer naming quizzes.
//!
//! A [`SessionRegistry`] owns every [`Lobby`] and [`QuizSession`] in the
//! process. Callers route each operation through the registry, which grants
//! exclusive access to one entry at a time.

mod catalog;
mod error;
mod lobby;
mod normalize;
mod registry;
mod session;

pub use catalog::{Catalog, GENERATION_1, Position};
pub use error::{QuizError, Result};
pub use lobby::{Lobby, LobbySnapshot, Player};
pub use normalize::normalize;
pub use registry::SessionRegistry;
pub use session::{
  Accepted, DEFAULT_DURATION_SECS, DetailedState, GuessEvent, GuessOutcome, GuessResult,
  MAX_LOG_ENTRIES, PauseStatus, QuizSession, RejectReason, SessionSummary, StartStatus,
};
