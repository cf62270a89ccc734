//! Process-wide store of lobbies and their quiz sessions.
//!
//! Built once at startup and handed to the request layer. Both maps use
//! `scc::HashMap`, whose entry-level locking gives each closure exclusive
//! access to one session or lobby, so concurrent requests against the same
//! id are serialized while different ids proceed in parallel.
//! Nothing is evicted; entries live until the process exits.

use std::sync::Arc;

use scc::HashMap;
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{QuizError, Result};
use crate::lobby::{Lobby, LobbySnapshot};
use crate::session::{DEFAULT_DURATION_SECS, QuizSession};

pub struct SessionRegistry {
    catalog: Arc<Catalog>,
    default_duration: u64,
    sessions: HashMap<String, QuizSession>,
    lobbies: HashMap<String, Lobby>,
}

impl SessionRegistry {
    pub fn new(catalog: Arc<Catalog>, default_duration: u64) -> Self {
        Self {
            catalog,
            default_duration,
            sessions: HashMap::new(),
            lobbies: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn default_duration(&self) -> u64 {
        self.default_duration
    }

    // ========================================================================
    // Lobbies
    // ========================================================================

    /// Register an empty lobby. Fails if the id is taken.
    pub async fn create_lobby(&self, lobby_id: &str) -> Result<LobbySnapshot> {
        let lobby = Lobby::new(lobby_id);
        let snapshot = lobby.to_snapshot();
        self.lobbies
            .insert_async(lobby_id.to_string(), lobby)
            .await
            .map_err(|_| QuizError::LobbyAlreadyExists(lobby_id.to_string()))?;
        info!(lobby = lobby_id, "lobby created");
        Ok(snapshot)
    }

    pub async fn has_lobby(&self, lobby_id: &str) -> bool {
        self.lobbies.read_async(lobby_id, |_, _| ()).await.is_some()
    }

    /// Run `f` with exclusive access to a lobby. `None` if it doesn't exist.
    pub async fn with_lobby<R>(&self, lobby_id: &str, f: impl FnOnce(&mut Lobby) -> R) -> Option<R> {
        self.lobbies
            .update_async(lobby_id, |_, lobby| f(lobby))
            .await
    }

    pub async fn lobby_snapshot(&self, lobby_id: &str) -> Option<LobbySnapshot> {
        self.lobbies
            .read_async(lobby_id, |_, lobby| lobby.to_snapshot())
            .await
    }

    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Run `f` against the session for `lobby_id`, creating it first if needed.
    /// `duration` only applies when the session is created here; it falls back
    /// to the registry default.
    pub async fn get_or_create<R>(
        &self,
        lobby_id: &str,
        duration: Option<u64>,
        f: impl FnOnce(&mut QuizSession) -> R,
    ) -> R {
        let mut entry = self
            .sessions
            .entry_async(lobby_id.to_string())
            .await
            .or_insert_with(|| {
                let duration = duration.unwrap_or(self.default_duration);
                info!(lobby = lobby_id, duration, "session created");
                QuizSession::new(lobby_id, duration, Arc::clone(&self.catalog))
            });
        f(entry.get_mut())
    }

    /// Run `f` against an existing session. `None` if there is none.
    pub async fn with_session<R>(
        &self,
        lobby_id: &str,
        f: impl FnOnce(&mut QuizSession) -> R,
    ) -> Option<R> {
        self.sessions
            .update_async(lobby_id, |_, session| f(session))
            .await
    }

    /// Like [`Self::with_session`] but treats a missing session as an error.
    pub async fn require_session<R>(
        &self,
        lobby_id: &str,
        f: impl FnOnce(&mut QuizSession) -> R,
    ) -> Result<R> {
        self.with_session(lobby_id, f)
            .await
            .ok_or_else(|| QuizError::SessionNotFound(lobby_id.to_string()))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::generation_one()), DEFAULT_DURATION_SECS)
    }
}
