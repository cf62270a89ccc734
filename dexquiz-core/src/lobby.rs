//! Player roster and per-player scores for a lobby.

use serde::Serialize;
use tracing::debug;

use crate::error::{QuizError, Result};

/// A single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
        }
    }

    /// Apply `delta` and return the new score. The score never drops below zero.
    pub fn add_score(&mut self, delta: i64) -> u32 {
        let next = (i64::from(self.score) + delta).clamp(0, i64::from(u32::MAX));
        self.score = next as u32;
        self.score
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
    }
}

/// Serializable view of a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub id: String,
    pub players: Vec<Player>,
    pub player_count: usize,
    pub score_total: u64,
}

/// Roster of uniquely named players.
#[derive(Debug, Clone)]
pub struct Lobby {
    id: String,
    /// Insertion order is the display order; rosters are small so lookups scan.
    players: Vec<Player>,
}

impl Lobby {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            players: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a new player with a score of zero.
    /// Names are compared exactly; an existing name is rejected without touching the roster.
    pub fn add_player(&mut self, name: &str) -> Result<&Player> {
        if self.position_of(name).is_some() {
            return Err(QuizError::DuplicateName(name.to_string()));
        }
        self.players.push(Player::new(name));
        debug!(lobby = %self.id, player = name, "player added");
        self.players
            .last()
            .ok_or_else(|| QuizError::PlayerNotFound(name.to_string()))
    }

    /// Remove a player. Returns whether anyone was removed.
    pub fn remove_player(&mut self, name: &str) -> bool {
        match self.position_of(name) {
            Some(idx) => {
                // Keep display order stable, so no swap_remove here.
                self.players.remove(idx);
                debug!(lobby = %self.id, player = name, "player removed");
                true
            }
            None => false,
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Adjust a player's score and return the new value.
    pub fn add_score(&mut self, name: &str, delta: i64) -> Result<u32> {
        let idx = self
            .position_of(name)
            .ok_or_else(|| QuizError::PlayerNotFound(name.to_string()))?;
        let score = self.players[idx].add_score(delta);
        debug!(lobby = %self.id, player = name, delta, score, "score updated");
        Ok(score)
    }

    pub fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.reset_score();
        }
    }

    pub fn to_snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            id: self.id.clone(),
            players: self.players.clone(),
            player_count: self.players.len(),
            score_total: self.players.iter().map(|p| u64::from(p.score)).sum(),
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }
}
