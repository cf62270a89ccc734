//! Timed quiz session: timer state machine plus guess resolution.
//!
//! Timing model:
//! * A fresh session is not started and reports its full duration as time left.
//! * `start` establishes `ends_at`. While paused the remaining seconds are frozen
//!   and `ends_at` is cleared; resuming rebuilds it from the snapshot.
//! * Once the timer runs out or every catalog entry is guessed the session is
//!   finished, and the next `start` restarts it with a clean board.
//!
//! All time-dependent calls take `now` in Unix milliseconds.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{Catalog, Position};
use crate::normalize::normalize;

/// Default session length (15 minutes).
pub const DEFAULT_DURATION_SECS: u64 = 15 * 60;

/// Oldest events are dropped past this many.
pub const MAX_LOG_ENTRIES: usize = 500;

/// Outcome of [`QuizSession::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartStatus {
  Started,
  AlreadyStarted,
  Resumed,
  Restarted,
}

/// Outcome of [`QuizSession::pause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseStatus {
  NotStarted,
  AlreadyPaused,
  AlreadyFinished,
  Paused,
}

/// Why a guess was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
  NotStarted,
  GameOver,
  Empty,
  Duplicate,
  NotFound,
}

/// One entry of the shared guess log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessEvent {
  pub id: String,
  /// Unix milliseconds
  pub ts: i64,
  pub player: String,
  pub guess: String,
  pub accepted: bool,
  pub reason: Option<RejectReason>,
  pub positions: Vec<Position>,
}

/// Details of an accepted guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
  /// Positions claimed by this guess. May be empty if they were already claimed.
  pub positions: Vec<Position>,
  pub normalized: String,
  pub total_guessed: usize,
  pub remaining: usize,
  pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
  Accepted(Accepted),
  Rejected(RejectReason),
}

/// Result of [`QuizSession::submit_guess`], carrying the logged event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessResult {
  pub outcome: GuessOutcome,
  pub event: GuessEvent,
}

impl GuessResult {
  pub fn is_accepted(&self) -> bool {
    matches!(self.outcome, GuessOutcome::Accepted(_))
  }

  pub fn reason(&self) -> Option<RejectReason> {
    match self.outcome {
      GuessOutcome::Rejected(reason) => Some(reason),
      GuessOutcome::Accepted(_) => None,
    }
  }

  pub fn accepted(&self) -> Option<&Accepted> {
    match &self.outcome {
      GuessOutcome::Accepted(accepted) => Some(accepted),
      GuessOutcome::Rejected(_) => None,
    }
  }
}

// Flat wire shape: {accepted, reason | positions/normalized/..., event}
impl Serialize for GuessResult {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("accepted", &self.is_accepted())?;
    match &self.outcome {
      GuessOutcome::Rejected(reason) => {
        map.serialize_entry("reason", reason)?;
      }
      GuessOutcome::Accepted(accepted) => {
        map.serialize_entry("positions", &accepted.positions)?;
        map.serialize_entry("normalized", &accepted.normalized)?;
        map.serialize_entry("totalGuessed", &accepted.total_guessed)?;
        map.serialize_entry("remaining", &accepted.remaining)?;
        map.serialize_entry("complete", &accepted.complete)?;
      }
    }
    map.serialize_entry("event", &self.event)?;
    map.end()
  }
}

/// Compact state used by polling callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
  pub lobby_id: String,
  pub duration: u64,
  pub time_left: u64,
  pub total: usize,
  pub guessed_count: usize,
  pub is_active: bool,
  pub started: bool,
  pub paused: bool,
}

/// Summary plus the guessed board and the shared log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedState {
  #[serde(flatten)]
  pub summary: SessionSummary,
  pub guessed: BTreeMap<Position, String>,
  pub log: Vec<GuessEvent>,
}

/// A single lobby's timed game.
#[derive(Debug, Clone)]
pub struct QuizSession {
  lobby_id: String,
  duration_secs: u64,
  catalog: Arc<Catalog>,

  // Timer
  started: bool,
  paused: bool,
  started_at: Option<i64>,
  ends_at: Option<i64>,
  paused_remaining: Option<u64>,

  // Board. Every position is in exactly one of `remaining` / `guessed`.
  remaining: BTreeSet<Position>,
  guessed: BTreeSet<Position>,
  guessed_tokens: HashSet<String>,
  aliases: HashMap<String, Vec<Position>>,

  log: VecDeque<GuessEvent>,
}

impl QuizSession {
  pub fn new(lobby_id: impl Into<String>, duration_secs: u64, catalog: Arc<Catalog>) -> Self {
    let aliases = build_aliases(&catalog);
    let remaining = catalog.iter().map(|(pos, _)| pos).collect();
    Self {
      lobby_id: lobby_id.into(),
      duration_secs,
      catalog,
      started: false,
      paused: false,
      started_at: None,
      ends_at: None,
      paused_remaining: None,
      remaining,
      guessed: BTreeSet::new(),
      guessed_tokens: HashSet::new(),
      aliases,
      log: VecDeque::new(),
    }
  }

  pub fn lobby_id(&self) -> &str {
    &self.lobby_id
  }

  pub fn duration(&self) -> u64 {
    self.duration_secs
  }

  pub fn total(&self) -> usize {
    self.catalog.len()
  }

  pub fn guessed_count(&self) -> usize {
    self.guessed.len()
  }

  pub fn remaining_count(&self) -> usize {
    self.remaining.len()
  }

  pub fn is_started(&self) -> bool {
    self.started
  }

  pub fn is_paused(&self) -> bool {
    self.paused
  }

  pub fn is_complete(&self) -> bool {
    self.guessed.len() >= self.catalog.len()
  }

  /// Wall-clock time of the last start or resume.
  pub fn started_at(&self) -> Option<i64> {
    self.started_at
  }

  pub fn log(&self) -> impl Iterator<Item = &GuessEvent> {
    self.log.iter()
  }

  // ========================================================================
  // Timer
  // ========================================================================

  /// Whole seconds left, floored.
  pub fn time_left(&self, now: i64) -> u64 {
    if self.paused {
      if let Some(frozen) = self.paused_remaining {
        return frozen;
      }
    }
    match (self.started, self.ends_at) {
      (true, Some(ends_at)) => ((ends_at - now).max(0) / 1000) as u64,
      _ => self.duration_secs,
    }
  }

  /// Started, not paused and with time on the clock.
  pub fn is_active(&self, now: i64) -> bool {
    self.started && !self.paused && self.time_left(now) > 0
  }

  /// Start, resume or restart the session.
  pub fn start(&mut self, now: i64) -> StartStatus {
    if self.started && self.paused {
      let remaining = self.paused_remaining.unwrap_or(self.duration_secs);
      self.started_at = Some(now);
      self.ends_at = Some(now.saturating_add(secs_to_millis(remaining)));
      self.paused = false;
      self.paused_remaining = None;
      debug!(lobby = %self.lobby_id, remaining, "session resumed");
      return StartStatus::Resumed;
    }

    if self.started && self.is_active(now) {
      return StartStatus::AlreadyStarted;
    }

    let status = if self.started {
      // Finished by time or completion: wipe the board before running again.
      self.reset();
      StartStatus::Restarted
    } else {
      StartStatus::Started
    };

    self.started = true;
    self.started_at = Some(now);
    self.ends_at = Some(now.saturating_add(secs_to_millis(self.duration_secs)));
    info!(lobby = %self.lobby_id, ?status, duration = self.duration_secs, "session running");
    status
  }

  /// Freeze the timer.
  pub fn pause(&mut self, now: i64) -> PauseStatus {
    if !self.started {
      return PauseStatus::NotStarted;
    }
    if self.paused {
      return PauseStatus::AlreadyPaused;
    }
    if !self.is_active(now) {
      return PauseStatus::AlreadyFinished;
    }

    let remaining = self.time_left(now);
    self.paused_remaining = Some(remaining);
    self.paused = true;
    self.ends_at = None;
    debug!(lobby = %self.lobby_id, remaining, "session paused");
    PauseStatus::Paused
  }

  /// Back to a never-started session with a new empty log.
  /// Lobby id, duration and catalog are kept.
  pub fn reset(&mut self) {
    self.started = false;
    self.paused = false;
    self.started_at = None;
    self.ends_at = None;
    self.paused_remaining = None;
    self.remaining = self.catalog.iter().map(|(pos, _)| pos).collect();
    self.guessed.clear();
    self.guessed_tokens.clear();
    self.aliases = build_aliases(&self.catalog);
    self.log = VecDeque::new();
    info!(lobby = %self.lobby_id, "session reset");
  }

  // ========================================================================
  // Guesses
  // ========================================================================

  /// Resolve a guess. Every call, accepted or not, is appended to the log.
  pub fn submit_guess(&mut self, player: &str, raw_guess: &str, now: i64) -> GuessResult {
    if !self.started {
      return self.record(player, raw_guess, GuessOutcome::Rejected(RejectReason::NotStarted), now);
    }
    if !self.is_active(now) {
      return self.record(player, raw_guess, GuessOutcome::Rejected(RejectReason::GameOver), now);
    }

    let token = normalize(raw_guess);
    if token.is_empty() {
      return self.record(player, raw_guess, GuessOutcome::Rejected(RejectReason::Empty), now);
    }
    if self.guessed_tokens.contains(&token) {
      return self.record(player, raw_guess, GuessOutcome::Rejected(RejectReason::Duplicate), now);
    }
    let Some(candidates) = self.aliases.get(&token) else {
      return self.record(player, raw_guess, GuessOutcome::Rejected(RejectReason::NotFound), now);
    };

    let mut positions = Vec::with_capacity(candidates.len());
    for &pos in candidates {
      if self.remaining.remove(&pos) {
        self.guessed.insert(pos);
        positions.push(pos);
      }
    }
    self.guessed_tokens.insert(token.clone());

    let total_guessed = self.guessed.len();
    let complete = self.is_complete();
    if complete {
      self.ends_at = Some(now);
      info!(lobby = %self.lobby_id, total_guessed, "catalog complete");
    }

    let accepted = Accepted {
      positions,
      normalized: token,
      total_guessed,
      remaining: self.catalog.len() - total_guessed,
      complete,
    };
    self.record(player, raw_guess, GuessOutcome::Accepted(accepted), now)
  }

  fn record(&mut self, player: &str, raw_guess: &str, outcome: GuessOutcome, now: i64) -> GuessResult {
    let (reason, positions) = match &outcome {
      GuessOutcome::Accepted(accepted) => (None, accepted.positions.clone()),
      GuessOutcome::Rejected(reason) => (Some(*reason), Vec::new()),
    };
    let event = GuessEvent {
      id: Uuid::new_v4().simple().to_string(),
      ts: now,
      player: player.to_string(),
      guess: raw_guess.to_string(),
      accepted: reason.is_none(),
      reason,
      positions,
    };
    debug!(lobby = %self.lobby_id, player, guess = raw_guess, accepted = event.accepted, ?reason, "guess");

    self.log.push_back(event.clone());
    while self.log.len() > MAX_LOG_ENTRIES {
      self.log.pop_front();
    }

    GuessResult { outcome, event }
  }

  // ========================================================================
  // Views
  // ========================================================================

  pub fn summary(&self, now: i64) -> SessionSummary {
    SessionSummary {
      lobby_id: self.lobby_id.clone(),
      duration: self.duration_secs,
      time_left: self.time_left(now),
      total: self.catalog.len(),
      guessed_count: self.guessed.len(),
      is_active: self.is_active(now),
      started: self.started,
      paused: self.paused,
    }
  }

  pub fn detailed_state(&self, now: i64) -> DetailedState {
    DetailedState {
      summary: self.summary(now),
      guessed: self.guessed_names(),
      log: self.log.iter().cloned().collect(),
    }
  }

  /// Guessed board as `position -> display name`.
  pub fn guessed_names(&self) -> BTreeMap<Position, String> {
    self
      .guessed
      .iter()
      .filter_map(|&pos| self.catalog.name(pos).map(|name| (pos, name.to_string())))
      .collect()
  }
}

fn build_aliases(catalog: &Catalog) -> HashMap<String, Vec<Position>> {
  let mut aliases: HashMap<String, Vec<Position>> = HashMap::with_capacity(catalog.len());
  for (pos, name) in catalog.iter() {
    aliases.entry(normalize(name)).or_default().push(pos);
  }
  aliases
}

fn secs_to_millis(secs: u64) -> i64 {
  i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000)
}

#[cfg(test)]
mod tests {
  use super::*;

  const T0: i64 = 1_700_000_000_000; // Fixed timestamp for testing

  fn session(names: &[&str], duration: u64) -> QuizSession {
    let catalog = Catalog::new(names.iter().copied()).unwrap();
    QuizSession::new("lobby1", duration, Arc::new(catalog))
  }

  fn assert_partition(s: &QuizSession) {
    assert_eq!(s.remaining_count() + s.guessed_count(), s.total());
  }

  #[test]
  fn test_two_entry_scenario() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 60);
    assert_eq!(s.start(T0), StartStatus::Started);

    let r = s.submit_guess("p1", "bulba saur", T0 + 1_000);
    let accepted = r.accepted().unwrap();
    assert_eq!(accepted.positions, vec![1]);
    assert_eq!(accepted.total_guessed, 1);
    assert!(!accepted.complete);
    assert_partition(&s);

    let r = s.submit_guess("p1", "bulbasaur", T0 + 2_000);
    assert_eq!(r.reason(), Some(RejectReason::Duplicate));

    let r = s.submit_guess("p2", "IVYSAUR", T0 + 3_000);
    let accepted = r.accepted().unwrap();
    assert_eq!(accepted.positions, vec![2]);
    assert_eq!(accepted.total_guessed, 2);
    assert_eq!(accepted.remaining, 0);
    assert!(accepted.complete);
    assert!(!s.is_active(T0 + 3_000));
    assert_partition(&s);

    let r = s.submit_guess("p2", "venusaur", T0 + 3_000);
    assert_eq!(r.reason(), Some(RejectReason::GameOver));
  }

  #[test]
  fn test_rejections_before_start_and_empty() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 60);
    let r = s.submit_guess("p1", "bulbasaur", T0);
    assert_eq!(r.reason(), Some(RejectReason::NotStarted));
    assert!(!r.event.accepted);

    s.start(T0);
    assert_eq!(s.submit_guess("p1", "  !!  ", T0).reason(), Some(RejectReason::Empty));
    assert_eq!(s.submit_guess("p1", "pikachu", T0).reason(), Some(RejectReason::NotFound));
    assert_eq!(s.guessed_count(), 0);
    assert_eq!(s.log().count(), 3);
  }

  #[test]
  fn test_duplicate_rejected_even_after_not_found() {
    let mut s = session(&["Mr. Mime", "Jynx"], 60);
    s.start(T0);

    // A miss doesn't consume anything
    assert_eq!(s.submit_guess("p1", "Mr. Mimee", T0).reason(), Some(RejectReason::NotFound));
    assert!(s.submit_guess("p1", "MR MIME", T0).is_accepted());
    assert_eq!(s.submit_guess("p2", "mr.mime", T0).reason(), Some(RejectReason::Duplicate));
    assert_eq!(s.submit_guess("p2", "Mr. Mime", T0).reason(), Some(RejectReason::Duplicate));
    assert_eq!(s.submit_guess("p2", "Mr. Mimee", T0).reason(), Some(RejectReason::NotFound));
    assert_eq!(s.guessed_count(), 1);
  }

  #[test]
  fn test_shared_token_claims_all_positions() {
    let mut s = session(&["Nidoran♀", "Nidorina", "Nidoran♂"], 60);
    s.start(T0);

    let r = s.submit_guess("p1", "nidoran", T0);
    let accepted = r.accepted().unwrap();
    assert_eq!(accepted.positions, vec![1, 3]);
    assert_eq!(accepted.normalized, "nidoran");
    assert_eq!(accepted.total_guessed, 2);
    assert_eq!(r.event.positions, vec![1, 3]);
    assert_partition(&s);

    let names = s.guessed_names();
    assert_eq!(names.get(&1).map(String::as_str), Some("Nidoran♀"));
    assert_eq!(names.get(&3).map(String::as_str), Some("Nidoran♂"));
  }

  #[test]
  fn test_start_transitions() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 900);
    assert_eq!(s.time_left(T0), 900);
    assert!(!s.is_active(T0));

    assert_eq!(s.start(T0), StartStatus::Started);
    assert_eq!(s.time_left(T0), 900);
    let ends_at = s.ends_at;

    assert_eq!(s.start(T0 + 5_000), StartStatus::AlreadyStarted);
    assert_eq!(s.ends_at, ends_at);
    assert_eq!(s.started_at(), Some(T0));
  }

  #[test]
  fn test_pause_and_resume_keep_time() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 900);
    assert_eq!(s.pause(T0), PauseStatus::NotStarted);

    s.start(T0);
    let before = s.time_left(T0 + 1_500);
    assert_eq!(before, 898);
    assert_eq!(s.pause(T0 + 1_500), PauseStatus::Paused);
    assert_eq!(s.pause(T0 + 2_000), PauseStatus::AlreadyPaused);

    // Frozen while paused
    assert_eq!(s.time_left(T0 + 60_000), before);
    assert!(!s.is_active(T0 + 60_000));
    assert_eq!(
      s.submit_guess("p1", "bulbasaur", T0 + 60_000).reason(),
      Some(RejectReason::GameOver)
    );

    assert_eq!(s.start(T0 + 60_000), StartStatus::Resumed);
    assert_eq!(s.time_left(T0 + 60_000), before);
    assert!(s.is_active(T0 + 60_000));
  }

  #[test]
  fn test_finished_session_restarts() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 60);
    s.start(T0);
    assert!(s.submit_guess("p1", "bulbasaur", T0 + 1_000).is_accepted());

    let after = T0 + 61_000;
    assert_eq!(s.time_left(after), 0);
    assert!(!s.is_active(after));
    assert_eq!(s.pause(after), PauseStatus::AlreadyFinished);
    assert_eq!(s.submit_guess("p1", "ivysaur", after).reason(), Some(RejectReason::GameOver));

    assert_eq!(s.start(after), StartStatus::Restarted);
    assert!(s.is_started());
    assert_eq!(s.guessed_count(), 0);
    assert_eq!(s.log().count(), 0);
    assert_eq!(s.time_left(after), 60);
    assert_partition(&s);

    // Token is guessable again after restart
    assert!(s.submit_guess("p1", "bulbasaur", after + 1_000).is_accepted());
  }

  #[test]
  fn test_completed_session_restarts() {
    let mut s = session(&["Mew"], 60);
    s.start(T0);
    assert!(s.submit_guess("p1", "mew", T0).accepted().unwrap().complete);
    assert_eq!(s.pause(T0), PauseStatus::AlreadyFinished);
    assert_eq!(s.start(T0 + 1_000), StartStatus::Restarted);
    assert_eq!(s.remaining_count(), 1);
  }

  #[test]
  fn test_reset_keeps_identity() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 120);
    s.start(T0);
    s.submit_guess("p1", "ivysaur", T0);
    s.pause(T0 + 10_000);

    s.reset();
    assert_eq!(s.lobby_id(), "lobby1");
    assert_eq!(s.duration(), 120);
    assert!(!s.is_started());
    assert!(!s.is_paused());
    assert_eq!(s.guessed_count(), 0);
    assert_eq!(s.log().count(), 0);
    assert_eq!(s.time_left(T0 + 20_000), 120);
    assert_partition(&s);
  }

  #[test]
  fn test_log_is_bounded() {
    let mut s = session(&["Bulbasaur"], 60);
    for i in 0..(MAX_LOG_ENTRIES + 10) {
      s.submit_guess("p1", &format!("guess{i}"), T0);
    }
    assert_eq!(s.log().count(), MAX_LOG_ENTRIES);
    assert_eq!(s.log().next().map(|e| e.guess.as_str()), Some("guess10"));

    let ids: HashSet<&str> = s.log().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), MAX_LOG_ENTRIES);
  }

  #[test]
  fn test_event_matches_log_entry() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 60);
    s.start(T0);
    let r = s.submit_guess("ash", "Bulbasaur!", T0 + 42);

    assert_eq!(r.event.player, "ash");
    assert_eq!(r.event.guess, "Bulbasaur!");
    assert_eq!(r.event.ts, T0 + 42);
    assert_eq!(r.event.id.len(), 32);
    assert_eq!(s.log().last(), Some(&r.event));
  }

  #[test]
  fn test_views_serialize() {
    let mut s = session(&["Bulbasaur", "Ivysaur"], 60);
    s.start(T0);
    let accepted = serde_json::to_value(s.submit_guess("p1", "ivysaur", T0)).unwrap();
    assert_eq!(accepted["accepted"], true);
    assert_eq!(accepted["positions"], serde_json::json!([2]));
    assert_eq!(accepted["totalGuessed"], 1);
    assert!(accepted.get("reason").is_none());

    let rejected = serde_json::to_value(s.submit_guess("p1", "ivysaur", T0)).unwrap();
    assert_eq!(rejected["accepted"], false);
    assert_eq!(rejected["reason"], "duplicate");
    assert_eq!(rejected["event"]["reason"], "duplicate");

    let state = serde_json::to_value(s.detailed_state(T0 + 10_000)).unwrap();
    assert_eq!(state["lobbyId"], "lobby1");
    assert_eq!(state["timeLeft"], 50);
    assert_eq!(state["guessedCount"], 1);
    assert_eq!(state["isActive"], true);
    assert_eq!(state["guessed"]["2"], "Ivysaur");
    assert_eq!(state["log"].as_array().map(Vec::len), Some(2));

    assert_eq!(serde_json::to_value(StartStatus::AlreadyStarted).unwrap(), "already_started");
    assert_eq!(serde_json::to_value(PauseStatus::AlreadyFinished).unwrap(), "already_finished");
  }
}
