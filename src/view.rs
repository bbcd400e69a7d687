//! Flashcard view state machine.
//!
//! Phases: `Idle -> Loading -> {Ready, Failed}`; `Ready` and `Failed` go back
//! to `Loading` on the next request. Each request bumps a generation counter
//! and hands out a ticket; a completion whose ticket is not the latest one is
//! stale and is dropped, so a superseded fetch can never overwrite a newer card.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{FlashcardData, LanguageMode, Topic};
use crate::provider::ProviderError;

/// What the user sees when a fetch fails; details only go to the log.
pub const FETCH_FAILED_MESSAGE: &str = "Unable to load the next flashcard. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPhase {
  Idle,
  Loading,
  Ready,
  Failed,
}

/// Identifies one card request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
  pub generation: u64,
  pub topic: Topic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
  Ready,
  Failed,
  Stale,
}

#[derive(Clone, Debug)]
pub struct ViewState {
  topic: Topic,
  language_mode: LanguageMode,
  phase: CardPhase,
  current_card: Option<FlashcardData>,
  error: Option<String>,
  is_flipped: bool,
  generation: u64,
  history: VecDeque<FlashcardData>,
  history_limit: usize,
}

impl ViewState {
  pub fn new(topic: Topic, language_mode: LanguageMode, history_limit: usize) -> Self {
    Self {
      topic,
      language_mode,
      phase: CardPhase::Idle,
      current_card: None,
      error: None,
      is_flipped: false,
      generation: 0,
      history: VecDeque::new(),
      history_limit,
    }
  }

  pub fn topic(&self) -> Topic { self.topic }
  pub fn language_mode(&self) -> LanguageMode { self.language_mode }
  pub fn phase(&self) -> CardPhase { self.phase }
  pub fn current_card(&self) -> Option<&FlashcardData> { self.current_card.as_ref() }
  pub fn error(&self) -> Option<&str> { self.error.as_deref() }
  pub fn is_flipped(&self) -> bool { self.is_flipped }
  pub fn loading(&self) -> bool { self.phase == CardPhase::Loading }

  /// Previously shown cards, most recent first.
  pub fn history(&self) -> impl Iterator<Item = &FlashcardData> {
    self.history.iter()
  }

  /// Enter `Loading` for the current topic. Valid from any phase; supersedes
  /// whatever request was in flight.
  pub fn request_card(&mut self) -> Ticket {
    if self.phase == CardPhase::Loading {
      debug!(target: "flashcard", superseded = self.generation, "New request supersedes in-flight fetch");
    }
    self.generation += 1;
    self.phase = CardPhase::Loading;
    self.error = None;
    self.is_flipped = false;
    Ticket { generation: self.generation, topic: self.topic }
  }

  pub fn is_current(&self, ticket: Ticket) -> bool {
    self.phase == CardPhase::Loading && ticket.generation == self.generation
  }

  /// Apply the outcome of the fetch identified by `ticket`.
  pub fn apply(&mut self, ticket: Ticket, result: Result<FlashcardData, ProviderError>) -> Applied {
    if !self.is_current(ticket) {
      debug!(target: "flashcard", stale = ticket.generation, current = self.generation, "Dropping stale fetch result");
      return Applied::Stale;
    }
    self.is_flipped = false;
    match result {
      Ok(card) => {
        if let Some(previous) = self.current_card.replace(card) {
          self.remember(previous);
        }
        self.error = None;
        self.phase = CardPhase::Ready;
        Applied::Ready
      }
      Err(e) => {
        warn!(target: "flashcard", topic = ?ticket.topic, error = %e, "Flashcard fetch failed");
        if let Some(previous) = self.current_card.take() {
          self.remember(previous);
        }
        self.error = Some(FETCH_FAILED_MESSAGE.to_string());
        self.phase = CardPhase::Failed;
        Applied::Failed
      }
    }
  }

  /// Flip the card. Only meaningful once a card is ready.
  pub fn toggle_flip(&mut self) -> bool {
    if self.phase == CardPhase::Ready {
      self.is_flipped = !self.is_flipped;
    }
    self.is_flipped
  }

  pub fn set_language_mode(&mut self, mode: LanguageMode) {
    self.language_mode = mode;
  }

  /// Stage a topic for the next request; does not fetch.
  pub fn set_topic(&mut self, topic: Topic) {
    self.topic = topic;
  }

  pub fn snapshot(&self) -> ViewSnapshot {
    ViewSnapshot {
      topic: self.topic,
      language_mode: self.language_mode,
      phase: self.phase,
      loading: self.loading(),
      is_flipped: self.is_flipped,
      error: self.error.clone(),
      show_english: self.language_mode.shows_english(),
      show_myanmar: self.language_mode.shows_myanmar(),
      current_card: self.current_card.clone(),
      history_len: self.history.len(),
    }
  }

  fn remember(&mut self, card: FlashcardData) {
    if self.history_limit == 0 {
      return;
    }
    self.history.push_front(card);
    self.history.truncate(self.history_limit);
  }
}

/// Everything a renderer needs to draw the session.
#[derive(Clone, Debug, Serialize)]
pub struct ViewSnapshot {
  pub topic: Topic,
  pub language_mode: LanguageMode,
  pub phase: CardPhase,
  pub loading: bool,
  pub is_flipped: bool,
  pub error: Option<String>,
  pub show_english: bool,
  pub show_myanmar: bool,
  pub current_card: Option<FlashcardData>,
  pub history_len: usize,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::tests::item;
  use crate::assembler::assemble;
  use crate::provider::FlashcardProvider;
  use async_trait::async_trait;

  fn card(name: &str) -> FlashcardData {
    assemble(&item(name, &["solid"], None), "a", "b")
  }

  fn view() -> ViewState {
    ViewState::new(Topic::CleanCode, LanguageMode::Bilingual, 5)
  }

  struct Fixed(Result<FlashcardData, &'static str>);

  #[async_trait]
  impl FlashcardProvider for Fixed {
    fn name(&self) -> &'static str { "fixed" }
    async fn fetch_flashcard(&self, _topic: Topic) -> Result<FlashcardData, ProviderError> {
      self.0.clone().map_err(|m| ProviderError::Rejected(m.into()))
    }
  }

  #[test]
  fn starts_idle() {
    let v = view();
    assert_eq!(v.phase(), CardPhase::Idle);
    assert!(v.current_card().is_none());
    assert!(!v.loading());
  }

  #[tokio::test]
  async fn successful_fetch_goes_ready_unflipped() {
    let mut v = view();
    let expected = card("srp");
    let ticket = v.request_card();
    assert_eq!(v.phase(), CardPhase::Loading);
    assert!(v.loading());

    let outcome = v.apply(ticket, Fixed(Ok(expected.clone())).fetch_flashcard(ticket.topic).await);
    assert_eq!(outcome, Applied::Ready);
    assert_eq!(v.phase(), CardPhase::Ready);
    assert!(!v.is_flipped());
    assert_eq!(v.current_card(), Some(&expected));
    assert!(v.error().is_none());
  }

  #[tokio::test]
  async fn failed_fetch_clears_card_and_sets_message() {
    let mut v = view();
    let t = v.request_card();
    assert_eq!(v.apply(t, Fixed(Ok(card("first"))).fetch_flashcard(t.topic).await), Applied::Ready);

    let t = v.request_card();
    let outcome = v.apply(t, Fixed(Err("quota exceeded")).fetch_flashcard(t.topic).await);
    assert_eq!(outcome, Applied::Failed);
    assert_eq!(v.phase(), CardPhase::Failed);
    assert!(v.current_card().is_none());
    assert_eq!(v.error(), Some(FETCH_FAILED_MESSAGE));
    assert_eq!(v.history().count(), 1);
  }

  #[test]
  fn retry_from_failed_clears_error() {
    let mut v = view();
    let t = v.request_card();
    v.apply(t, Err(ProviderError::Transport("down".into())));
    assert!(v.error().is_some());

    v.request_card();
    assert_eq!(v.phase(), CardPhase::Loading);
    assert!(v.error().is_none());
  }

  #[test]
  fn superseded_result_is_dropped() {
    let mut v = view();
    let first = v.request_card();
    v.set_topic(Topic::Solid);
    let second = v.request_card();
    assert_eq!(second.topic, Topic::Solid);

    assert_eq!(v.apply(first, Ok(card("old"))), Applied::Stale);
    assert_eq!(v.phase(), CardPhase::Loading);
    assert!(v.current_card().is_none());

    assert_eq!(v.apply(second, Ok(card("new"))), Applied::Ready);
    assert_eq!(v.current_card().map(|c| c.scenario_eng.as_str()), Some("new"));

    // A late duplicate of an applied ticket is stale too.
    assert_eq!(v.apply(second, Ok(card("dup"))), Applied::Stale);
  }

  #[test]
  fn toggle_flip_only_in_ready_and_twice_restores() {
    let mut v = view();
    assert!(!v.toggle_flip());
    let t = v.request_card();
    assert!(!v.toggle_flip());

    v.apply(t, Ok(card("x")));
    assert!(v.toggle_flip());
    assert!(!v.toggle_flip());
  }

  #[test]
  fn request_resets_flip() {
    let mut v = view();
    let t = v.request_card();
    v.apply(t, Ok(card("x")));
    v.toggle_flip();
    v.request_card();
    assert!(!v.is_flipped());
  }

  #[test]
  fn language_mode_and_topic_are_local_assignments() {
    let mut v = view();
    let t = v.request_card();
    v.apply(t, Ok(card("x")));
    let before = v.current_card().cloned();

    v.set_language_mode(LanguageMode::Myanmar);
    v.set_language_mode(LanguageMode::Myanmar);
    assert_eq!(v.language_mode(), LanguageMode::Myanmar);

    v.set_topic(Topic::Angular);
    assert_eq!(v.topic(), Topic::Angular);
    assert_eq!(v.phase(), CardPhase::Ready);
    assert_eq!(v.current_card().cloned(), before);
  }

  #[test]
  fn history_is_bounded_and_most_recent_first() {
    let mut v = ViewState::new(Topic::Solid, LanguageMode::English, 2);
    for name in ["a", "b", "c", "d"] {
      let t = v.request_card();
      v.apply(t, Ok(card(name)));
    }
    let seen: Vec<&str> = v.history().map(|c| c.scenario_eng.as_str()).collect();
    assert_eq!(seen, vec!["c", "b"]);
  }

  #[test]
  fn snapshot_reflects_language_visibility() {
    let mut v = view();
    v.set_language_mode(LanguageMode::English);
    let snap = v.snapshot();
    assert!(snap.show_english);
    assert!(!snap.show_myanmar);
    assert_eq!(snap.phase, CardPhase::Idle);
  }
}
