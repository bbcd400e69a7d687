//! One flashcard session: a `ViewState` plus the machinery to run fetches in
//! the background and feed their results back in order of arrival.
//!
//! The session is owned by a single task. Fetches run as spawned tasks and
//! report `(ticket, result)` over a channel; `next_completion` applies them,
//! and the view drops any that a newer request has superseded.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, instrument};

use crate::domain::{FlashcardData, LanguageMode, Topic};
use crate::provider::{FlashcardProvider, ProviderError};
use crate::view::{Applied, Ticket, ViewSnapshot, ViewState};

/// Commands a renderer can send into a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
  RequestCard,
  ToggleFlip,
  SetLanguageMode(LanguageMode),
  SetTopic(Topic),
}

type Completion = (Ticket, Result<FlashcardData, ProviderError>);

pub struct Session {
  view: ViewState,
  provider: Arc<dyn FlashcardProvider>,
  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
}

impl Session {
  /// Create a session and issue the initial request for the default topic.
  pub fn start(provider: Arc<dyn FlashcardProvider>, view: ViewState) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = Self { view, provider, tx, rx };
    session.request_card();
    session
  }

  pub fn view(&self) -> &ViewState {
    &self.view
  }

  pub fn snapshot(&self) -> ViewSnapshot {
    self.view.snapshot()
  }

  /// Enter `Loading` and fetch in the background.
  #[instrument(level = "info", skip(self), fields(topic = ?self.view.topic(), provider = self.provider.name()))]
  pub fn request_card(&mut self) -> Ticket {
    let ticket = self.view.request_card();
    let provider = Arc::clone(&self.provider);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = provider.fetch_flashcard(ticket.topic).await;
      // The receiver is gone once the session is dropped; nothing to do then.
      let _ = tx.send((ticket, result));
    });
    ticket
  }

  pub fn dispatch(&mut self, command: Command) {
    match command {
      Command::RequestCard => {
        self.request_card();
      }
      Command::ToggleFlip => {
        self.view.toggle_flip();
      }
      Command::SetLanguageMode(mode) => self.view.set_language_mode(mode),
      Command::SetTopic(topic) => self.view.set_topic(topic),
    }
  }

  /// Wait for the next fetch to finish and apply it. Cancel-safe.
  pub async fn next_completion(&mut self) -> Applied {
    // `self.tx` keeps the channel open, so `recv` never yields None.
    match self.rx.recv().await {
      Some((ticket, result)) => {
        let applied = self.view.apply(ticket, result);
        info!(target: "flashcard", generation = ticket.generation, ?applied, "Fetch completed");
        applied
      }
      None => std::future::pending().await,
    }
  }

  /// Apply completions until the latest request has landed.
  pub async fn settle(&mut self) -> Applied {
    loop {
      let applied = self.next_completion().await;
      if applied != Applied::Stale {
        return applied;
      }
    }
  }
}
