//! Application state: the shared content-fetch provider and session defaults.
//!
//! This module owns:
//!   - the question bank and topic table (behind the selector)
//!   - the provider every session fetches through (static or generative,
//!     bounded by the fetch timeout)
//!   - the defaults a new session starts from

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::config::{DeckConfig, ProviderChoice};
use crate::content::{ContentError, ContentRepository};
use crate::domain::{LanguageMode, Topic};
use crate::openai::{GenerativeProvider, OpenAI};
use crate::provider::{FlashcardProvider, StaticProvider, TimeoutProvider};
use crate::selector::Selector;
use crate::topics::TopicTable;
use crate::view::ViewState;

#[derive(Clone)]
pub struct AppState {
  pub provider: Arc<dyn FlashcardProvider>,
  pub default_topic: Topic,
  pub default_language: LanguageMode,
  pub history_limit: usize,
}

impl AppState {
  /// Build state from config: load the bank, build the selector, pick a provider.
  #[instrument(level = "info", skip_all)]
  pub fn new(cfg: DeckConfig, openai: Option<OpenAI>) -> Result<Self, ContentError> {
    let repo = Arc::new(ContentRepository::builtin_with(&cfg.questions)?);
    let selector = Selector::new(repo, Arc::new(TopicTable::builtin()));

    let openai = match (cfg.provider, openai) {
      (ProviderChoice::Static, _) => None,
      (ProviderChoice::Generative, None) => {
        warn!(target: "refactor_deck", "Generative provider requested but OPENAI_API_KEY is not set; using static bank");
        None
      }
      (_, oa) => oa,
    };

    let provider: Arc<dyn FlashcardProvider> = match openai {
      Some(oa) => {
        let generative = GenerativeProvider::new(oa, selector, cfg.prompts.clone());
        info!(target: "refactor_deck", base_url = %generative.base_url(), model = %generative.model(), "Generative provider enabled.");
        bounded(generative, cfg.fetch_timeout_secs)
      }
      None => {
        info!(target: "refactor_deck", delay_ms = cfg.static_delay_ms, "Serving flashcards from the curated bank.");
        let static_provider = StaticProvider::new(selector, Duration::from_millis(cfg.static_delay_ms));
        bounded(static_provider, cfg.fetch_timeout_secs)
      }
    };

    Ok(Self {
      provider,
      default_topic: cfg.default_topic,
      default_language: cfg.default_language,
      history_limit: cfg.history_limit,
    })
  }

  /// Fresh view for a new session.
  pub fn new_view(&self) -> ViewState {
    ViewState::new(self.default_topic, self.default_language, self.history_limit)
  }
}

fn bounded<P: FlashcardProvider + 'static>(provider: P, timeout_secs: u64) -> Arc<dyn FlashcardProvider> {
  if timeout_secs == 0 {
    Arc::new(provider)
  } else {
    Arc::new(TimeoutProvider::new(provider, Duration::from_secs(timeout_secs)))
  }
}
