//! Content-fetch capability and its local implementations.
//!
//! Sessions only ever see `dyn FlashcardProvider`. Two backends exist: the
//! static pipeline here (selector + assembler behind an artificial delay) and
//! the generative one in `openai.rs`. `TimeoutProvider` bounds either.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::assembler::assemble;
use crate::domain::{FlashcardData, Topic};
use crate::selector::Selector;

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("transport failure: {0}")]
  Transport(String),

  #[error("provider returned HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("malformed provider response: {0}")]
  Malformed(String),

  #[error("provider rejected the request: {0}")]
  Rejected(String),

  #[error("no flashcard within {0:?}")]
  Timeout(Duration),
}

#[async_trait]
pub trait FlashcardProvider: Send + Sync {
  /// Short name for logs and the health endpoint.
  fn name(&self) -> &'static str;

  async fn fetch_flashcard(&self, topic: Topic) -> Result<FlashcardData, ProviderError>;
}

/// Curated-bank pipeline with an artificial delay.
pub struct StaticProvider {
  selector: Selector,
  delay: Duration,
  rng: Mutex<StdRng>,
}

impl StaticProvider {
  pub fn new(selector: Selector, delay: Duration) -> Self {
    Self { selector, delay, rng: Mutex::new(StdRng::from_entropy()) }
  }

  pub fn with_seed(selector: Selector, delay: Duration, seed: u64) -> Self {
    Self { selector, delay, rng: Mutex::new(StdRng::seed_from_u64(seed)) }
  }

  /// Synchronous half of the fetch: select and assemble.
  pub fn draw(&self, topic: Topic) -> FlashcardData {
    let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let sel = self.selector.select(topic, &mut *rng);
    info!(target: "flashcard", ?topic, origin = ?sel.origin, tags = %sel.item.tags.join(","), "Static card assembled");
    assemble(sel.item, &sel.code.initial, &sel.code.solution)
  }
}

#[async_trait]
impl FlashcardProvider for StaticProvider {
  fn name(&self) -> &'static str { "static" }

  #[instrument(level = "info", skip(self))]
  async fn fetch_flashcard(&self, topic: Topic) -> Result<FlashcardData, ProviderError> {
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    Ok(self.draw(topic))
  }
}

/// Fails a fetch that takes longer than `limit`.
pub struct TimeoutProvider<P> {
  inner: P,
  limit: Duration,
}

impl<P: FlashcardProvider> TimeoutProvider<P> {
  pub fn new(inner: P, limit: Duration) -> Self {
    Self { inner, limit }
  }
}

#[async_trait]
impl<P: FlashcardProvider> FlashcardProvider for TimeoutProvider<P> {
  fn name(&self) -> &'static str { self.inner.name() }

  async fn fetch_flashcard(&self, topic: Topic) -> Result<FlashcardData, ProviderError> {
    match tokio::time::timeout(self.limit, self.inner.fetch_flashcard(topic)).await {
      Ok(result) => result,
      Err(_) => {
        warn!(target: "flashcard", ?topic, provider = self.inner.name(), limit = ?self.limit, "Fetch timed out");
        Err(ProviderError::Timeout(self.limit))
      }
    }
  }
}
