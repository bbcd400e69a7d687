//! Content repository: the immutable curated question bank.
//!
//! The bank ships as `data/questions.toml` and is compiled into the binary.
//! Extra items may come from the TOML config file; those are validated one by
//! one and skipped (with an error log) when they break the bank invariants.

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::domain::QuestionItem;

const BUNDLED_BANK: &str = include_str!("../data/questions.toml");

#[derive(Debug, Error)]
pub enum ContentError {
  #[error("question bank could not be parsed: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("question #{index} is invalid: {reason}")]
  InvalidItem { index: usize, reason: &'static str },

  #[error("question bank is empty")]
  Empty,
}

#[derive(Deserialize)]
struct BankFile {
  #[serde(default)]
  questions: Vec<QuestionItem>,
}

/// Read-only, non-empty collection of question items.
#[derive(Clone, Debug)]
pub struct ContentRepository {
  items: Vec<QuestionItem>,
}

impl ContentRepository {
  /// Build a repository, rejecting items that break the bank invariants.
  pub fn new(items: Vec<QuestionItem>) -> Result<Self, ContentError> {
    for (index, item) in items.iter().enumerate() {
      validate_item(item).map_err(|reason| ContentError::InvalidItem { index, reason })?;
    }
    if items.is_empty() {
      return Err(ContentError::Empty);
    }
    Ok(Self { items })
  }

  /// The bundled bank.
  pub fn builtin() -> Result<Self, ContentError> {
    Self::new(parse_bank(BUNDLED_BANK)?)
  }

  /// Bundled bank plus configured extras. Invalid extras are skipped.
  #[instrument(level = "info", skip_all, fields(extra = extra.len()))]
  pub fn builtin_with(extra: &[QuestionItem]) -> Result<Self, ContentError> {
    let mut items = parse_bank(BUNDLED_BANK)?;
    let bundled = items.len();
    for (index, item) in extra.iter().enumerate() {
      match validate_item(item) {
        Ok(()) => items.push(item.clone()),
        Err(reason) => {
          error!(target: "flashcard", index, reason, "Skipping configured question");
        }
      }
    }
    info!(target: "flashcard", bundled, configured = items.len() - bundled, "Question bank loaded");
    Self::new(items)
  }

  pub fn all(&self) -> &[QuestionItem] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }
}

fn parse_bank(src: &str) -> Result<Vec<QuestionItem>, ContentError> {
  let file: BankFile = toml::from_str(src)?;
  Ok(file.questions)
}

fn validate_item(item: &QuestionItem) -> Result<(), &'static str> {
  if item.question.trim().is_empty() {
    return Err("question text is empty");
  }
  if item.tags.is_empty() {
    return Err("no tags");
  }
  if item.tags.iter().any(|t| t.trim().is_empty() || t.chars().any(char::is_uppercase)) {
    return Err("tags must be non-empty lowercase strings");
  }
  if item.answer.en.trim().is_empty() || item.answer.mm.trim().is_empty() {
    return Err("answer needs both en and mm text");
  }
  Ok(())
}
