//! Domain models: topics, language modes, bank items and the assembled flashcard.

use serde::{Deserialize, Serialize};

/// Coarse subject-matter category used to scope content selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
  CleanCode,
  DesignPatterns,
  Refactoring,
  Architecture,
  Solid,
  ReactPatterns,
  Angular,
  Typescript,
}

impl Topic {
  pub const ALL: [Topic; 8] = [
    Topic::CleanCode,
    Topic::DesignPatterns,
    Topic::Refactoring,
    Topic::Architecture,
    Topic::Solid,
    Topic::ReactPatterns,
    Topic::Angular,
    Topic::Typescript,
  ];

  /// Human-readable label shown in topic pickers and used in open prompts.
  pub fn label(self) -> &'static str {
    match self {
      Topic::CleanCode => "Clean Code Principles",
      Topic::DesignPatterns => "Design Patterns (GoF)",
      Topic::Refactoring => "Refactoring Techniques",
      Topic::Architecture => "Software Architecture",
      Topic::Solid => "SOLID Principles",
      Topic::ReactPatterns => "Advanced React Patterns",
      Topic::Angular => "Angular Core & Signals",
      Topic::Typescript => "TypeScript Advanced",
    }
  }
}

impl Default for Topic {
  fn default() -> Self { Topic::CleanCode }
}

/// Which language halves of a card the renderer shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageMode {
  English,
  Myanmar,
  Bilingual,
}

impl LanguageMode {
  pub fn shows_english(self) -> bool {
    matches!(self, LanguageMode::English | LanguageMode::Bilingual)
  }

  pub fn shows_myanmar(self) -> bool {
    matches!(self, LanguageMode::Myanmar | LanguageMode::Bilingual)
  }
}

impl Default for LanguageMode {
  fn default() -> Self { LanguageMode::Bilingual }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
  Junior,
  Mid,
  Senior,
}

/// English text paired with its Myanmar rendition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPair {
  pub en: String,
  pub mm: String,
}

/// "Before" and "after" code for a concept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
  pub initial: String,
  pub solution: String,
}

/// One curated entry of the question bank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
  pub question: String,
  /// Myanmar translation of `question`, when the bank has one.
  #[serde(default)] pub question_mm: Option<String>,
  pub answer: ContentPair,
  pub tags: Vec<String>,
  #[serde(default)] pub code: Option<CodeSnippet>,
}

/// Display-ready record for one card. Field names match the JSON shape the
/// generative provider is asked to return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardData {
  pub title: String,
  pub difficulty: Difficulty,
  pub scenario_eng: String,
  pub scenario_mm: String,
  /// False when `scenario_mm` had to reuse the English scenario text.
  #[serde(default = "default_true")]
  pub scenario_mm_translated: bool,
  pub question_eng: String,
  pub question_mm: String,
  #[serde(default)] pub code_snippet_initial: String,
  #[serde(default)] pub code_snippet_solution: String,
  pub solution_eng: String,
  pub solution_mm: String,
  pub key_takeaway_eng: String,
  pub key_takeaway_mm: String,
}

fn default_true() -> bool { true }
