//! Loading deck configuration (defaults, provider choice, prompts and extra
//! bank items) from TOML.
//!
//! See `DeckConfig` and `Prompts` for expected schema. Every field is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{LanguageMode, QuestionItem, Topic};

/// Which content-fetch provider backs the sessions.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderChoice {
  /// Generative when OPENAI_API_KEY is set, static otherwise.
  #[default]
  Auto,
  Static,
  Generative,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
  pub default_topic: Topic,
  pub default_language: LanguageMode,
  pub provider: ProviderChoice,
  /// Artificial latency of the static provider.
  pub static_delay_ms: u64,
  /// Upper bound on one fetch; 0 disables the bound.
  pub fetch_timeout_secs: u64,
  /// How many previous cards a session keeps.
  pub history_limit: usize,
  pub prompts: Prompts,
  pub questions: Vec<QuestionItem>,
}

impl Default for DeckConfig {
  fn default() -> Self {
    Self {
      default_topic: Topic::default(),
      default_language: LanguageMode::default(),
      provider: ProviderChoice::default(),
      static_delay_ms: 600,
      fetch_timeout_secs: 30,
      history_limit: 20,
      prompts: Prompts::default(),
      questions: Vec::new(),
    }
  }
}

/// Prompts used by the generative provider.
/// Override them in TOML to tune tone or structure.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system_instruction: String,
  /// Placeholders: {question}, {answer}.
  pub grounded_user_template: String,
  /// Placeholders: {topic}.
  pub open_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system_instruction: "You are a Senior Principal Engineer acting as a mentor. \
Your goal is to generate high-quality, advanced programming flashcards for senior developers.\n\n\
IMPORTANT: Translations for Myanmar (Burmese) must be in a casual technical spoken style.\n\
- Use \"တယ်\", \"မယ်\", \"နော်\" sentence endings instead of literary \"သည်\", \"မည်\".\n\
- Do NOT translate technical terms (keep \"Class\", \"Object\", \"Signal\", \"Observable\", \"Prop Drilling\" in English).\n\
- Explanations should feel like a senior dev chatting with a colleague.\n\n\
Focus on \"Why\" and \"How\". Include code snippets where relevant to show \"Before\" (bad code) and \"After\" (refactored code).\n\
Respond ONLY with a JSON object matching the requested schema.".into(),
      grounded_user_template: "I have a specific Question and Answer pair to turn into a flashcard.\n\
Question: \"{question}\"\n\
Answer: \"{answer}\"\n\n\
Please expand this into a full flashcard structure.\n\
1. Use the Question provided as the 'question_eng'.\n\
2. Translate it to casual Burmese for 'question_mm'.\n\
3. Create a realistic coding scenario for this concept.\n\
4. Provide detailed solutions and code examples (Bad vs Good code) based on this concept.".into(),
      open_user_template: "Generate a challenging flashcard about {topic} for a Senior Developer.\n\
It should present a scenario or a snippet of code that needs improvement.".into(),
    }
  }
}

pub fn parse_deck_config(src: &str) -> Result<DeckConfig, toml::de::Error> {
  toml::from_str::<DeckConfig>(src)
}

/// Load `DeckConfig` from DECK_CONFIG_PATH. On any parsing/IO error, falls back to defaults.
pub fn load_deck_config_from_env() -> DeckConfig {
  let Ok(path) = std::env::var("DECK_CONFIG_PATH") else {
    return DeckConfig::default();
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_deck_config(&s) {
      Ok(cfg) => {
        info!(target: "refactor_deck", %path, extra_questions = cfg.questions.len(), "Loaded deck config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "refactor_deck", %path, error = %e, "Failed to parse TOML config; using defaults");
        DeckConfig::default()
      }
    },
    Err(e) => {
      error!(target: "refactor_deck", %path, error = %e, "Failed to read TOML config file; using defaults");
      DeckConfig::default()
    }
  }
}
