//! Minimal OpenAI-compatible client and the generative flashcard provider.
//!
//! We only call chat.completions and request a JSON object constrained by a
//! JSON schema that mirrors `FlashcardData`. Calls are instrumented and log
//! model names, latencies and token usage (not contents).
//!
//! NOTE: We never log the API key.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Difficulty, FlashcardData, QuestionItem, Topic};
use crate::provider::{FlashcardProvider, ProviderError};
use crate::selector::{topic_code, Selector};
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    Self::new(api_key, base_url, model)
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;
    Some(Self { client, api_key, base_url, model })
  }

  /// Schema-constrained chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user, schema), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    schema: Value,
    temperature: f32,
  ) -> Result<T, ProviderError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: json!({
        "type": "json_schema",
        "json_schema": { "name": "flashcard", "schema": schema },
      }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "refactor-deck/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await
      .map_err(|e| ProviderError::Transport(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(ProviderError::Status { status: status.as_u16(), message });
    }

    let body: ChatCompletionResponse = res
      .json()
      .await
      .map_err(|e| ProviderError::Malformed(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let choice = body
      .choices
      .into_iter()
      .next()
      .ok_or_else(|| ProviderError::Malformed("no choices in response".into()))?;
    if let Some(refusal) = choice.message.refusal {
      return Err(ProviderError::Rejected(refusal));
    }
    let text = choice.message.content.unwrap_or_default();
    serde_json::from_str::<T>(&text).map_err(|e| ProviderError::Malformed(format!("JSON parse error: {e}")))
  }
}

/// Flashcard generator backed by a chat completion model, grounded on the
/// curated bank when the topic has matching items.
pub struct GenerativeProvider {
  client: OpenAI,
  selector: Selector,
  prompts: Prompts,
  rng: Mutex<StdRng>,
}

impl GenerativeProvider {
  pub fn new(client: OpenAI, selector: Selector, prompts: Prompts) -> Self {
    Self { client, selector, prompts, rng: Mutex::new(StdRng::from_entropy()) }
  }

  pub fn model(&self) -> &str {
    &self.client.model
  }

  pub fn base_url(&self) -> &str {
    &self.client.base_url
  }

  fn grounding(&self, topic: Topic) -> Option<QuestionItem> {
    let candidates = self.selector.topic_candidates(topic);
    let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    candidates.choose(&mut *rng).map(|q| (*q).clone())
  }
}

#[async_trait]
impl FlashcardProvider for GenerativeProvider {
  fn name(&self) -> &'static str { "generative" }

  #[instrument(level = "info", skip(self), fields(model = %self.client.model))]
  async fn fetch_flashcard(&self, topic: Topic) -> Result<FlashcardData, ProviderError> {
    let grounding = self.grounding(topic);
    let user = build_user_prompt(&self.prompts, topic, grounding.as_ref());

    let start = std::time::Instant::now();
    let result = self
      .client
      .chat_json::<GeneratedCard>(&self.prompts.system_instruction, &user, flashcard_schema(), 0.8)
      .await;
    let elapsed = start.elapsed();

    let generated = match result {
      Ok(g) => g,
      Err(e) => {
        error!(target: "flashcard", ?elapsed, ?topic, error = %e, "Model call failed during flashcard generation");
        return Err(e);
      }
    };

    let card = finish_card(generated, topic, &self.selector)?;
    info!(
      target: "flashcard",
      ?elapsed,
      ?topic,
      grounded = grounding.is_some(),
      title = %card.title,
      "Flashcard generated"
    );
    Ok(card)
  }
}

/// Grounded prompt when a bank item is available, open topic prompt otherwise.
pub fn build_user_prompt(prompts: &Prompts, topic: Topic, grounding: Option<&QuestionItem>) -> String {
  match grounding {
    Some(q) => fill_template(
      &prompts.grounded_user_template,
      &[("question", q.question.as_str()), ("answer", q.answer.en.as_str())],
    ),
    None => fill_template(&prompts.open_user_template, &[("topic", topic.label())]),
  }
}

/// JSON schema the model must follow; same shape as `FlashcardData`.
pub fn flashcard_schema() -> Value {
  let text = |description: &str| json!({ "type": "string", "description": description });
  json!({
    "type": "object",
    "properties": {
      "title": text("A short, punchy title for the concept"),
      "difficulty": { "type": "string", "enum": ["Junior", "Mid", "Senior"] },
      "scenario_eng": text("The context or problem statement in English"),
      "scenario_mm": text("The context or problem statement in casual spoken Myanmar"),
      "question_eng": text("The specific question"),
      "question_mm": text("The specific question in casual spoken Myanmar"),
      "code_snippet_initial": text("Optional: the code that needs refactoring (typescript/javascript)"),
      "solution_eng": text("Detailed explanation of the solution in English"),
      "solution_mm": text("Detailed explanation of the solution in casual spoken Myanmar"),
      "code_snippet_solution": text("Optional: the refactored/better code"),
      "key_takeaway_eng": text("One sentence summary in English"),
      "key_takeaway_mm": text("One sentence summary in casual spoken Myanmar"),
    },
    "required": [
      "title", "scenario_eng", "scenario_mm", "question_eng", "question_mm",
      "solution_eng", "solution_mm", "key_takeaway_eng", "key_takeaway_mm",
    ],
  })
}

#[derive(Debug, Deserialize)]
pub struct GeneratedCard {
  pub title: String,
  #[serde(default)] pub difficulty: Option<Difficulty>,
  pub scenario_eng: String,
  pub scenario_mm: String,
  pub question_eng: String,
  pub question_mm: String,
  #[serde(default)] pub code_snippet_initial: Option<String>,
  #[serde(default)] pub code_snippet_solution: Option<String>,
  pub solution_eng: String,
  pub solution_mm: String,
  pub key_takeaway_eng: String,
  pub key_takeaway_mm: String,
}

/// Validate a model payload and fill missing code from the topic fallback chain.
pub fn finish_card(g: GeneratedCard, topic: Topic, selector: &Selector) -> Result<FlashcardData, ProviderError> {
  let required = [
    ("title", &g.title),
    ("scenario_eng", &g.scenario_eng),
    ("scenario_mm", &g.scenario_mm),
    ("question_eng", &g.question_eng),
    ("question_mm", &g.question_mm),
    ("solution_eng", &g.solution_eng),
    ("solution_mm", &g.solution_mm),
    ("key_takeaway_eng", &g.key_takeaway_eng),
    ("key_takeaway_mm", &g.key_takeaway_mm),
  ];
  if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
    return Err(ProviderError::Malformed(format!("field `{field}` is empty")));
  }

  let fallback = || topic_code(selector.topics().get(topic));
  let non_empty = |s: Option<String>| s.filter(|c| !c.trim().is_empty());
  let (initial, solution) = match (non_empty(g.code_snippet_initial), non_empty(g.code_snippet_solution)) {
    (Some(i), Some(s)) => (i, s),
    (Some(i), None) => (i, fallback().solution),
    (None, Some(s)) => (fallback().initial, s),
    (None, None) => {
      let code = fallback();
      (code.initial, code.solution)
    }
  };

  Ok(FlashcardData {
    title: g.title,
    difficulty: g.difficulty.unwrap_or(Difficulty::Senior),
    scenario_eng: g.scenario_eng,
    scenario_mm: g.scenario_mm,
    scenario_mm_translated: true,
    question_eng: g.question_eng,
    question_mm: g.question_mm,
    code_snippet_initial: initial,
    code_snippet_solution: solution,
    solution_eng: g.solution_eng,
    solution_mm: g.solution_mm,
    key_takeaway_eng: g.key_takeaway_eng,
    key_takeaway_mm: g.key_takeaway_mm,
  })
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  response_format: Value,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
  #[serde(default)] refusal: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
