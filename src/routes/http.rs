//! HTTP endpoint handlers. These are thin wrappers that forward to the provider.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{error, info, instrument};

use crate::protocol::*;
use crate::state::AppState;
use crate::view::FETCH_FAILED_MESSAGE;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, provider: state.provider.name() })
}

#[instrument(level = "info")]
pub async fn http_get_topics() -> impl IntoResponse {
  Json(topics_out())
}

/// One-shot fetch outside any session; the topic defaults to the configured one.
#[instrument(level = "info", skip(state), fields(topic = ?q.topic))]
pub async fn http_get_flashcard(
  State(state): State<Arc<AppState>>,
  Query(q): Query<FlashcardQuery>,
) -> Response {
  let topic = q.topic.unwrap_or(state.default_topic);
  match state.provider.fetch_flashcard(topic).await {
    Ok(card) => {
      info!(target: "flashcard", ?topic, title = %card.title, "HTTP flashcard served");
      Json(card).into_response()
    }
    Err(e) => {
      error!(target: "flashcard", ?topic, error = %e, "HTTP flashcard fetch failed");
      (StatusCode::BAD_GATEWAY, Json(ErrorOut { message: FETCH_FAILED_MESSAGE.into() })).into_response()
    }
  }
}
