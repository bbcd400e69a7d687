//! WebSocket upgrade + session loop. Each connection owns one flashcard
//! session. Client messages are parsed as JSON and dispatched into it; the
//! full view is pushed back after every change, including fetch completions.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::Session;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "refactor_deck", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, Uuid::new_v4()))
}

#[instrument(level = "info", skip(socket, state, session_id), fields(%session_id))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, session_id: Uuid) {
  info!(target: "refactor_deck", "WebSocket connected");
  let mut session = Session::start(state.provider.clone(), state.new_view());

  // The initial request is already in flight; show the loading state.
  if send(&mut socket, &ServerWsMessage::State { view: session.snapshot() }).await.is_err() {
    return;
  }

  loop {
    let reply = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => handle_client_text(&txt, &mut session),
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => continue,
        Some(Err(e)) => {
          error!(target: "refactor_deck", error = %e, "WS receive error");
          break;
        }
      },
      reply = completion_reply(&mut session) => reply,
    };

    if send(&mut socket, &reply).await.is_err() {
      break;
    }
  }
  info!(target: "refactor_deck", "WebSocket disconnected");
}

/// Wait for the next fetch to land and render the resulting view.
async fn completion_reply(session: &mut Session) -> ServerWsMessage {
  let applied = session.next_completion().await;
  debug!(target: "flashcard", ?applied, "Completion applied");
  ServerWsMessage::State { view: session.snapshot() }
}

fn handle_client_text(txt: &str, session: &mut Session) -> ServerWsMessage {
  match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(ClientWsMessage::Ping) => ServerWsMessage::Pong,
    Ok(incoming) => {
      debug!(target: "refactor_deck", "WS received: {:?}", &incoming);
      if let Some(command) = incoming.command() {
        session.dispatch(command);
      }
      ServerWsMessage::State { view: session.snapshot() }
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  }
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "refactor_deck", error = %e, "WS send error");
    e
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{LanguageMode, Topic};
  use crate::provider::tests::{builtin_selector, Hung};
  use crate::provider::StaticProvider;
  use crate::view::{CardPhase, ViewState};
  use std::time::Duration;

  fn loading_session() -> Session {
    Session::start(Arc::new(Hung), ViewState::new(Topic::CleanCode, LanguageMode::Bilingual, 5))
  }

  #[tokio::test]
  async fn malformed_json_gets_an_error_reply() {
    let mut session = loading_session();
    match handle_client_text("{not json", &mut session) {
      ServerWsMessage::Error { message } => assert!(message.starts_with("Invalid JSON")),
      other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(session.view().phase(), CardPhase::Loading);
  }

  #[tokio::test]
  async fn ping_gets_pong() {
    let mut session = loading_session();
    assert!(matches!(handle_client_text(r#"{"type":"ping"}"#, &mut session), ServerWsMessage::Pong));
  }

  #[tokio::test]
  async fn commands_reply_with_state_and_flip_waits_for_a_card() {
    let mut session = loading_session();
    match handle_client_text(r#"{"type":"toggle_flip"}"#, &mut session) {
      ServerWsMessage::State { view } => {
        assert_eq!(view.phase, CardPhase::Loading);
        assert!(view.loading);
        assert!(!view.is_flipped);
      }
      other => panic!("expected state, got {other:?}"),
    }

    match handle_client_text(r#"{"type":"set_language_mode","mode":"myanmar"}"#, &mut session) {
      ServerWsMessage::State { view } => {
        assert_eq!(view.language_mode, LanguageMode::Myanmar);
        assert!(!view.show_english && view.show_myanmar);
      }
      other => panic!("expected state, got {other:?}"),
    }
  }

  #[tokio::test(start_paused = true)]
  async fn fetch_completion_pushes_ready_state() {
    let provider = Arc::new(StaticProvider::with_seed(builtin_selector(), Duration::from_millis(600), 3));
    let mut session = Session::start(provider, ViewState::new(Topic::Angular, LanguageMode::Bilingual, 5));

    match completion_reply(&mut session).await {
      ServerWsMessage::State { view } => {
        assert_eq!(view.phase, CardPhase::Ready);
        assert!(!view.loading);
        assert!(view.current_card.is_some());
      }
      other => panic!("expected state, got {other:?}"),
    }
  }
}
