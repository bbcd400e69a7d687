//! RefactorDeck · bilingual flashcards for senior programming topics
//!
//! - Axum HTTP + WebSocket API (one flashcard session per WebSocket)
//! - Curated English/Myanmar question bank, optionally expanded by an
//!   OpenAI-compatible model
//! - Static frontend fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   DECK_CONFIG_PATH : path to TOML config (defaults, prompts, extra questions)
//!   OPENAI_API_KEY   : enables the generative provider if present
//!   OPENAI_BASE_URL  : default "https://api.openai.com/v1"
//!   OPENAI_MODEL     : default "gpt-4o-mini"
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use refactor_deck::config::load_deck_config_from_env;
use refactor_deck::openai::OpenAI;
use refactor_deck::routes::build_router;
use refactor_deck::state::AppState;
use refactor_deck::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: question bank, selector and the content-fetch provider.
  let cfg = load_deck_config_from_env();
  let state = Arc::new(AppState::new(cfg, OpenAI::from_env())?);

  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "refactor_deck", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "refactor_deck", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "refactor_deck", "Shutdown signal received");
}
