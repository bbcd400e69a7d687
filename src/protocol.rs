//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{LanguageMode, Topic};
use crate::session::Command;
use crate::view::ViewSnapshot;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Snapshot,
    RequestCard,
    ToggleFlip,
    SetLanguageMode { mode: LanguageMode },
    SetTopic { topic: Topic },
}

impl ClientWsMessage {
    /// The session command this message maps to, if it changes state.
    pub fn command(&self) -> Option<Command> {
        match self {
            ClientWsMessage::Ping | ClientWsMessage::Snapshot => None,
            ClientWsMessage::RequestCard => Some(Command::RequestCard),
            ClientWsMessage::ToggleFlip => Some(Command::ToggleFlip),
            ClientWsMessage::SetLanguageMode { mode } => Some(Command::SetLanguageMode(*mode)),
            ClientWsMessage::SetTopic { topic } => Some(Command::SetTopic(*topic)),
        }
    }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State { view: ViewSnapshot },
    Error { message: String },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct FlashcardQuery {
    pub topic: Option<Topic>,
}

#[derive(Serialize)]
pub struct TopicOut {
    pub id: Topic,
    pub label: &'static str,
}

pub fn topics_out() -> Vec<TopicOut> {
    Topic::ALL.iter().map(|&t| TopicOut { id: t, label: t.label() }).collect()
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub provider: &'static str,
}
