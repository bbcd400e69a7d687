//! Flashcard core for senior programming topics, in English and Myanmar.
//!
//! Leaf-first: `content` (question bank) and `topics` (keywords and default
//! code per topic) feed the `selector`; `assembler` turns a selection into a
//! `FlashcardData`; `provider` / `openai` expose that as an async capability;
//! `view` is the per-session state machine and `session` drives it.

pub mod telemetry;
pub mod util;
pub mod domain;
pub mod content;
pub mod topics;
pub mod selector;
pub mod assembler;
pub mod provider;
pub mod openai;
pub mod view;
pub mod session;
pub mod config;
pub mod state;
pub mod protocol;
pub mod routes;
