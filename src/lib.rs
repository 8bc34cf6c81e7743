//! SceneGPT - natural-language scene editing
//!
//! A request like "a blue ball that falls" goes to a chat-completion model,
//! comes back as a typed `create_object` command, and is executed against an
//! editable scene:
//! - Completion gateway over an OpenAI-compatible API
//! - Command parser and executor with a closed component catalog
//! - In-memory editor scene with selection, framing and undo
//! - Chat orchestrator with a timestamped log
//! - Optional Bevy viewer mirroring the scene

pub mod catalog;
pub mod chat;
pub mod cli;
pub mod command;
pub mod config;
pub mod executor;
pub mod gateway;
pub mod paths;
pub mod prefs;
pub mod scene;
pub mod slash;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use config::Config;
