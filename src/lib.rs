//! Odel - voice assistant with wake-word listening and intent dispatch
//!
//! This library provides the assistant core:
//! - Intent classification over an ordered rule table
//! - Dialogue turn processing with short-term conversational context
//! - HTTP knowledge and device connectors
//! - Voice I/O (capture, wake-phrase detection, STT, TTS, playback)
//! - A wake/listen state machine tying it all together
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                Wake/Listen Controller                 │
//! │   Passive ──▶ Active ──▶ Turn ──▶ Speaking ──▶ ...   │
//! └──────────────────────┬───────────────────────────────┘
//!                        │ utterance
//! ┌──────────────────────▼───────────────────────────────┐
//! │              Dialogue Turn Processor                  │
//! │   connectivity gate │ intent matcher │ dispatch       │
//! └──────────────────────┬───────────────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────────────┐
//! │                    Connectors                         │
//! │   joke │ dictionary │ weather │ answers │ light       │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod connectivity;
pub mod connectors;
pub mod context;
pub mod controller;
pub mod dialogue;
pub mod error;
pub mod intent;
pub mod voice;

pub use config::Config;
pub use connectivity::ConnectivityMonitor;
pub use context::{ConversationContext, FollowUp, TurnRecord};
pub use controller::{ListenEvent, ListenState, WakeListenController};
pub use dialogue::{DialogueProcessor, TurnResult};
pub use error::{Error, Result};
pub use intent::Intent;
