//! Client-side conversation flow for the VetLLM chat.
//!
//! A finite-state menu/input controller that walks the user from category
//! to action, collects multi-step answers, composes the outbound message,
//! and renders the relay's reply into the chat transcript.

pub mod controller;
pub mod error;
pub mod format;
pub mod message;
pub mod session;
pub mod state;
pub mod transport;

pub use controller::{FlowController, InputOutcome, MenuOption, PendingRequest, DEFAULT_PLACEHOLDER};
pub use error::FlowError;
pub use format::{format_response, format_value};
pub use message::{ChatMessage, Sender};
pub use session::ChatSession;
pub use state::{ConversationState, StateKind};
pub use transport::{HttpRelayClient, RelayTransport};
