//! Chat transcript entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// One entry in the append-only chat transcript.
///
/// Clients render `text` as plain text unless `raw_markup` is set. Only bot
/// messages carry a reference block, which starts collapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub raw_markup: bool,
    #[serde(default)]
    pub reference_expanded: bool,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sender,
            text: text.into(),
            reference: None,
            raw_markup: false,
            reference_expanded: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// Bot message with an optional reference block. Empty references are dropped.
    pub fn bot_with_reference(text: impl Into<String>, reference: Option<String>) -> Self {
        let mut message = Self::bot(text);
        message.reference = reference.filter(|r| !r.is_empty());
        message
    }

    /// Opt this message into raw markup rendering.
    pub fn with_raw_markup(mut self) -> Self {
        self.raw_markup = true;
        self
    }

    /// Whether a reference toggle should be shown.
    pub fn has_reference(&self) -> bool {
        self.sender == Sender::Bot && self.reference.is_some()
    }

    /// Flip the reference block's visibility. Returns the new visibility,
    /// or `None` if the message has no reference.
    pub fn toggle_reference(&mut self) -> Option<bool> {
        if !self.has_reference() {
            return None;
        }
        self.reference_expanded = !self.reference_expanded;
        Some(self.reference_expanded)
    }
}
