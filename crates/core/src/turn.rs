//! Conversation turns.
//!
//! The chat frontend sends prior turns along with each request; the
//! orchestrator only ever reads the tail of that history, so the shape
//! stays deliberately small: a role and the text.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student or applicant asking questions
    User,
    /// The assistant
    Assistant,
}

/// A single prior exchange in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who sent this turn
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
