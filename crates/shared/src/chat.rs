use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::response::Source;

#[derive(Clone, Debug, Display, Deserialize, Serialize, PartialEq, Eq)]
pub enum ChatRole {
    #[serde(rename = "user")]
    #[strum(serialize = "user")]
    User,
    #[serde(rename = "assistant")]
    #[strum(serialize = "assistant")]
    Assistant,
}

/// One transcript entry. Immutable once appended to a conversation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: &str, sources: Vec<Source>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.to_string(),
            sources,
            created_at: Utc::now(),
        }
    }
}
