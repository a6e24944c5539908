//! Broadcast messages
//!
//! Provides:
//! - The persisted `BroadcastMessage` model
//! - `MessageText`, a validated non-empty message body
//! - `BroadcastStore`, which keeps at most one message active at a time

mod store;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use store::BroadcastStore;

/// A broadcast message row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessage {
    pub id: i64,
    pub message: String,
    #[serde(skip_serializing)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Message text that is known to be non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    /// Validate raw text. Whitespace-only text counts as empty; accepted text is kept verbatim.
    pub fn new(text: impl Into<String>) -> Result<Self, EmptyMessage> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EmptyMessage);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returned when message text is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("message is empty")]
pub struct EmptyMessage;

/// Broadcast store errors
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid timestamp in row {id}: {source}")]
    Timestamp {
        id: i64,
        #[source]
        source: chrono::ParseError,
    },
}
