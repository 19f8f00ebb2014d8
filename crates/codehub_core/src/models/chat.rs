use crate::constants::CHAT_MESSAGE_ID_PREFIX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message posted to a collaboration chat, stored locally per chat id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub chat_id: String,
}

impl ChatMessage {
    pub fn new(chat_id: String, sender: String, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}{}", CHAT_MESSAGE_ID_PREFIX, now.timestamp_millis()),
            sender,
            text,
            timestamp: now,
            chat_id,
        }
    }
}
