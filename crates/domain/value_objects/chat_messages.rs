use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::chat_messages::{ChatMessageEntity, InsertChatMessageEntity};

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessageModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub psychologist_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessageEntity> for ChatMessageModel {
    fn from(entity: ChatMessageEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            psychologist_id: entity.psychologist_id,
            sender_id: entity.sender_id,
            content: entity.content,
            is_read: entity.is_read,
            created_at: entity.created_at,
        }
    }
}

/// A user/psychologist pair identifying one direct-chat thread.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChatThreadKey {
    pub user_id: Uuid,
    pub psychologist_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendChatMessageModel {
    pub content: String,
}

impl SendChatMessageModel {
    pub fn check(&self) -> Result<(), String> {
        let count = self.content.trim().chars().count();
        if count == 0 {
            return Err("message is empty".to_string());
        }
        if count > MAX_MESSAGE_CHARS {
            return Err(format!(
                "message must be at most {} characters",
                MAX_MESSAGE_CHARS
            ));
        }
        Ok(())
    }

    pub fn to_entity(&self, thread: ChatThreadKey, sender_id: Uuid) -> InsertChatMessageEntity {
        InsertChatMessageEntity {
            id: Uuid::new_v4(),
            user_id: thread.user_id,
            psychologist_id: thread.psychologist_id,
            sender_id,
            content: self.content.trim().to_string(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatPageQuery {
    /// Only messages created strictly after this instant; used for polling.
    pub after: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl ChatPageQuery {
    pub fn limit_or_default(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatThreadModel {
    pub user_id: Uuid,
    pub psychologist_id: Uuid,
    pub counterpart_name: String,
    pub counterpart_avatar_url: Option<String>,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
    pub unread_count: i64,
}
