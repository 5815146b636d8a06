use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::chat_messages::{ChatMessageEntity, InsertChatMessageEntity},
    value_objects::chat_messages::ChatThreadKey,
};

#[automock]
#[async_trait]
pub trait ChatMessageRepository {
    async fn insert(&self, message: InsertChatMessageEntity) -> Result<ChatMessageEntity>;
    /// Oldest first.
    async fn list_thread(
        &self,
        thread: ChatThreadKey,
        after: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ChatMessageEntity>>;
    async fn thread_exists(&self, thread: ChatThreadKey) -> Result<bool>;
    /// Marks messages not sent by `reader_id` as read.
    async fn mark_read(&self, thread: ChatThreadKey, reader_id: Uuid) -> Result<usize>;
    /// Latest message of every thread the participant is part of.
    async fn list_thread_heads(
        &self,
        participant_id: Uuid,
        as_psychologist: bool,
    ) -> Result<Vec<ChatMessageEntity>>;
    async fn count_unread(
        &self,
        participant_id: Uuid,
        as_psychologist: bool,
    ) -> Result<Vec<(ChatThreadKey, i64)>>;
}
