use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::conversations::{
    ConversationEntity, ConversationMessageEntity, InsertConversationEntity,
    InsertConversationMessageEntity,
};

#[automock]
#[async_trait]
pub trait ConversationRepository {
    async fn create(&self, conversation: InsertConversationEntity) -> Result<ConversationEntity>;
    async fn find_by_id(&self, conversation_id: Uuid) -> Result<Option<ConversationEntity>>;
    /// Most recently updated first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ConversationEntity>>;
    async fn touch(&self, conversation_id: Uuid, at: DateTime<Utc>) -> Result<()>;
    async fn insert_message(&self, message: InsertConversationMessageEntity) -> Result<()>;
    /// The newest `limit` messages, returned oldest first.
    async fn list_recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ConversationMessageEntity>>;
    /// Deletes the oldest messages beyond `keep`; returns how many were removed.
    async fn evict_old_messages(&self, conversation_id: Uuid, keep: i64) -> Result<usize>;
    /// Deletes the least recently updated conversations beyond `keep`.
    async fn evict_old_conversations(&self, user_id: Uuid, keep: i64) -> Result<usize>;
    async fn delete(&self, conversation_id: Uuid) -> Result<()>;
}
