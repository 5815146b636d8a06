use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::diary_entries::{
    DiaryEntryEntity, InsertDiaryEntryEntity, UpdateDiaryEntryEntity,
};

#[automock]
#[async_trait]
pub trait DiaryEntryRepository {
    async fn insert(&self, entry: InsertDiaryEntryEntity) -> Result<DiaryEntryEntity>;
    async fn find_by_id(&self, entry_id: Uuid) -> Result<Option<DiaryEntryEntity>>;
    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<DiaryEntryEntity>>;
    async fn update(
        &self,
        entry_id: Uuid,
        changes: UpdateDiaryEntryEntity,
    ) -> Result<DiaryEntryEntity>;
    async fn delete(&self, entry_id: Uuid) -> Result<()>;
}
