use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::emotion_entries::{EmotionEntryEntity, InsertEmotionEntryEntity};

#[automock]
#[async_trait]
pub trait EmotionEntryRepository {
    async fn insert(&self, entry: InsertEmotionEntryEntity) -> Result<EmotionEntryEntity>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<EmotionEntryEntity>>;
    async fn list_entry_dates(&self, user_id: Uuid) -> Result<Vec<NaiveDate>>;
    /// `(level, count)` pairs, for one user or for everyone.
    async fn count_by_level(&self, user_id: Option<Uuid>) -> Result<Vec<(i32, i64)>>;
}
