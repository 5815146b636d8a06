use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

#[automock]
#[async_trait]
pub trait ChatbotUsageRepository {
    /// Adds one message to the user's counter for `date` and returns the new count.
    async fn increment(&self, user_id: Uuid, date: NaiveDate) -> Result<i32>;
    async fn get(&self, user_id: Uuid, date: NaiveDate) -> Result<i32>;
}
