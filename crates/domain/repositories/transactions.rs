use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::transactions::{InsertTransactionEntity, TransactionEntity},
    value_objects::transactions::{ListTransactionsFilter, TransactionInsertOutcome},
};

#[automock]
#[async_trait]
pub trait TransactionRepository {
    /// Stores a pending transaction. When it carries a voucher, the voucher use is recorded in
    /// the same database transaction and nothing is written if the voucher cap is reached.
    async fn create(&self, transaction: InsertTransactionEntity)
    -> Result<TransactionInsertOutcome>;
    async fn find_by_id(&self, transaction_id: Uuid) -> Result<Option<TransactionEntity>>;
    async fn list(&self, filter: ListTransactionsFilter) -> Result<Vec<TransactionEntity>>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<TransactionEntity>>;
    /// Approves a pending transaction and upgrades its owner to gold in one database transaction.
    /// Returns false when the transaction was no longer pending.
    async fn approve_and_upgrade(
        &self,
        transaction_id: Uuid,
        reviewer_id: Uuid,
        note: Option<String>,
        reviewed_at: DateTime<Utc>,
        gold_expires_at: DateTime<Utc>,
    ) -> Result<bool>;
    /// Returns false when the transaction was no longer pending.
    async fn reject(
        &self,
        transaction_id: Uuid,
        reviewer_id: Uuid,
        note: Option<String>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool>;
    async fn sum_approved_amount(&self) -> Result<i64>;
    async fn count_by_status(&self) -> Result<Vec<(String, i64)>>;
}
