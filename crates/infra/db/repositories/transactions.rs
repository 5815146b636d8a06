use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    Connection, OptionalExtension, RunQueryDsl, dsl::count_star, insert_into, prelude::*, update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{transactions, users, vouchers},
};
use domain::{
    entities::transactions::{InsertTransactionEntity, TransactionEntity},
    repositories::transactions::TransactionRepository,
    value_objects::{
        enums::{transaction_statuses::TransactionStatus, user_tiers::UserTier},
        transactions::{ListTransactionsFilter, TransactionInsertOutcome},
    },
};

pub struct TransactionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TransactionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TransactionRepository for TransactionPostgres {
    async fn create(
        &self,
        transaction: InsertTransactionEntity,
    ) -> Result<TransactionInsertOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<TransactionInsertOutcome, diesel::result::Error, _>(|tx| {
            if let Some(voucher_id) = transaction.voucher_id {
                let redeemed = update(
                    vouchers::table.filter(vouchers::id.eq(voucher_id)).filter(
                        vouchers::max_uses
                            .is_null()
                            .or(vouchers::used_count.nullable().lt(vouchers::max_uses)),
                    ),
                )
                .set(vouchers::used_count.eq(vouchers::used_count + 1))
                .execute(tx)?;

                if redeemed == 0 {
                    return Ok(TransactionInsertOutcome::VoucherExhausted);
                }
            }

            let transaction_id = insert_into(transactions::table)
                .values(&transaction)
                .returning(transactions::id)
                .get_result::<Uuid>(tx)?;

            Ok(TransactionInsertOutcome::Created(transaction_id))
        })?;

        Ok(outcome)
    }

    async fn find_by_id(&self, transaction_id: Uuid) -> Result<Option<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = transactions::table
            .filter(transactions::id.eq(transaction_id))
            .select(TransactionEntity::as_select())
            .first::<TransactionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(&self, filter: ListTransactionsFilter) -> Result<Vec<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let mut query = transactions::table
            .select(TransactionEntity::as_select())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(transactions::status.eq(status.as_str()));
        }

        query = query.order(transactions::created_at.desc());

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let results = query.load::<TransactionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .select(TransactionEntity::as_select())
            .order(transactions::created_at.desc())
            .load::<TransactionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn approve_and_upgrade(
        &self,
        transaction_id: Uuid,
        reviewer_id: Uuid,
        note: Option<String>,
        reviewed_at: DateTime<Utc>,
        gold_expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let approved = conn.transaction::<bool, diesel::result::Error, _>(|tx| {
            let owner = update(
                transactions::table
                    .filter(transactions::id.eq(transaction_id))
                    .filter(transactions::status.eq(TransactionStatus::Pending.as_str())),
            )
            .set((
                transactions::status.eq(TransactionStatus::Approved.as_str()),
                transactions::reviewed_by.eq(Some(reviewer_id)),
                transactions::reviewed_at.eq(Some(reviewed_at)),
                transactions::note.eq(note),
            ))
            .returning(transactions::user_id)
            .get_result::<Uuid>(tx)
            .optional()?;

            let Some(user_id) = owner else {
                return Ok(false);
            };

            update(users::table.filter(users::id.eq(user_id)))
                .set((
                    users::tier.eq(UserTier::Gold.as_str()),
                    users::gold_expires_at.eq(Some(gold_expires_at)),
                    users::updated_at.eq(reviewed_at),
                ))
                .execute(tx)?;

            Ok(true)
        })?;

        Ok(approved)
    }

    async fn reject(
        &self,
        transaction_id: Uuid,
        reviewer_id: Uuid,
        note: Option<String>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            transactions::table
                .filter(transactions::id.eq(transaction_id))
                .filter(transactions::status.eq(TransactionStatus::Pending.as_str())),
        )
        .set((
            transactions::status.eq(TransactionStatus::Rejected.as_str()),
            transactions::reviewed_by.eq(Some(reviewer_id)),
            transactions::reviewed_at.eq(Some(reviewed_at)),
            transactions::note.eq(note),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn sum_approved_amount(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let amounts = transactions::table
            .filter(transactions::status.eq(TransactionStatus::Approved.as_str()))
            .select(transactions::amount)
            .load::<i64>(&mut conn)?;

        Ok(amounts.into_iter().sum())
    }

    async fn count_by_status(&self) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = transactions::table
            .group_by(transactions::status)
            .select((transactions::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;

        Ok(results)
    }
}
