use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::transactions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = transactions)]
pub struct TransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub original_amount: i64,
    pub amount: i64,
    pub voucher_id: Option<Uuid>,
    pub proof_image_url: String,
    pub status: String,
    pub note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertTransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub original_amount: i64,
    pub amount: i64,
    pub voucher_id: Option<Uuid>,
    pub proof_image_url: String,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
