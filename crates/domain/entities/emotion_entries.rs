use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::emotion_entries;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = emotion_entries)]
pub struct EmotionEntryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level: i32,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = emotion_entries)]
pub struct InsertEmotionEntryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level: i32,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
