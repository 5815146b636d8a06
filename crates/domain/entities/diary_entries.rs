use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::diary_entries;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = diary_entries)]
pub struct DiaryEntryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = diary_entries)]
pub struct InsertDiaryEntryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = diary_entries)]
pub struct UpdateDiaryEntryEntity {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
