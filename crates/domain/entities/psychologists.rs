use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::psychologists;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = psychologists, primary_key(user_id))]
pub struct PsychologistEntity {
    pub user_id: Uuid,
    pub specialization: String,
    pub bio: Option<String>,
    pub experience_years: i32,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = psychologists)]
pub struct InsertPsychologistEntity {
    pub user_id: Uuid,
    pub specialization: String,
    pub bio: Option<String>,
    pub experience_years: i32,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = psychologists)]
pub struct UpdatePsychologistEntity {
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub is_available: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
