use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{RunQueryDsl, dsl::count_star, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::emotion_entries},
};
use domain::{
    entities::emotion_entries::{EmotionEntryEntity, InsertEmotionEntryEntity},
    repositories::emotion_entries::EmotionEntryRepository,
};

pub struct EmotionEntryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EmotionEntryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EmotionEntryRepository for EmotionEntryPostgres {
    async fn insert(&self, entry: InsertEmotionEntryEntity) -> Result<EmotionEntryEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(emotion_entries::table)
            .values(&entry)
            .returning(EmotionEntryEntity::as_returning())
            .get_result::<EmotionEntryEntity>(&mut conn)?;

        Ok(result)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<EmotionEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let mut query = emotion_entries::table
            .filter(emotion_entries::user_id.eq(user_id))
            .select(EmotionEntryEntity::as_select())
            .into_boxed();

        if let Some(from) = from {
            query = query.filter(emotion_entries::entry_date.ge(from));
        }

        if let Some(to) = to {
            query = query.filter(emotion_entries::entry_date.le(to));
        }

        let results = query
            .order((
                emotion_entries::entry_date.desc(),
                emotion_entries::created_at.desc(),
            ))
            .load::<EmotionEntryEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_entry_dates(&self, user_id: Uuid) -> Result<Vec<NaiveDate>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = emotion_entries::table
            .filter(emotion_entries::user_id.eq(user_id))
            .select(emotion_entries::entry_date)
            .distinct()
            .load::<NaiveDate>(&mut conn)?;

        Ok(results)
    }

    async fn count_by_level(&self, user_id: Option<Uuid>) -> Result<Vec<(i32, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = match user_id {
            Some(user_id) => emotion_entries::table
                .filter(emotion_entries::user_id.eq(user_id))
                .group_by(emotion_entries::level)
                .select((emotion_entries::level, count_star()))
                .load::<(i32, i64)>(&mut conn)?,
            None => emotion_entries::table
                .group_by(emotion_entries::level)
                .select((emotion_entries::level, count_star()))
                .load::<(i32, i64)>(&mut conn)?,
        };

        Ok(results)
    }
}
