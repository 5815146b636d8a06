use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::diary_entries},
};
use domain::{
    entities::diary_entries::{DiaryEntryEntity, InsertDiaryEntryEntity, UpdateDiaryEntryEntity},
    repositories::diary_entries::DiaryEntryRepository,
};

pub struct DiaryEntryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DiaryEntryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DiaryEntryRepository for DiaryEntryPostgres {
    async fn insert(&self, entry: InsertDiaryEntryEntity) -> Result<DiaryEntryEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(diary_entries::table)
            .values(&entry)
            .returning(DiaryEntryEntity::as_returning())
            .get_result::<DiaryEntryEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, entry_id: Uuid) -> Result<Option<DiaryEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = diary_entries::table
            .filter(diary_entries::id.eq(entry_id))
            .select(DiaryEntryEntity::as_select())
            .first::<DiaryEntryEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<DiaryEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = diary_entries::table
            .filter(diary_entries::user_id.eq(user_id))
            .select(DiaryEntryEntity::as_select())
            .order(diary_entries::created_at.desc())
            .limit(limit)
            .load::<DiaryEntryEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update(
        &self,
        entry_id: Uuid,
        changes: UpdateDiaryEntryEntity,
    ) -> Result<DiaryEntryEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(diary_entries::table.filter(diary_entries::id.eq(entry_id)))
            .set(&changes)
            .returning(DiaryEntryEntity::as_returning())
            .get_result::<DiaryEntryEntity>(&mut conn)?;

        Ok(result)
    }

    async fn delete(&self, entry_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(diary_entries::table.filter(diary_entries::id.eq(entry_id))).execute(&mut conn)?;

        Ok(())
    }
}
