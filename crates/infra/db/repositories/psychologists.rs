use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    Connection, OptionalExtension, PgTextExpressionMethods, RunQueryDsl, insert_into,
    prelude::*, update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{psychologists, users},
};
use domain::{
    entities::{
        psychologists::{InsertPsychologistEntity, PsychologistEntity, UpdatePsychologistEntity},
        users::{InsertUserEntity, UserEntity},
    },
    repositories::psychologists::PsychologistRepository,
    value_objects::psychologists::ListPsychologistsFilter,
};

pub struct PsychologistPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PsychologistPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PsychologistRepository for PsychologistPostgres {
    async fn create_with_user(
        &self,
        user: InsertUserEntity,
        profile: InsertPsychologistEntity,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<Uuid, diesel::result::Error, _>(|tx| {
            let user_id = insert_into(users::table)
                .values(&user)
                .returning(users::id)
                .get_result::<Uuid>(tx)?;

            insert_into(psychologists::table)
                .values(&profile)
                .execute(tx)?;

            Ok(user_id)
        })?;

        Ok(result)
    }

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<(PsychologistEntity, UserEntity)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = psychologists::table
            .inner_join(users::table)
            .filter(psychologists::user_id.eq(user_id))
            .select((PsychologistEntity::as_select(), UserEntity::as_select()))
            .first::<(PsychologistEntity, UserEntity)>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(
        &self,
        filter: ListPsychologistsFilter,
    ) -> Result<Vec<(PsychologistEntity, UserEntity)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let mut query = psychologists::table
            .inner_join(users::table)
            .filter(users::is_active.eq(true))
            .select((PsychologistEntity::as_select(), UserEntity::as_select()))
            .into_boxed();

        if filter.available_only.unwrap_or(false) {
            query = query.filter(psychologists::is_available.eq(true));
        }

        if let Some(specialization) = filter.specialization.filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                psychologists::specialization.ilike(format!("%{}%", specialization.trim())),
            );
        }

        let results = query
            .order((
                psychologists::rating_avg.desc(),
                psychologists::rating_count.desc(),
            ))
            .load::<(PsychologistEntity, UserEntity)>(&mut conn)?;

        Ok(results)
    }

    async fn update_profile(&self, user_id: Uuid, changes: UpdatePsychologistEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(psychologists::table.filter(psychologists::user_id.eq(user_id)))
            .set(&changes)
            .execute(&mut conn)?;

        Ok(())
    }
}
