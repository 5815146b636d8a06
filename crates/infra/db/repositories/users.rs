use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, RunQueryDsl, dsl::count_star, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::users},
};
use domain::{
    entities::users::{InsertUserEntity, UpdateUserProfileEntity, UserEntity},
    repositories::users::UserRepository,
    value_objects::{
        enums::{user_roles::UserRole, user_tiers::UserTier},
        users::ListUsersFilter,
    },
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn create(&self, user: InsertUserEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user_id = insert_into(users::table)
            .values(&user)
            .returning(users::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(user_id)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::id.eq(user_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn find_by_ids(&self, user_ids: Vec<Uuid>) -> Result<Vec<UserEntity>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .filter(users::id.eq_any(user_ids))
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list(&self, filter: ListUsersFilter) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let mut query = users::table
            .select(UserEntity::as_select())
            .into_boxed();

        if let Some(role) = filter.role {
            query = query.filter(users::role.eq(role.as_str()));
        }

        if let Some(tier) = filter.tier {
            query = query.filter(users::tier.eq(tier.as_str()));
        }

        query = query.order(users::created_at.desc());

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let results = query.load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: UpdateUserProfileEntity,
    ) -> Result<UserEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = update(users::table.filter(users::id.eq(user_id)))
            .set(&changes)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)?;

        Ok(user)
    }

    async fn update_avatar(&self, user_id: Uuid, avatar_url: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::avatar_url.eq(Some(avatar_url)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::role.eq(role.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn update_tier(
        &self,
        user_id: Uuid,
        tier: UserTier,
        gold_expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::tier.eq(tier.as_str()),
                users::gold_expires_at.eq(gold_expires_at),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::is_active.eq(is_active),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn count_by_role(&self) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .group_by(users::role)
            .select((users::role, count_star()))
            .order(users::role.asc())
            .load::<(String, i64)>(&mut conn)?;

        Ok(results)
    }

    async fn count_by_effective_tier(&self, now: DateTime<Utc>) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = users::table
            .select(count_star())
            .first::<i64>(&mut conn)?;

        let gold = users::table
            .filter(users::tier.eq(UserTier::Gold.as_str()))
            .filter(
                users::gold_expires_at
                    .is_null()
                    .or(users::gold_expires_at.gt(now)),
            )
            .select(count_star())
            .first::<i64>(&mut conn)?;

        Ok(vec![
            (UserTier::Free.to_string(), total - gold),
            (UserTier::Gold.to_string(), gold),
        ])
    }

    async fn list_created_at_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .filter(users::created_at.ge(since))
            .select(users::created_at)
            .order(users::created_at.asc())
            .load::<DateTime<Utc>>(&mut conn)?;

        Ok(results)
    }
}
