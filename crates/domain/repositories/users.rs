use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::users::{InsertUserEntity, UpdateUserProfileEntity, UserEntity},
    value_objects::{
        enums::{user_roles::UserRole, user_tiers::UserTier},
        users::ListUsersFilter,
    },
};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn create(&self, user: InsertUserEntity) -> Result<Uuid>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;
    async fn find_by_email(&self, email: String) -> Result<Option<UserEntity>>;
    async fn find_by_ids(&self, user_ids: Vec<Uuid>) -> Result<Vec<UserEntity>>;
    async fn list(&self, filter: ListUsersFilter) -> Result<Vec<UserEntity>>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: UpdateUserProfileEntity,
    ) -> Result<UserEntity>;
    async fn update_avatar(&self, user_id: Uuid, avatar_url: String) -> Result<()>;
    async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<()>;
    async fn update_tier(
        &self,
        user_id: Uuid,
        tier: UserTier,
        gold_expires_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
    async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<()>;
    async fn count_by_role(&self) -> Result<Vec<(String, i64)>>;
    /// Counts users per effective tier at `now` (expired gold counts as free).
    async fn count_by_effective_tier(&self, now: DateTime<Utc>) -> Result<Vec<(String, i64)>>;
    async fn list_created_at_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>>;
}
