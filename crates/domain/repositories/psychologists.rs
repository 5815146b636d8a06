use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        psychologists::{InsertPsychologistEntity, PsychologistEntity, UpdatePsychologistEntity},
        users::{InsertUserEntity, UserEntity},
    },
    value_objects::psychologists::ListPsychologistsFilter,
};

#[automock]
#[async_trait]
pub trait PsychologistRepository {
    /// Creates the account and its profile atomically.
    async fn create_with_user(
        &self,
        user: InsertUserEntity,
        profile: InsertPsychologistEntity,
    ) -> Result<Uuid>;
    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<(PsychologistEntity, UserEntity)>>;
    async fn list(
        &self,
        filter: ListPsychologistsFilter,
    ) -> Result<Vec<(PsychologistEntity, UserEntity)>>;
    async fn update_profile(&self, user_id: Uuid, changes: UpdatePsychologistEntity) -> Result<()>;
}
