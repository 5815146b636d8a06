use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{conversation_messages, conversations},
};
use domain::{
    entities::conversations::{
        ConversationEntity, ConversationMessageEntity, InsertConversationEntity,
        InsertConversationMessageEntity,
    },
    repositories::conversations::ConversationRepository,
};

pub struct ConversationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ConversationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn beyond_keep(ids_newest_first: Vec<Uuid>, keep: i64) -> Vec<Uuid> {
    ids_newest_first
        .into_iter()
        .skip(keep.max(0) as usize)
        .collect()
}

#[async_trait]
impl ConversationRepository for ConversationPostgres {
    async fn create(&self, conversation: InsertConversationEntity) -> Result<ConversationEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(conversations::table)
            .values(&conversation)
            .returning(ConversationEntity::as_returning())
            .get_result::<ConversationEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, conversation_id: Uuid) -> Result<Option<ConversationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conversations::table
            .filter(conversations::id.eq(conversation_id))
            .select(ConversationEntity::as_select())
            .first::<ConversationEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ConversationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = conversations::table
            .filter(conversations::user_id.eq(user_id))
            .select(ConversationEntity::as_select())
            .order(conversations::updated_at.desc())
            .load::<ConversationEntity>(&mut conn)?;

        Ok(results)
    }

    async fn touch(&self, conversation_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(conversations::table.filter(conversations::id.eq(conversation_id)))
            .set(conversations::updated_at.eq(at))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn insert_message(&self, message: InsertConversationMessageEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(conversation_messages::table)
            .values(&message)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ConversationMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut results = conversation_messages::table
            .filter(conversation_messages::conversation_id.eq(conversation_id))
            .select(ConversationMessageEntity::as_select())
            .order(conversation_messages::created_at.desc())
            .limit(limit)
            .load::<ConversationMessageEntity>(&mut conn)?;
        results.reverse();

        Ok(results)
    }

    async fn evict_old_messages(&self, conversation_id: Uuid, keep: i64) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let ids = conversation_messages::table
            .filter(conversation_messages::conversation_id.eq(conversation_id))
            .select(conversation_messages::id)
            .order(conversation_messages::created_at.desc())
            .load::<Uuid>(&mut conn)?;

        let stale = beyond_keep(ids, keep);
        if stale.is_empty() {
            return Ok(0);
        }

        let deleted = delete(conversation_messages::table.filter(conversation_messages::id.eq_any(stale)))
            .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn evict_old_conversations(&self, user_id: Uuid, keep: i64) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let ids = conversations::table
            .filter(conversations::user_id.eq(user_id))
            .select(conversations::id)
            .order(conversations::updated_at.desc())
            .load::<Uuid>(&mut conn)?;

        let stale = beyond_keep(ids, keep);
        if stale.is_empty() {
            return Ok(0);
        }

        // Messages go with their conversation through the cascading foreign key.
        let deleted = delete(conversations::table.filter(conversations::id.eq_any(stale)))
            .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn delete(&self, conversation_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(conversations::table.filter(conversations::id.eq(conversation_id)))
            .execute(&mut conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: usize) -> Vec<Uuid> {
        (0..count).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn beyond_keep_drops_everything_after_the_newest() {
        let newest_first = ids(5);

        let dropped = beyond_keep(newest_first.clone(), 3);

        assert_eq!(dropped, newest_first[3..].to_vec());
    }

    #[test]
    fn beyond_keep_with_no_room_drops_all() {
        let newest_first = ids(3);

        assert_eq!(beyond_keep(newest_first.clone(), 0), newest_first);
        assert_eq!(beyond_keep(newest_first.clone(), -4), newest_first);
    }

    #[test]
    fn beyond_keep_under_the_cap_drops_nothing() {
        assert!(beyond_keep(ids(50), 50).is_empty());
        assert!(beyond_keep(ids(7), 20).is_empty());
        assert!(beyond_keep(Vec::new(), 20).is_empty());
    }
}
