use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::exists, insert_into, prelude::*, select, update};
use std::{collections::HashSet, sync::Arc};
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::chat_messages},
};
use domain::{
    entities::chat_messages::{ChatMessageEntity, InsertChatMessageEntity},
    repositories::chat_messages::ChatMessageRepository,
    value_objects::chat_messages::ChatThreadKey,
};

pub struct ChatMessagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ChatMessagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn participant_messages<'a>(
    participant_id: Uuid,
    as_psychologist: bool,
) -> chat_messages::BoxedQuery<'a, diesel::pg::Pg> {
    if as_psychologist {
        chat_messages::table
            .filter(chat_messages::psychologist_id.eq(participant_id))
            .into_boxed()
    } else {
        chat_messages::table
            .filter(chat_messages::user_id.eq(participant_id))
            .into_boxed()
    }
}

#[async_trait]
impl ChatMessageRepository for ChatMessagePostgres {
    async fn insert(&self, message: InsertChatMessageEntity) -> Result<ChatMessageEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(chat_messages::table)
            .values(&message)
            .returning(ChatMessageEntity::as_returning())
            .get_result::<ChatMessageEntity>(&mut conn)?;

        Ok(result)
    }

    async fn list_thread(
        &self,
        thread: ChatThreadKey,
        after: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ChatMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let query = chat_messages::table
            .filter(chat_messages::user_id.eq(thread.user_id))
            .filter(chat_messages::psychologist_id.eq(thread.psychologist_id))
            .select(ChatMessageEntity::as_select())
            .into_boxed();

        let results = match after {
            Some(after) => query
                .filter(chat_messages::created_at.gt(after))
                .order(chat_messages::created_at.asc())
                .limit(limit)
                .load::<ChatMessageEntity>(&mut conn)?,
            None => {
                // First page: the newest messages, returned oldest first.
                let mut latest = query
                    .order(chat_messages::created_at.desc())
                    .limit(limit)
                    .load::<ChatMessageEntity>(&mut conn)?;
                latest.reverse();
                latest
            }
        };

        Ok(results)
    }

    async fn thread_exists(&self, thread: ChatThreadKey) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let found = select(exists(
            chat_messages::table
                .filter(chat_messages::user_id.eq(thread.user_id))
                .filter(chat_messages::psychologist_id.eq(thread.psychologist_id)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(found)
    }

    async fn mark_read(&self, thread: ChatThreadKey, reader_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            chat_messages::table
                .filter(chat_messages::user_id.eq(thread.user_id))
                .filter(chat_messages::psychologist_id.eq(thread.psychologist_id))
                .filter(chat_messages::sender_id.ne(reader_id))
                .filter(chat_messages::is_read.eq(false)),
        )
        .set(chat_messages::is_read.eq(true))
        .execute(&mut conn)?;

        Ok(updated)
    }

    async fn list_thread_heads(
        &self,
        participant_id: Uuid,
        as_psychologist: bool,
    ) -> Result<Vec<ChatMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let messages = participant_messages(participant_id, as_psychologist)
            .select(ChatMessageEntity::as_select())
            .order(chat_messages::created_at.desc())
            .load::<ChatMessageEntity>(&mut conn)?;

        let mut seen = HashSet::new();
        let heads = messages
            .into_iter()
            .filter(|message| seen.insert((message.user_id, message.psychologist_id)))
            .collect();

        Ok(heads)
    }

    async fn count_unread(
        &self,
        participant_id: Uuid,
        as_psychologist: bool,
    ) -> Result<Vec<(ChatThreadKey, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = participant_messages(participant_id, as_psychologist)
            .filter(chat_messages::is_read.eq(false))
            .filter(chat_messages::sender_id.ne(participant_id))
            .select((chat_messages::user_id, chat_messages::psychologist_id))
            .load::<(Uuid, Uuid)>(&mut conn)?;

        let mut counts: Vec<(ChatThreadKey, i64)> = Vec::new();
        for (user_id, psychologist_id) in rows {
            let key = ChatThreadKey {
                user_id,
                psychologist_id,
            };
            match counts.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, count)) => *count += 1,
                None => counts.push((key, 1)),
            }
        }

        Ok(counts)
    }
}
