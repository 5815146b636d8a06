use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::chatbot_usages},
};
use domain::repositories::chatbot_usages::ChatbotUsageRepository;

pub struct ChatbotUsagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ChatbotUsagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ChatbotUsageRepository for ChatbotUsagePostgres {
    async fn increment(&self, user_id: Uuid, date: NaiveDate) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = insert_into(chatbot_usages::table)
            .values((
                chatbot_usages::user_id.eq(user_id),
                chatbot_usages::usage_date.eq(date),
                chatbot_usages::message_count.eq(1),
            ))
            .on_conflict((chatbot_usages::user_id, chatbot_usages::usage_date))
            .do_update()
            .set(chatbot_usages::message_count.eq(chatbot_usages::message_count + 1))
            .returning(chatbot_usages::message_count)
            .get_result::<i32>(&mut conn)?;

        Ok(count)
    }

    async fn get(&self, user_id: Uuid, date: NaiveDate) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = chatbot_usages::table
            .filter(chatbot_usages::user_id.eq(user_id))
            .filter(chatbot_usages::usage_date.eq(date))
            .select(chatbot_usages::message_count)
            .first::<i32>(&mut conn)
            .optional()?;

        Ok(count.unwrap_or(0))
    }
}
