use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use emocare::domain::{
    entities::conversations::{
        ConversationEntity, InsertConversationEntity, InsertConversationMessageEntity,
    },
    repositories::{
        ai_gateway::GenerativeAiClient, chatbot_usages::ChatbotUsageRepository,
        conversations::ConversationRepository, users::UserRepository,
    },
    value_objects::{
        chat_messages::MAX_MESSAGE_CHARS,
        chatbot::{
            ChatTurn, ChatbotReplyModel, ChatbotUsageModel, ConversationMessageModel,
            ConversationModel, GenerationRequest, HISTORY_WINDOW, MAX_CONVERSATIONS_PER_USER,
            MAX_MESSAGES_PER_CONVERSATION, ReplySource, SendChatbotMessageModel,
            SuggestionTopic, conversation_title, detect_crisis, render_suggestions,
            route_suggestions, select_system_prompt, trim_history,
        },
        enums::{message_roles::MessageRole, user_tiers::UserTier},
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{calendar::LocalCalendar, tier_resolver::TierResolver};
use crate::axum_http::error_responses::AppError;

#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("{0}")]
    Invalid(String),
    #[error("conversation not found")]
    NotFound,
    #[error("daily limit of {0} chatbot messages reached; upgrade to Gold for unlimited chat")]
    LimitReached(i32),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ChatbotError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ChatbotError::Invalid(_) => StatusCode::BAD_REQUEST,
            ChatbotError::NotFound => StatusCode::NOT_FOUND,
            ChatbotError::LimitReached(_) => StatusCode::TOO_MANY_REQUESTS,
            ChatbotError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChatbotError> for AppError {
    fn from(err: ChatbotError) -> Self {
        match err {
            ChatbotError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ChatbotError>;

struct Reply {
    text: String,
    source: ReplySource,
    topic: Option<SuggestionTopic>,
}

fn suggestions_reply(message: &str, source: ReplySource) -> Reply {
    let bundle = route_suggestions(message);
    Reply {
        text: render_suggestions(bundle),
        source,
        topic: Some(bundle.topic),
    }
}

pub struct ChatbotUseCase<C, Us, U, A>
where
    C: ConversationRepository + Send + Sync + 'static,
    Us: ChatbotUsageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: GenerativeAiClient + Send + Sync + 'static,
{
    conversation_repo: Arc<C>,
    usage_repo: Arc<Us>,
    tier_resolver: TierResolver<U>,
    ai_client: Arc<A>,
    free_daily_limit: i32,
    calendar: LocalCalendar,
}

impl<C, Us, U, A> ChatbotUseCase<C, Us, U, A>
where
    C: ConversationRepository + Send + Sync + 'static,
    Us: ChatbotUsageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: GenerativeAiClient + Send + Sync + 'static,
{
    pub fn new(
        conversation_repo: Arc<C>,
        usage_repo: Arc<Us>,
        user_repo: Arc<U>,
        ai_client: Arc<A>,
        free_daily_limit: i32,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            conversation_repo,
            usage_repo,
            tier_resolver: TierResolver::new(user_repo),
            ai_client,
            free_daily_limit,
            calendar,
        }
    }

    pub async fn send_message(
        &self,
        user_id: Uuid,
        model: SendChatbotMessageModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ChatbotReplyModel> {
        let message = model.message.trim().to_string();
        let length = message.chars().count();
        if length == 0 {
            return Err(ChatbotError::Invalid("message is empty".to_string()));
        }
        if length > MAX_MESSAGE_CHARS {
            return Err(ChatbotError::Invalid(format!(
                "message must be at most {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let tier = self.tier_resolver.resolve_effective_tier(user_id, now).await?;
        let today = self.calendar.today(now);
        if tier == UserTier::Free {
            let used = self.usage_repo.get(user_id, today).await?;
            if used >= self.free_daily_limit {
                info!(%user_id, used, "chatbot: free daily limit reached");
                return Err(ChatbotError::LimitReached(self.free_daily_limit));
            }
        }

        let conversation = match model.conversation_id {
            Some(conversation_id) => self.owned_conversation(user_id, conversation_id).await?,
            None => {
                self.conversation_repo
                    .create(InsertConversationEntity {
                        id: Uuid::new_v4(),
                        user_id,
                        title: conversation_title(&message),
                        created_at: now,
                        updated_at: now,
                    })
                    .await?
            }
        };

        let reply = match tier {
            UserTier::Free => suggestions_reply(&message, ReplySource::Suggestions),
            UserTier::Gold => self.ai_reply(user_id, conversation.id, &message).await?,
        };

        let replied_at = now + Duration::milliseconds(1);
        self.conversation_repo
            .insert_message(InsertConversationMessageEntity {
                id: Uuid::new_v4(),
                conversation_id: conversation.id,
                role: MessageRole::User.to_string(),
                content: message.clone(),
                created_at: now,
            })
            .await?;
        self.conversation_repo
            .insert_message(InsertConversationMessageEntity {
                id: Uuid::new_v4(),
                conversation_id: conversation.id,
                role: MessageRole::Assistant.to_string(),
                content: reply.text.clone(),
                created_at: replied_at,
            })
            .await?;
        self.conversation_repo
            .touch(conversation.id, replied_at)
            .await?;

        let evicted_messages = self
            .conversation_repo
            .evict_old_messages(conversation.id, MAX_MESSAGES_PER_CONVERSATION)
            .await?;
        let evicted_conversations = self
            .conversation_repo
            .evict_old_conversations(user_id, MAX_CONVERSATIONS_PER_USER)
            .await?;
        if evicted_messages > 0 || evicted_conversations > 0 {
            debug!(
                %user_id,
                evicted_messages,
                evicted_conversations,
                "chatbot: history trimmed"
            );
        }

        let used = self.usage_repo.increment(user_id, today).await?;
        let remaining_today = match tier {
            UserTier::Free => Some((self.free_daily_limit - used).max(0)),
            UserTier::Gold => None,
        };
        info!(%user_id, conversation_id = %conversation.id, %tier, source = ?reply.source, "chatbot: reply sent");

        Ok(ChatbotReplyModel {
            conversation_id: conversation.id,
            reply: reply.text,
            source: reply.source,
            topic: reply.topic,
            crisis: detect_crisis(&message),
            remaining_today,
        })
    }

    /// Falls back to canned suggestions when the model call fails.
    async fn ai_reply(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        message: &str,
    ) -> UseCaseResult<Reply> {
        let stored = self
            .conversation_repo
            .list_recent_messages(conversation_id, HISTORY_WINDOW as i64)
            .await?;
        let turns: Vec<ChatTurn> = stored
            .into_iter()
            .map(|entry| ChatTurn {
                role: MessageRole::from_str(&entry.role),
                content: entry.content,
            })
            .collect();

        let prompt = select_system_prompt(message, UserTier::Gold);
        let request = GenerationRequest {
            system_instruction: prompt.text(),
            history: trim_history(&turns, HISTORY_WINDOW).to_vec(),
            message: message.to_string(),
        };

        match self.ai_client.generate(request).await {
            Ok(text) => Ok(Reply {
                text,
                source: ReplySource::Ai,
                topic: None,
            }),
            Err(err) => {
                warn!(%user_id, %conversation_id, error = ?err, ?prompt, "chatbot: ai gateway failed, using suggestions");
                Ok(suggestions_reply(message, ReplySource::Fallback))
            }
        }
    }

    pub async fn list_conversations(&self, user_id: Uuid) -> UseCaseResult<Vec<ConversationModel>> {
        let conversations = self.conversation_repo.list_by_user(user_id).await?;
        Ok(conversations
            .into_iter()
            .map(ConversationModel::from)
            .collect())
    }

    pub async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> UseCaseResult<Vec<ConversationMessageModel>> {
        self.owned_conversation(user_id, conversation_id).await?;

        let messages = self
            .conversation_repo
            .list_recent_messages(conversation_id, MAX_MESSAGES_PER_CONVERSATION)
            .await?;
        Ok(messages
            .into_iter()
            .map(ConversationMessageModel::from)
            .collect())
    }

    pub async fn delete_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> UseCaseResult<()> {
        self.owned_conversation(user_id, conversation_id).await?;

        self.conversation_repo.delete(conversation_id).await?;
        info!(%user_id, %conversation_id, "chatbot: conversation deleted");

        Ok(())
    }

    pub async fn usage_today(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ChatbotUsageModel> {
        let tier = self.tier_resolver.resolve_effective_tier(user_id, now).await?;
        let used_today = self
            .usage_repo
            .get(user_id, self.calendar.today(now))
            .await?;

        Ok(ChatbotUsageModel {
            tier,
            used_today,
            daily_limit: match tier {
                UserTier::Free => Some(self.free_daily_limit),
                UserTier::Gold => None,
            },
        })
    }

    async fn owned_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> UseCaseResult<ConversationEntity> {
        match self.conversation_repo.find_by_id(conversation_id).await? {
            Some(conversation) if conversation.user_id == user_id => Ok(conversation),
            _ => Err(ChatbotError::NotFound),
        }
    }
}
