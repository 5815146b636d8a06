use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use emocare::domain::{
    entities::chat_messages::ChatMessageEntity,
    repositories::{
        chat_messages::ChatMessageRepository, psychologists::PsychologistRepository,
        users::UserRepository,
    },
    value_objects::{
        chat_messages::{
            ChatMessageModel, ChatPageQuery, ChatThreadKey, ChatThreadModel, SendChatMessageModel,
        },
        enums::{user_roles::UserRole, user_tiers::UserTier},
    },
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::tier_resolver::TierResolver;
use crate::{auth::AuthUser, axum_http::error_responses::AppError};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Invalid(String),
    #[error("chatting with psychologists requires a gold membership")]
    GoldRequired,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ChatError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ChatError::Invalid(_) => StatusCode::BAD_REQUEST,
            ChatError::GoldRequired | ChatError::Forbidden(_) => StatusCode::FORBIDDEN,
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ChatError>;

/// Direct messaging between gold users and psychologists.
pub struct ChatUseCase<C, U, P>
where
    C: ChatMessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    chat_repo: Arc<C>,
    user_repo: Arc<U>,
    psychologist_repo: Arc<P>,
    tier_resolver: TierResolver<U>,
}

impl<C, U, P> ChatUseCase<C, U, P>
where
    C: ChatMessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    pub fn new(chat_repo: Arc<C>, user_repo: Arc<U>, psychologist_repo: Arc<P>) -> Self {
        Self {
            chat_repo,
            tier_resolver: TierResolver::new(Arc::clone(&user_repo)),
            user_repo,
            psychologist_repo,
        }
    }

    pub async fn send(
        &self,
        actor: AuthUser,
        counterpart_id: Uuid,
        model: SendChatMessageModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<ChatMessageModel> {
        model.check().map_err(ChatError::Invalid)?;
        let thread = thread_key(actor, counterpart_id)?;

        match actor.role {
            UserRole::User => {
                if self.tier_resolver.resolve_effective_tier(actor.user_id, now).await?
                    != UserTier::Gold
                {
                    return Err(ChatError::GoldRequired);
                }
                if self
                    .psychologist_repo
                    .find_by_user_id(counterpart_id)
                    .await?
                    .is_none()
                {
                    return Err(ChatError::NotFound("psychologist"));
                }
            }
            _ => {
                if !self.chat_repo.thread_exists(thread).await? {
                    return Err(ChatError::NotFound("conversation"));
                }
            }
        }

        let message = self
            .chat_repo
            .insert(model.to_entity(thread, actor.user_id))
            .await?;
        info!(
            sender_id = %actor.user_id,
            user_id = %thread.user_id,
            psychologist_id = %thread.psychologist_id,
            "chat: message sent"
        );

        Ok(ChatMessageModel::from(message))
    }

    pub async fn list_messages(
        &self,
        actor: AuthUser,
        counterpart_id: Uuid,
        query: ChatPageQuery,
    ) -> UseCaseResult<Vec<ChatMessageModel>> {
        let thread = thread_key(actor, counterpart_id)?;

        let messages = self
            .chat_repo
            .list_thread(thread, query.after, query.limit_or_default())
            .await?;

        Ok(messages.into_iter().map(ChatMessageModel::from).collect())
    }

    pub async fn mark_read(&self, actor: AuthUser, counterpart_id: Uuid) -> UseCaseResult<usize> {
        let thread = thread_key(actor, counterpart_id)?;
        let updated = self.chat_repo.mark_read(thread, actor.user_id).await?;
        Ok(updated)
    }

    pub async fn list_threads(&self, actor: AuthUser) -> UseCaseResult<Vec<ChatThreadModel>> {
        let as_psychologist = match actor.role {
            UserRole::User => false,
            UserRole::Psychologist => true,
            UserRole::Admin => return Err(admin_forbidden()),
        };

        let heads = self
            .chat_repo
            .list_thread_heads(actor.user_id, as_psychologist)
            .await?;
        let unread: HashMap<ChatThreadKey, i64> = self
            .chat_repo
            .count_unread(actor.user_id, as_psychologist)
            .await?
            .into_iter()
            .collect();

        let counterpart_of = |message: &ChatMessageEntity| {
            if as_psychologist {
                message.user_id
            } else {
                message.psychologist_id
            }
        };
        let counterpart_ids: Vec<Uuid> = heads.iter().map(counterpart_of).collect();
        let counterparts: HashMap<Uuid, _> = self
            .user_repo
            .find_by_ids(counterpart_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(heads
            .into_iter()
            .map(|head| {
                let key = ChatThreadKey {
                    user_id: head.user_id,
                    psychologist_id: head.psychologist_id,
                };
                let counterpart = counterparts.get(&counterpart_of(&head));
                ChatThreadModel {
                    user_id: head.user_id,
                    psychologist_id: head.psychologist_id,
                    counterpart_name: counterpart
                        .map(|user| user.display_name.clone())
                        .unwrap_or_default(),
                    counterpart_avatar_url: counterpart.and_then(|user| user.avatar_url.clone()),
                    last_message: head.content,
                    last_message_at: head.created_at,
                    unread_count: unread.get(&key).copied().unwrap_or(0),
                }
            })
            .collect())
    }
}

fn admin_forbidden() -> ChatError {
    ChatError::Forbidden("admins do not take part in direct chats".to_string())
}

fn thread_key(actor: AuthUser, counterpart_id: Uuid) -> UseCaseResult<ChatThreadKey> {
    match actor.role {
        UserRole::User => Ok(ChatThreadKey {
            user_id: actor.user_id,
            psychologist_id: counterpart_id,
        }),
        UserRole::Psychologist => Ok(ChatThreadKey {
            user_id: counterpart_id,
            psychologist_id: actor.user_id,
        }),
        UserRole::Admin => Err(admin_forbidden()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{gold_user, sample_psychologist, sample_user};
    use emocare::domain::repositories::{
        chat_messages::MockChatMessageRepository, psychologists::MockPsychologistRepository,
        users::MockUserRepository,
    };

    fn echo_insert(repo: &mut MockChatMessageRepository) {
        repo.expect_insert().returning(|message| {
            Ok(ChatMessageEntity {
                id: message.id,
                user_id: message.user_id,
                psychologist_id: message.psychologist_id,
                sender_id: message.sender_id,
                content: message.content,
                is_read: message.is_read,
                created_at: message.created_at,
            })
        });
    }

    fn message(user_id: Uuid, psychologist_id: Uuid, sender_id: Uuid, content: &str) -> ChatMessageEntity {
        ChatMessageEntity {
            id: Uuid::new_v4(),
            user_id,
            psychologist_id,
            sender_id,
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn free_user_cannot_message_psychologists() {
        let user = sample_user();
        let user_id = user.id;
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let usecase = ChatUseCase::new(
            Arc::new(MockChatMessageRepository::new()),
            Arc::new(user_repo),
            Arc::new(MockPsychologistRepository::new()),
        );

        let result = usecase
            .send(
                AuthUser {
                    user_id,
                    role: UserRole::User,
                },
                Uuid::new_v4(),
                SendChatMessageModel {
                    content: "Chào bác sĩ".to_string(),
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(ChatError::GoldRequired)));
    }

    #[tokio::test]
    async fn gold_user_opens_a_thread() {
        let user = gold_user();
        let user_id = user.id;
        let (profile, psychologist) = sample_psychologist();
        let psychologist_id = profile.user_id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let mut psychologist_repo = MockPsychologistRepository::new();
        psychologist_repo
            .expect_find_by_user_id()
            .returning(move |_| Ok(Some((profile.clone(), psychologist.clone()))));
        let mut chat_repo = MockChatMessageRepository::new();
        echo_insert(&mut chat_repo);

        let usecase = ChatUseCase::new(
            Arc::new(chat_repo),
            Arc::new(user_repo),
            Arc::new(psychologist_repo),
        );

        let sent = usecase
            .send(
                AuthUser {
                    user_id,
                    role: UserRole::User,
                },
                psychologist_id,
                SendChatMessageModel {
                    content: "  Chào bác sĩ ".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(sent.user_id, user_id);
        assert_eq!(sent.psychologist_id, psychologist_id);
        assert_eq!(sent.content, "Chào bác sĩ");
    }

    #[tokio::test]
    async fn psychologist_can_only_reply_to_existing_threads() {
        let mut chat_repo = MockChatMessageRepository::new();
        chat_repo.expect_thread_exists().returning(|_| Ok(false));
        chat_repo.expect_insert().never();

        let usecase = ChatUseCase::new(
            Arc::new(chat_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPsychologistRepository::new()),
        );

        let result = usecase
            .send(
                AuthUser {
                    user_id: Uuid::new_v4(),
                    role: UserRole::Psychologist,
                },
                Uuid::new_v4(),
                SendChatMessageModel {
                    content: "Chào bạn".to_string(),
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn threads_carry_counterpart_and_unread_count() {
        let psychologist_id = Uuid::new_v4();
        let user = sample_user();
        let user_id = user.id;

        let mut chat_repo = MockChatMessageRepository::new();
        chat_repo.expect_list_thread_heads().returning(move |_, _| {
            Ok(vec![message(user_id, psychologist_id, user_id, "Em cảm ơn ạ")])
        });
        chat_repo.expect_count_unread().returning(move |_, _| {
            Ok(vec![(
                ChatThreadKey {
                    user_id,
                    psychologist_id,
                },
                2,
            )])
        });
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![user.clone()]));

        let usecase = ChatUseCase::new(
            Arc::new(chat_repo),
            Arc::new(user_repo),
            Arc::new(MockPsychologistRepository::new()),
        );

        let threads = usecase
            .list_threads(AuthUser {
                user_id: psychologist_id,
                role: UserRole::Psychologist,
            })
            .await
            .unwrap();

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].counterpart_name, "An");
        assert_eq!(threads[0].unread_count, 2);
        assert_eq!(threads[0].last_message, "Em cảm ơn ạ");
    }

    #[tokio::test]
    async fn admins_are_kept_out_of_direct_chat() {
        let usecase = ChatUseCase::new(
            Arc::new(MockChatMessageRepository::new()),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPsychologistRepository::new()),
        );
        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        };

        assert!(matches!(
            usecase.list_threads(admin).await,
            Err(ChatError::Forbidden(_))
        ));
    }
}
