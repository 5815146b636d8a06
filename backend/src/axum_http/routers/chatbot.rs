use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::Utc;
use emocare::{
    domain::{
        repositories::{
            ai_gateway::GenerativeAiClient, chatbot_usages::ChatbotUsageRepository,
            conversations::ConversationRepository, users::UserRepository,
        },
        value_objects::chatbot::SendChatbotMessageModel,
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                chatbot_usages::ChatbotUsagePostgres, conversations::ConversationPostgres,
                users::UserPostgres,
            },
        },
        gemini::gemini_client::GeminiClient,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{calendar::LocalCalendar, chatbot::ChatbotUseCase},
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    ai_client: Arc<GeminiClient>,
    free_daily_limit: i32,
    calendar: LocalCalendar,
) -> Router {
    let conversation_repository = ConversationPostgres::new(Arc::clone(&db_pool));
    let usage_repository = ChatbotUsagePostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let chatbot_usecase = ChatbotUseCase::new(
        Arc::new(conversation_repository),
        Arc::new(usage_repository),
        Arc::new(user_repository),
        ai_client,
        free_daily_limit,
        calendar,
    );

    Router::new()
        .route("/messages", post(send_message))
        .route("/usage", get(usage_today))
        .route("/conversations", get(list_conversations))
        .route("/conversations/:conversation_id", delete(delete_conversation))
        .route("/conversations/:conversation_id/messages", get(list_messages))
        .with_state(Arc::new(chatbot_usecase))
}

pub async fn send_message<C, Us, U, A>(
    State(chatbot_usecase): State<Arc<ChatbotUseCase<C, Us, U, A>>>,
    auth: AuthUser,
    Json(send_chatbot_message_model): Json<SendChatbotMessageModel>,
) -> Result<impl IntoResponse, AppError>
where
    C: ConversationRepository + Send + Sync + 'static,
    Us: ChatbotUsageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: GenerativeAiClient + Send + Sync + 'static,
{
    let reply = chatbot_usecase
        .send_message(auth.user_id, send_chatbot_message_model, Utc::now())
        .await?;
    Ok(Json(reply))
}

pub async fn usage_today<C, Us, U, A>(
    State(chatbot_usecase): State<Arc<ChatbotUseCase<C, Us, U, A>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    C: ConversationRepository + Send + Sync + 'static,
    Us: ChatbotUsageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: GenerativeAiClient + Send + Sync + 'static,
{
    let usage = chatbot_usecase.usage_today(auth.user_id, Utc::now()).await?;
    Ok(Json(usage))
}

pub async fn list_conversations<C, Us, U, A>(
    State(chatbot_usecase): State<Arc<ChatbotUseCase<C, Us, U, A>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    C: ConversationRepository + Send + Sync + 'static,
    Us: ChatbotUsageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: GenerativeAiClient + Send + Sync + 'static,
{
    let conversations = chatbot_usecase.list_conversations(auth.user_id).await?;
    Ok(Json(conversations))
}

pub async fn list_messages<C, Us, U, A>(
    State(chatbot_usecase): State<Arc<ChatbotUseCase<C, Us, U, A>>>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    C: ConversationRepository + Send + Sync + 'static,
    Us: ChatbotUsageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: GenerativeAiClient + Send + Sync + 'static,
{
    let messages = chatbot_usecase
        .list_messages(auth.user_id, conversation_id)
        .await?;
    Ok(Json(messages))
}

pub async fn delete_conversation<C, Us, U, A>(
    State(chatbot_usecase): State<Arc<ChatbotUseCase<C, Us, U, A>>>,
    auth: AuthUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    C: ConversationRepository + Send + Sync + 'static,
    Us: ChatbotUsageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    A: GenerativeAiClient + Send + Sync + 'static,
{
    chatbot_usecase
        .delete_conversation(auth.user_id, conversation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
