use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use emocare::{
    domain::{
        repositories::{
            chat_messages::ChatMessageRepository, psychologists::PsychologistRepository,
            users::UserRepository,
        },
        value_objects::chat_messages::{ChatPageQuery, SendChatMessageModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            chat_messages::ChatMessagePostgres, psychologists::PsychologistPostgres,
            users::UserPostgres,
        },
    },
};
use serde_json::json;
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::chat_messages::ChatUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let chat_repository = ChatMessagePostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let psychologist_repository = PsychologistPostgres::new(Arc::clone(&db_pool));
    let chat_usecase = ChatUseCase::new(
        Arc::new(chat_repository),
        Arc::new(user_repository),
        Arc::new(psychologist_repository),
    );

    Router::new()
        .route("/threads", get(list_threads))
        .route(
            "/threads/:counterpart_id/messages",
            get(list_messages).post(send),
        )
        .route("/threads/:counterpart_id/read", post(mark_read))
        .with_state(Arc::new(chat_usecase))
}

pub async fn list_threads<C, U, P>(
    State(chat_usecase): State<Arc<ChatUseCase<C, U, P>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    C: ChatMessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    let threads = chat_usecase.list_threads(auth).await?;
    Ok(Json(threads))
}

pub async fn list_messages<C, U, P>(
    State(chat_usecase): State<Arc<ChatUseCase<C, U, P>>>,
    auth: AuthUser,
    Path(counterpart_id): Path<Uuid>,
    Query(query): Query<ChatPageQuery>,
) -> Result<impl IntoResponse, AppError>
where
    C: ChatMessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    let messages = chat_usecase
        .list_messages(auth, counterpart_id, query)
        .await?;
    Ok(Json(messages))
}

pub async fn send<C, U, P>(
    State(chat_usecase): State<Arc<ChatUseCase<C, U, P>>>,
    auth: AuthUser,
    Path(counterpart_id): Path<Uuid>,
    Json(send_chat_message_model): Json<SendChatMessageModel>,
) -> Result<impl IntoResponse, AppError>
where
    C: ChatMessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    let message = chat_usecase
        .send(auth, counterpart_id, send_chat_message_model, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn mark_read<C, U, P>(
    State(chat_usecase): State<Arc<ChatUseCase<C, U, P>>>,
    auth: AuthUser,
    Path(counterpart_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    C: ChatMessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    let updated = chat_usecase.mark_read(auth, counterpart_id).await?;
    Ok(Json(json!({ "updated": updated })))
}
