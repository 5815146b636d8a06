use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use emocare::{
    domain::{
        repositories::emotion_entries::EmotionEntryRepository,
        value_objects::emotions::{EmotionRangeQuery, LogEmotionModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::emotion_entries::EmotionEntryPostgres,
    },
};

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{calendar::LocalCalendar, emotions::EmotionUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, calendar: LocalCalendar) -> Router {
    let emotion_repository = EmotionEntryPostgres::new(Arc::clone(&db_pool));
    let emotion_usecase = EmotionUseCase::new(Arc::new(emotion_repository), calendar);

    Router::new()
        .route("/", get(list).post(log))
        .route("/summary", get(summary))
        .with_state(Arc::new(emotion_usecase))
}

pub async fn log<E>(
    State(emotion_usecase): State<Arc<EmotionUseCase<E>>>,
    auth: AuthUser,
    Json(log_emotion_model): Json<LogEmotionModel>,
) -> Result<impl IntoResponse, AppError>
where
    E: EmotionEntryRepository + Send + Sync + 'static,
{
    let entry = emotion_usecase
        .log(auth.user_id, log_emotion_model, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list<E>(
    State(emotion_usecase): State<Arc<EmotionUseCase<E>>>,
    auth: AuthUser,
    Query(range): Query<EmotionRangeQuery>,
) -> Result<impl IntoResponse, AppError>
where
    E: EmotionEntryRepository + Send + Sync + 'static,
{
    let entries = emotion_usecase.list(auth.user_id, range).await?;
    Ok(Json(entries))
}

pub async fn summary<E>(
    State(emotion_usecase): State<Arc<EmotionUseCase<E>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    E: EmotionEntryRepository + Send + Sync + 'static,
{
    let summary = emotion_usecase.summary(auth.user_id, Utc::now()).await?;
    Ok(Json(summary))
}
