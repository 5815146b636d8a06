use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use emocare::{
    domain::{
        repositories::diary_entries::DiaryEntryRepository,
        value_objects::diaries::{CreateDiaryEntryModel, UpdateDiaryEntryModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::diary_entries::DiaryEntryPostgres,
    },
};
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::diaries::DiaryUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let diary_repository = DiaryEntryPostgres::new(Arc::clone(&db_pool));
    let diary_usecase = DiaryUseCase::new(Arc::new(diary_repository));

    Router::new()
        .route("/", get(list).post(create))
        .route("/:entry_id", get(get_entry).patch(update).delete(remove))
        .with_state(Arc::new(diary_usecase))
}

pub async fn create<D>(
    State(diary_usecase): State<Arc<DiaryUseCase<D>>>,
    auth: AuthUser,
    Json(create_diary_entry_model): Json<CreateDiaryEntryModel>,
) -> Result<impl IntoResponse, AppError>
where
    D: DiaryEntryRepository + Send + Sync + 'static,
{
    let entry = diary_usecase
        .create(auth.user_id, create_diary_entry_model)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list<D>(
    State(diary_usecase): State<Arc<DiaryUseCase<D>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    D: DiaryEntryRepository + Send + Sync + 'static,
{
    let entries = diary_usecase.list(auth.user_id).await?;
    Ok(Json(entries))
}

pub async fn get_entry<D>(
    State(diary_usecase): State<Arc<DiaryUseCase<D>>>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    D: DiaryEntryRepository + Send + Sync + 'static,
{
    let entry = diary_usecase.get(auth.user_id, entry_id).await?;
    Ok(Json(entry))
}

pub async fn update<D>(
    State(diary_usecase): State<Arc<DiaryUseCase<D>>>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
    Json(update_diary_entry_model): Json<UpdateDiaryEntryModel>,
) -> Result<impl IntoResponse, AppError>
where
    D: DiaryEntryRepository + Send + Sync + 'static,
{
    let entry = diary_usecase
        .update(auth.user_id, entry_id, update_diary_entry_model)
        .await?;
    Ok(Json(entry))
}

pub async fn remove<D>(
    State(diary_usecase): State<Arc<DiaryUseCase<D>>>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    D: DiaryEntryRepository + Send + Sync + 'static,
{
    diary_usecase.delete(auth.user_id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
