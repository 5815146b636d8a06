use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use emocare::{
    domain::{
        repositories::{psychologists::PsychologistRepository, users::UserRepository},
        value_objects::{
            enums::user_roles::UserRole,
            psychologists::{
                CreatePsychologistModel, ListPsychologistsFilter, UpdatePsychologistModel,
            },
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{psychologists::PsychologistPostgres, users::UserPostgres},
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::psychologists::PsychologistUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let psychologist_repository = PsychologistPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let psychologist_usecase =
        PsychologistUseCase::new(Arc::new(psychologist_repository), Arc::new(user_repository));

    Router::new()
        .route("/", get(list).post(create))
        .route("/me", patch(update_own))
        .route("/:psychologist_id", get(get_one))
        .with_state(Arc::new(psychologist_usecase))
}

pub async fn list<P, U>(
    State(psychologist_usecase): State<Arc<PsychologistUseCase<P, U>>>,
    Query(filter): Query<ListPsychologistsFilter>,
) -> Result<impl IntoResponse, AppError>
where
    P: PsychologistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let psychologists = psychologist_usecase.list(filter).await?;
    Ok(Json(psychologists))
}

pub async fn get_one<P, U>(
    State(psychologist_usecase): State<Arc<PsychologistUseCase<P, U>>>,
    Path(psychologist_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    P: PsychologistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let psychologist = psychologist_usecase.get(psychologist_id).await?;
    Ok(Json(psychologist))
}

pub async fn create<P, U>(
    State(psychologist_usecase): State<Arc<PsychologistUseCase<P, U>>>,
    auth: AuthUser,
    Json(create_psychologist_model): Json<CreatePsychologistModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PsychologistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let psychologist = psychologist_usecase
        .create(auth.user_id, create_psychologist_model)
        .await?;
    Ok((StatusCode::CREATED, Json(psychologist)))
}

pub async fn update_own<P, U>(
    State(psychologist_usecase): State<Arc<PsychologistUseCase<P, U>>>,
    auth: AuthUser,
    Json(update_psychologist_model): Json<UpdatePsychologistModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PsychologistRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Psychologist)?;
    let psychologist = psychologist_usecase
        .update_own(auth.user_id, update_psychologist_model)
        .await?;
    Ok(Json(psychologist))
}
