use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
};
use emocare::{
    domain::{
        repositories::{image_storage::ImageStorageClient, users::UserRepository},
        value_objects::{
            enums::user_roles::UserRole,
            users::{ListUsersFilter, UpdateRoleModel},
        },
    },
    infra::{
        db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
        image_hosting::imgbb_client::ImgbbClient,
    },
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::profiles::ProfileUseCase};

#[derive(Debug, Deserialize)]
pub struct SetActiveModel {
    pub is_active: bool,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, image_storage: Arc<ImgbbClient>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let profile_usecase = ProfileUseCase::new(Arc::new(user_repository), image_storage);

    Router::new()
        .route("/", get(list_users))
        .route("/:user_id/role", patch(update_role))
        .route("/:user_id/active", patch(set_active))
        .with_state(Arc::new(profile_usecase))
}

pub async fn list_users<U, I>(
    State(profile_usecase): State<Arc<ProfileUseCase<U, I>>>,
    auth: AuthUser,
    Query(filter): Query<ListUsersFilter>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let users = profile_usecase.list_users(filter).await?;
    Ok(Json(users))
}

pub async fn update_role<U, I>(
    State(profile_usecase): State<Arc<ProfileUseCase<U, I>>>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(update_role_model): Json<UpdateRoleModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let user = profile_usecase
        .update_role(auth.user_id, user_id, update_role_model.role)
        .await?;
    Ok(Json(user))
}

pub async fn set_active<U, I>(
    State(profile_usecase): State<Arc<ProfileUseCase<U, I>>>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(set_active_model): Json<SetActiveModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let user = profile_usecase
        .set_active(auth.user_id, user_id, set_active_model.is_active)
        .await?;
    Ok(Json(user))
}
