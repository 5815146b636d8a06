use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use emocare::{
    domain::{
        repositories::{image_storage::ImageStorageClient, users::UserRepository},
        value_objects::{images::ImageUploadModel, users::UpdateProfileModel},
    },
    infra::{
        db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
        image_hosting::imgbb_client::ImgbbClient,
    },
};

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::profiles::ProfileUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>, image_storage: Arc<ImgbbClient>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let profile_usecase = ProfileUseCase::new(Arc::new(user_repository), image_storage);

    Router::new()
        .route("/me", get(get_profile).patch(update_profile))
        .route("/me/avatar", post(upload_avatar))
        .with_state(Arc::new(profile_usecase))
}

pub async fn get_profile<U, I>(
    State(profile_usecase): State<Arc<ProfileUseCase<U, I>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    let profile = profile_usecase.get_profile(auth.user_id).await?;
    Ok(Json(profile))
}

pub async fn update_profile<U, I>(
    State(profile_usecase): State<Arc<ProfileUseCase<U, I>>>,
    auth: AuthUser,
    Json(update_profile_model): Json<UpdateProfileModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    let profile = profile_usecase
        .update_profile(auth.user_id, update_profile_model)
        .await?;
    Ok(Json(profile))
}

pub async fn upload_avatar<U, I>(
    State(profile_usecase): State<Arc<ProfileUseCase<U, I>>>,
    auth: AuthUser,
    Json(image_upload_model): Json<ImageUploadModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    let profile = profile_usecase
        .upload_avatar(auth.user_id, image_upload_model)
        .await?;
    Ok(Json(profile))
}
