use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use emocare::{
    domain::{
        repositories::users::UserRepository,
        value_objects::users::{LoginModel, RegisterUserModel},
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
};

use crate::{auth::JwtKeys, axum_http::error_responses::AppError, usecases::auth::AuthUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>, jwt_keys: Arc<JwtKeys>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let auth_usecase = AuthUseCase::new(Arc::new(user_repository), jwt_keys);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(Arc::new(auth_usecase))
}

pub async fn register<T>(
    State(auth_usecase): State<Arc<AuthUseCase<T>>>,
    Json(register_user_model): Json<RegisterUserModel>,
) -> Result<impl IntoResponse, AppError>
where
    T: UserRepository + Send + Sync + 'static,
{
    let token = auth_usecase.register(register_user_model).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn login<T>(
    State(auth_usecase): State<Arc<AuthUseCase<T>>>,
    Json(login_model): Json<LoginModel>,
) -> Result<impl IntoResponse, AppError>
where
    T: UserRepository + Send + Sync + 'static,
{
    let token = auth_usecase.login(login_model).await?;
    Ok(Json(token))
}
