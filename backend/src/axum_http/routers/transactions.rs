use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::Utc;
use emocare::{
    domain::{
        repositories::{
            image_storage::ImageStorageClient, transactions::TransactionRepository,
            users::UserRepository, vouchers::VoucherRepository,
        },
        value_objects::{
            enums::user_roles::UserRole,
            transactions::{
                ListTransactionsFilter, ReviewTransactionModel, SubmitTransactionModel,
            },
        },
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                transactions::TransactionPostgres, users::UserPostgres, vouchers::VoucherPostgres,
            },
        },
        image_hosting::imgbb_client::ImgbbClient,
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::transactions::TransactionUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, image_storage: Arc<ImgbbClient>) -> Router {
    let transaction_repository = TransactionPostgres::new(Arc::clone(&db_pool));
    let voucher_repository = VoucherPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let transaction_usecase = TransactionUseCase::new(
        Arc::new(transaction_repository),
        Arc::new(voucher_repository),
        Arc::new(user_repository),
        image_storage,
    );

    Router::new()
        .route("/plans", get(list_plans))
        .route("/", get(list).post(submit))
        .route("/me", get(list_own))
        .route("/:transaction_id/review", patch(review))
        .with_state(Arc::new(transaction_usecase))
}

pub async fn list_plans<T, V, U, I>(
    State(transaction_usecase): State<Arc<TransactionUseCase<T, V, U, I>>>,
) -> impl IntoResponse
where
    T: TransactionRepository + Send + Sync + 'static,
    V: VoucherRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    Json(transaction_usecase.list_plans())
}

pub async fn submit<T, V, U, I>(
    State(transaction_usecase): State<Arc<TransactionUseCase<T, V, U, I>>>,
    auth: AuthUser,
    Json(submit_transaction_model): Json<SubmitTransactionModel>,
) -> Result<impl IntoResponse, AppError>
where
    T: TransactionRepository + Send + Sync + 'static,
    V: VoucherRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    auth.require(UserRole::User)?;
    let transaction = transaction_usecase
        .submit(auth.user_id, submit_transaction_model, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn list_own<T, V, U, I>(
    State(transaction_usecase): State<Arc<TransactionUseCase<T, V, U, I>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    T: TransactionRepository + Send + Sync + 'static,
    V: VoucherRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    let transactions = transaction_usecase.list_own(auth.user_id).await?;
    Ok(Json(transactions))
}

pub async fn list<T, V, U, I>(
    State(transaction_usecase): State<Arc<TransactionUseCase<T, V, U, I>>>,
    auth: AuthUser,
    Query(filter): Query<ListTransactionsFilter>,
) -> Result<impl IntoResponse, AppError>
where
    T: TransactionRepository + Send + Sync + 'static,
    V: VoucherRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let transactions = transaction_usecase.list(filter).await?;
    Ok(Json(transactions))
}

pub async fn review<T, V, U, I>(
    State(transaction_usecase): State<Arc<TransactionUseCase<T, V, U, I>>>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(review_transaction_model): Json<ReviewTransactionModel>,
) -> Result<impl IntoResponse, AppError>
where
    T: TransactionRepository + Send + Sync + 'static,
    V: VoucherRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let transaction = transaction_usecase
        .review(
            auth.user_id,
            transaction_id,
            review_transaction_model,
            Utc::now(),
        )
        .await?;
    Ok(Json(transaction))
}
