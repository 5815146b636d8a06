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
        repositories::vouchers::VoucherRepository,
        value_objects::{
            enums::user_roles::UserRole,
            transactions::GoldPlan,
            vouchers::{InsertVoucherModel, UpdateVoucherModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::vouchers::VoucherPostgres,
    },
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::vouchers::VoucherUseCase};

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub code: String,
    pub plan: GoldPlan,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let voucher_repository = VoucherPostgres::new(Arc::clone(&db_pool));
    let voucher_usecase = VoucherUseCase::new(Arc::new(voucher_repository));

    Router::new()
        .route("/", get(list).post(create))
        .route("/quote", get(quote))
        .route("/:voucher_id", patch(update).delete(remove))
        .with_state(Arc::new(voucher_usecase))
}

pub async fn create<V>(
    State(voucher_usecase): State<Arc<VoucherUseCase<V>>>,
    auth: AuthUser,
    Json(insert_voucher_model): Json<InsertVoucherModel>,
) -> Result<impl IntoResponse, AppError>
where
    V: VoucherRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let voucher = voucher_usecase.create(insert_voucher_model).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

pub async fn list<V>(
    State(voucher_usecase): State<Arc<VoucherUseCase<V>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    V: VoucherRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let vouchers = voucher_usecase.list().await?;
    Ok(Json(vouchers))
}

pub async fn update<V>(
    State(voucher_usecase): State<Arc<VoucherUseCase<V>>>,
    auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
    Json(update_voucher_model): Json<UpdateVoucherModel>,
) -> Result<impl IntoResponse, AppError>
where
    V: VoucherRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let voucher = voucher_usecase
        .update(voucher_id, update_voucher_model)
        .await?;
    Ok(Json(voucher))
}

pub async fn remove<V>(
    State(voucher_usecase): State<Arc<VoucherUseCase<V>>>,
    auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    V: VoucherRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    voucher_usecase.delete(voucher_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn quote<V>(
    State(voucher_usecase): State<Arc<VoucherUseCase<V>>>,
    _auth: AuthUser,
    Query(query): Query<QuoteQuery>,
) -> Result<impl IntoResponse, AppError>
where
    V: VoucherRepository + Send + Sync + 'static,
{
    let quote = voucher_usecase
        .quote(&query.code, query.plan, Utc::now())
        .await?;
    Ok(Json(quote))
}
