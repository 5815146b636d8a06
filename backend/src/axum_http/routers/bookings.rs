use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::{NaiveDate, Utc};
use emocare::{
    domain::{
        repositories::{
            bookings::BookingRepository, psychologists::PsychologistRepository,
            users::UserRepository,
        },
        value_objects::{
            bookings::{
                CreateBookingModel, ListBookingsFilter, RateBookingModel, UpdateBookingStatusModel,
            },
            enums::user_roles::UserRole,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            bookings::BookingPostgres, psychologists::PsychologistPostgres, users::UserPostgres,
        },
    },
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{bookings::BookingUseCase, calendar::LocalCalendar},
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, calendar: LocalCalendar) -> Router {
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let psychologist_repository = PsychologistPostgres::new(Arc::clone(&db_pool));
    let booking_usecase = BookingUseCase::new(
        Arc::new(booking_repository),
        Arc::new(user_repository),
        Arc::new(psychologist_repository),
        calendar,
    );

    Router::new()
        .route("/", get(list_own).post(create))
        .route("/psychologist", get(list_for_psychologist))
        .route("/availability/:psychologist_id", get(availability))
        .route("/:booking_id/status", patch(update_status))
        .route("/:booking_id/rating", post(rate))
        .with_state(Arc::new(booking_usecase))
}

pub async fn availability<B, U, P>(
    State(booking_usecase): State<Arc<BookingUseCase<B, U, P>>>,
    _auth: AuthUser,
    Path(psychologist_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    let availability = booking_usecase
        .availability(psychologist_id, query.date)
        .await?;
    Ok(Json(availability))
}

pub async fn create<B, U, P>(
    State(booking_usecase): State<Arc<BookingUseCase<B, U, P>>>,
    auth: AuthUser,
    Json(create_booking_model): Json<CreateBookingModel>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    auth.require(UserRole::User)?;
    let booking = booking_usecase
        .create(auth.user_id, create_booking_model, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_own<B, U, P>(
    State(booking_usecase): State<Arc<BookingUseCase<B, U, P>>>,
    auth: AuthUser,
    Query(filter): Query<ListBookingsFilter>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    let bookings = booking_usecase.list_own(auth.user_id, filter).await?;
    Ok(Json(bookings))
}

pub async fn list_for_psychologist<B, U, P>(
    State(booking_usecase): State<Arc<BookingUseCase<B, U, P>>>,
    auth: AuthUser,
    Query(filter): Query<ListBookingsFilter>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Psychologist)?;
    let bookings = booking_usecase
        .list_for_psychologist(auth.user_id, filter)
        .await?;
    Ok(Json(bookings))
}

pub async fn update_status<B, U, P>(
    State(booking_usecase): State<Arc<BookingUseCase<B, U, P>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(update_status_model): Json<UpdateBookingStatusModel>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    let booking = booking_usecase
        .update_status(auth, booking_id, update_status_model.status, Utc::now())
        .await?;
    Ok(Json(booking))
}

pub async fn rate<B, U, P>(
    State(booking_usecase): State<Arc<BookingUseCase<B, U, P>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(rate_booking_model): Json<RateBookingModel>,
) -> Result<impl IntoResponse, AppError>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    auth.require(UserRole::User)?;
    let booking = booking_usecase
        .rate(auth.user_id, booking_id, rate_booking_model)
        .await?;
    Ok(Json(booking))
}
