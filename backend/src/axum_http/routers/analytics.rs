use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::Utc;
use emocare::{
    domain::{
        repositories::{
            bookings::BookingRepository, emotion_entries::EmotionEntryRepository,
            psychologists::PsychologistRepository, transactions::TransactionRepository,
            users::UserRepository,
        },
        value_objects::enums::user_roles::UserRole,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            bookings::BookingPostgres, emotion_entries::EmotionEntryPostgres,
            psychologists::PsychologistPostgres, transactions::TransactionPostgres,
            users::UserPostgres,
        },
    },
};

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{analytics::AnalyticsUseCase, calendar::LocalCalendar},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, calendar: LocalCalendar) -> Router {
    let analytics_usecase = AnalyticsUseCase::new(
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        Arc::new(BookingPostgres::new(Arc::clone(&db_pool))),
        Arc::new(TransactionPostgres::new(Arc::clone(&db_pool))),
        Arc::new(EmotionEntryPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PsychologistPostgres::new(Arc::clone(&db_pool))),
        calendar,
    );

    Router::new()
        .route("/overview", get(admin_overview))
        .route("/psychologist", get(psychologist_stats))
        .with_state(Arc::new(analytics_usecase))
}

pub async fn admin_overview<U, B, T, E, P>(
    State(analytics_usecase): State<Arc<AnalyticsUseCase<U, B, T, E, P>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
    E: EmotionEntryRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Admin)?;
    let overview = analytics_usecase.admin_overview(Utc::now()).await?;
    Ok(Json(overview))
}

pub async fn psychologist_stats<U, B, T, E, P>(
    State(analytics_usecase): State<Arc<AnalyticsUseCase<U, B, T, E, P>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
    E: EmotionEntryRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    auth.require(UserRole::Psychologist)?;
    let stats = analytics_usecase
        .psychologist_stats(auth.user_id, Utc::now())
        .await?;
    Ok(Json(stats))
}
