use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use emocare::domain::{
    repositories::{
        bookings::BookingRepository, emotion_entries::EmotionEntryRepository,
        psychologists::PsychologistRepository, transactions::TransactionRepository,
        users::UserRepository,
    },
    value_objects::{
        analytics::{
            AdminOverviewModel, PsychologistStatsModel, count_shares, daily_series,
            level_distribution,
        },
        enums::{
            booking_statuses::BookingStatus, transaction_statuses::TransactionStatus,
            user_roles::UserRole, user_tiers::UserTier,
        },
    },
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::calendar::LocalCalendar;
use crate::axum_http::error_responses::AppError;

const NEW_USER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("psychologist not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnalyticsError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AnalyticsError::NotFound => StatusCode::NOT_FOUND,
            AnalyticsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AnalyticsError>;

/// Orders `counts` by `keys`, adding zero rows for keys the database did not return.
fn complete_counts(keys: &[&str], counts: Vec<(String, i64)>) -> Vec<(String, i64)> {
    keys.iter()
        .map(|key| {
            let count = counts
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, count)| *count)
                .sum();
            (key.to_string(), count)
        })
        .collect()
}

fn count_of(counts: &[(String, i64)], key: &str) -> i64 {
    counts
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, count)| *count)
        .sum()
}

pub struct AnalyticsUseCase<U, B, T, E, P>
where
    U: UserRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
    E: EmotionEntryRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    booking_repo: Arc<B>,
    transaction_repo: Arc<T>,
    emotion_repo: Arc<E>,
    psychologist_repo: Arc<P>,
    calendar: LocalCalendar,
}

impl<U, B, T, E, P> AnalyticsUseCase<U, B, T, E, P>
where
    U: UserRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
    E: EmotionEntryRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        booking_repo: Arc<B>,
        transaction_repo: Arc<T>,
        emotion_repo: Arc<E>,
        psychologist_repo: Arc<P>,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            user_repo,
            booking_repo,
            transaction_repo,
            emotion_repo,
            psychologist_repo,
            calendar,
        }
    }

    pub async fn admin_overview(&self, now: DateTime<Utc>) -> UseCaseResult<AdminOverviewModel> {
        let roles = [UserRole::User, UserRole::Psychologist, UserRole::Admin].map(|r| r.as_str());
        let users_by_role = complete_counts(&roles, self.user_repo.count_by_role().await?);
        let total_users: i64 = users_by_role.iter().map(|(_, count)| count).sum();

        let tiers = [UserTier::Free, UserTier::Gold].map(|t| t.as_str());
        let users_by_tier = complete_counts(
            &tiers,
            self.user_repo.count_by_effective_tier(now).await?,
        );

        let statuses = BookingStatus::ALL.map(|s| s.as_str());
        let bookings_by_status =
            complete_counts(&statuses, self.booking_repo.count_by_status(None).await?);

        let revenue = self.transaction_repo.sum_approved_amount().await?;
        let pending_transactions = count_of(
            &self.transaction_repo.count_by_status().await?,
            TransactionStatus::Pending.as_str(),
        );

        let emotion_distribution = level_distribution(&self.emotion_repo.count_by_level(None).await?);

        let today = self.calendar.today(now);
        let from = today - Duration::days(NEW_USER_WINDOW_DAYS - 1);
        let mut per_day = BTreeMap::new();
        for created_at in self
            .user_repo
            .list_created_at_since(now - Duration::days(NEW_USER_WINDOW_DAYS))
            .await?
        {
            *per_day.entry(self.calendar.today(created_at)).or_insert(0_i64) += 1;
        }
        let per_day: Vec<_> = per_day.into_iter().collect();

        debug!(total_users, revenue, "analytics: overview computed");

        Ok(AdminOverviewModel {
            total_users,
            users_by_role: count_shares(users_by_role),
            users_by_tier: count_shares(users_by_tier),
            bookings_by_status: count_shares(bookings_by_status),
            revenue,
            pending_transactions,
            emotion_distribution,
            new_users_daily: daily_series(&per_day, from, today),
        })
    }

    pub async fn psychologist_stats(
        &self,
        psychologist_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<PsychologistStatsModel> {
        let (profile, _) = self
            .psychologist_repo
            .find_by_user_id(psychologist_id)
            .await?
            .ok_or(AnalyticsError::NotFound)?;

        let counts = self
            .booking_repo
            .count_by_status(Some(psychologist_id))
            .await?;
        let upcoming = self
            .booking_repo
            .count_upcoming(psychologist_id, self.calendar.today(now))
            .await?;

        Ok(PsychologistStatsModel {
            total_bookings: counts.iter().map(|(_, count)| count).sum(),
            pending: count_of(&counts, BookingStatus::Pending.as_str()),
            upcoming,
            completed: count_of(&counts, BookingStatus::Completed.as_str()),
            rating_avg: profile.rating_avg,
            rating_count: profile.rating_count,
        })
    }
}
