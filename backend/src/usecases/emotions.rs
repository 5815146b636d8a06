use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use emocare::domain::{
    repositories::emotion_entries::EmotionEntryRepository,
    value_objects::{
        analytics::level_distribution,
        emotions::{
            EmotionEntryModel, EmotionRangeQuery, EmotionSummaryModel, LogEmotionModel,
            average_level,
        },
        streaks::{current_streak, has_logged_today, longest_streak},
    },
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::calendar::LocalCalendar;
use crate::axum_http::error_responses::AppError;

/// Window loaded for the rolling averages.
const AVERAGE_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum EmotionError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EmotionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            EmotionError::Invalid(_) => StatusCode::BAD_REQUEST,
            EmotionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EmotionError> for AppError {
    fn from(err: EmotionError) -> Self {
        match err {
            EmotionError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, EmotionError>;

pub struct EmotionUseCase<E>
where
    E: EmotionEntryRepository + Send + Sync + 'static,
{
    emotion_repo: Arc<E>,
    calendar: LocalCalendar,
}

impl<E> EmotionUseCase<E>
where
    E: EmotionEntryRepository + Send + Sync + 'static,
{
    pub fn new(emotion_repo: Arc<E>, calendar: LocalCalendar) -> Self {
        Self {
            emotion_repo,
            calendar,
        }
    }

    pub async fn log(
        &self,
        user_id: Uuid,
        model: LogEmotionModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<EmotionEntryModel> {
        model.check().map_err(EmotionError::Invalid)?;

        let entry_date = self.calendar.today(now);
        let entry = self
            .emotion_repo
            .insert(model.to_entity(user_id, entry_date))
            .await?;
        info!(%user_id, level = entry.level, %entry_date, "emotions: entry logged");

        Ok(EmotionEntryModel::from(entry))
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        range: EmotionRangeQuery,
    ) -> UseCaseResult<Vec<EmotionEntryModel>> {
        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return Err(EmotionError::Invalid("from must not be after to".to_string()));
            }
        }

        let entries = self
            .emotion_repo
            .list_by_user(user_id, range.from, range.to)
            .await?;

        Ok(entries.into_iter().map(EmotionEntryModel::from).collect())
    }

    pub async fn summary(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<EmotionSummaryModel> {
        let today = self.calendar.today(now);

        let dates: HashSet<_> = self
            .emotion_repo
            .list_entry_dates(user_id)
            .await?
            .into_iter()
            .collect();

        let recent = self
            .emotion_repo
            .list_by_user(
                user_id,
                Some(today - Duration::days(AVERAGE_WINDOW_DAYS - 1)),
                Some(today),
            )
            .await?;

        let counts = self.emotion_repo.count_by_level(Some(user_id)).await?;
        let total_entries = counts.iter().map(|(_, count)| *count).sum::<i64>().max(0) as usize;

        Ok(EmotionSummaryModel {
            current_streak: current_streak(&dates, today),
            longest_streak: longest_streak(&dates),
            logged_today: has_logged_today(&dates, today),
            total_entries,
            average_7_days: average_level(&recent, today, 7),
            average_30_days: average_level(&recent, today, AVERAGE_WINDOW_DAYS),
            distribution: level_distribution(&counts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use emocare::domain::{
        entities::emotion_entries::EmotionEntryEntity,
        repositories::emotion_entries::MockEmotionEntryRepository,
    };

    fn vietnam() -> LocalCalendar {
        LocalCalendar::from_offset_hours(7).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn entry(level: i32, entry_date: NaiveDate) -> EmotionEntryEntity {
        EmotionEntryEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            level,
            note: None,
            entry_date,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn log_uses_the_local_calendar_day() {
        // 18:30 UTC on the 9th is already the 10th in Vietnam.
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 18, 30, 0).unwrap();

        let mut emotion_repo = MockEmotionEntryRepository::new();
        emotion_repo
            .expect_insert()
            .withf(|entry| entry.entry_date == NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            .returning(|entry| {
                Ok(EmotionEntryEntity {
                    id: entry.id,
                    user_id: entry.user_id,
                    level: entry.level,
                    note: entry.note,
                    entry_date: entry.entry_date,
                    created_at: entry.created_at,
                })
            });

        let usecase = EmotionUseCase::new(Arc::new(emotion_repo), vietnam());
        let logged = usecase
            .log(
                Uuid::new_v4(),
                LogEmotionModel {
                    level: 4,
                    note: Some("  đi dạo  ".to_string()),
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(logged.entry_date, date(10));
        assert_eq!(logged.note.as_deref(), Some("đi dạo"));
    }

    #[tokio::test]
    async fn out_of_range_level_is_rejected() {
        let usecase = EmotionUseCase::new(Arc::new(MockEmotionEntryRepository::new()), vietnam());

        let result = usecase
            .log(
                Uuid::new_v4(),
                LogEmotionModel {
                    level: 6,
                    note: None,
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(EmotionError::Invalid(_))));
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let usecase = EmotionUseCase::new(Arc::new(MockEmotionEntryRepository::new()), vietnam());

        let result = usecase
            .list(
                Uuid::new_v4(),
                EmotionRangeQuery {
                    from: Some(date(10)),
                    to: Some(date(1)),
                },
            )
            .await;

        assert!(matches!(result, Err(EmotionError::Invalid(_))));
    }

    #[tokio::test]
    async fn summary_combines_streaks_averages_and_distribution() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap();

        let mut emotion_repo = MockEmotionEntryRepository::new();
        emotion_repo
            .expect_list_entry_dates()
            .returning(|_| Ok(vec![date(10), date(9), date(8), date(5), date(4)]));
        emotion_repo.expect_list_by_user().returning(|_, _, _| {
            Ok(vec![
                entry(4, date(4)),
                entry(2, date(5)),
                entry(3, date(8)),
                entry(5, date(9)),
                entry(4, date(10)),
            ])
        });
        emotion_repo
            .expect_count_by_level()
            .returning(|_| Ok(vec![(2, 1), (3, 1), (4, 2), (5, 1)]));

        let usecase = EmotionUseCase::new(Arc::new(emotion_repo), vietnam());
        let summary = usecase.summary(Uuid::new_v4(), now).await.unwrap();

        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.longest_streak, 3);
        assert!(summary.logged_today);
        assert_eq!(summary.total_entries, 5);
        assert_eq!(summary.average_7_days, Some(3.6));
        assert_eq!(summary.distribution.len(), 5);
        assert_eq!(summary.distribution[3].count, 2);
    }
}
