use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use emocare::domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity},
    repositories::{
        bookings::BookingRepository, psychologists::PsychologistRepository,
        users::UserRepository,
    },
    value_objects::{
        bookings::{
            AvailabilityModel, BookingInsertOutcome, BookingModel, CreateBookingModel,
            ListBookingsFilter, MAX_DAYS_AHEAD, RateBookingModel,
        },
        enums::{booking_statuses::BookingStatus, user_roles::UserRole, user_tiers::UserTier},
        time_slots::{SlotSelectionError, slot_states, validate_block},
    },
};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::{calendar::LocalCalendar, tier_resolver::TierResolver};
use crate::{auth::AuthUser, axum_http::error_responses::AppError};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    Invalid(String),
    #[error("booking requires a gold membership")]
    GoldRequired,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("psychologist is not accepting bookings")]
    Unavailable,
    #[error("time slots already booked: {}", .0.join(", "))]
    SlotsTaken(Vec<String>),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BookingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BookingError::Invalid(_) => StatusCode::BAD_REQUEST,
            BookingError::GoldRequired | BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Unavailable | BookingError::SlotsTaken(_) | BookingError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

impl From<SlotSelectionError> for BookingError {
    fn from(err: SlotSelectionError) -> Self {
        match err {
            SlotSelectionError::AlreadyBooked(slot) => BookingError::SlotsTaken(vec![slot]),
            other => BookingError::Invalid(other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BookingError>;

pub struct BookingUseCase<B, U, P>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    psychologist_repo: Arc<P>,
    tier_resolver: TierResolver<U>,
    calendar: LocalCalendar,
}

impl<B, U, P> BookingUseCase<B, U, P>
where
    B: BookingRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PsychologistRepository + Send + Sync + 'static,
{
    pub fn new(
        booking_repo: Arc<B>,
        user_repo: Arc<U>,
        psychologist_repo: Arc<P>,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            booking_repo,
            psychologist_repo,
            tier_resolver: TierResolver::new(user_repo),
            calendar,
        }
    }

    pub async fn availability(
        &self,
        psychologist_id: Uuid,
        date: NaiveDate,
    ) -> UseCaseResult<AvailabilityModel> {
        if self
            .psychologist_repo
            .find_by_user_id(psychologist_id)
            .await?
            .is_none()
        {
            return Err(BookingError::NotFound("psychologist"));
        }

        let booked = self
            .booking_repo
            .list_booked_slots(psychologist_id, date)
            .await?;
        let booked_set: HashSet<String> = booked.iter().cloned().collect();

        Ok(AvailabilityModel {
            psychologist_id,
            date,
            slots: slot_states(&booked_set, &[]),
            booked,
        })
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        model: CreateBookingModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<BookingModel> {
        if self.tier_resolver.resolve_effective_tier(user_id, now).await? != UserTier::Gold {
            return Err(BookingError::GoldRequired);
        }

        let (profile, _) = self
            .psychologist_repo
            .find_by_user_id(model.psychologist_id)
            .await?
            .ok_or(BookingError::NotFound("psychologist"))?;
        if !profile.is_available {
            return Err(BookingError::Unavailable);
        }

        let today = self.calendar.today(now);
        if model.booking_date < today {
            return Err(BookingError::Invalid("booking date is in the past".to_string()));
        }
        if model.booking_date > today + Duration::days(MAX_DAYS_AHEAD) {
            return Err(BookingError::Invalid(format!(
                "bookings open at most {} days ahead",
                MAX_DAYS_AHEAD
            )));
        }

        let booked: HashSet<String> = self
            .booking_repo
            .list_booked_slots(model.psychologist_id, model.booking_date)
            .await?
            .into_iter()
            .collect();
        let time_slots = validate_block(&model.time_slots, &booked)?;

        let entity = InsertBookingEntity {
            id: Uuid::new_v4(),
            user_id,
            psychologist_id: model.psychologist_id,
            booking_date: model.booking_date,
            time_slots,
            status: BookingStatus::Pending.to_string(),
            note: model
                .note
                .as_ref()
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
            created_at: now,
            updated_at: now,
        };

        match self.booking_repo.create_checked(entity).await? {
            BookingInsertOutcome::Created(booking_id) => {
                info!(%user_id, %booking_id, psychologist_id = %model.psychologist_id, "bookings: booking created");
                self.load(booking_id).await.map(BookingModel::from)
            }
            BookingInsertOutcome::SlotsTaken(slots) => {
                warn!(%user_id, ?slots, "bookings: slots taken concurrently");
                Err(BookingError::SlotsTaken(slots))
            }
        }
    }

    pub async fn list_own(
        &self,
        user_id: Uuid,
        filter: ListBookingsFilter,
    ) -> UseCaseResult<Vec<BookingModel>> {
        let bookings = self.booking_repo.list_by_user(user_id, filter).await?;
        Ok(bookings.into_iter().map(BookingModel::from).collect())
    }

    pub async fn list_for_psychologist(
        &self,
        psychologist_id: Uuid,
        filter: ListBookingsFilter,
    ) -> UseCaseResult<Vec<BookingModel>> {
        let bookings = self
            .booking_repo
            .list_by_psychologist(psychologist_id, filter)
            .await?;
        Ok(bookings.into_iter().map(BookingModel::from).collect())
    }

    /// Owners may only cancel; the assigned psychologist confirms, rejects and completes.
    pub async fn update_status(
        &self,
        actor: AuthUser,
        booking_id: Uuid,
        next: BookingStatus,
        now: DateTime<Utc>,
    ) -> UseCaseResult<BookingModel> {
        let booking = self.load(booking_id).await?;
        let current = BookingStatus::from_str(&booking.status)
            .ok_or_else(|| anyhow::anyhow!("booking {} has unknown status", booking_id))?;

        let is_owner = actor.user_id == booking.user_id;
        let is_assigned = actor.role == UserRole::Psychologist
            && actor.user_id == booking.psychologist_id;

        let allowed = match next {
            BookingStatus::Cancelled => is_owner,
            BookingStatus::Confirmed | BookingStatus::Rejected | BookingStatus::Completed => {
                is_assigned
            }
            BookingStatus::Pending => false,
        };
        if !is_owner && !is_assigned {
            return Err(BookingError::NotFound("booking"));
        }
        if !allowed {
            return Err(BookingError::Forbidden(format!(
                "you cannot mark this booking as {}",
                next
            )));
        }

        if !current.can_transition_to(next) {
            return Err(BookingError::Conflict(format!(
                "booking cannot move from {} to {}",
                current, next
            )));
        }
        if next == BookingStatus::Completed && booking.booking_date > self.calendar.today(now) {
            return Err(BookingError::Conflict(
                "a booking can only be completed on or after its date".to_string(),
            ));
        }

        if !self
            .booking_repo
            .update_status(booking_id, current, next)
            .await?
        {
            return Err(BookingError::Conflict(
                "booking was changed by someone else".to_string(),
            ));
        }
        info!(actor_id = %actor.user_id, %booking_id, from = %current, to = %next, "bookings: status changed");

        self.load(booking_id).await.map(BookingModel::from)
    }

    pub async fn rate(
        &self,
        user_id: Uuid,
        booking_id: Uuid,
        model: RateBookingModel,
    ) -> UseCaseResult<BookingModel> {
        model.check().map_err(BookingError::Invalid)?;

        let booking = self.load(booking_id).await?;
        if booking.user_id != user_id {
            return Err(BookingError::NotFound("booking"));
        }
        if BookingStatus::from_str(&booking.status) != Some(BookingStatus::Completed) {
            return Err(BookingError::Conflict(
                "only completed bookings can be rated".to_string(),
            ));
        }

        let review = model
            .review
            .as_ref()
            .map(|review| review.trim().to_string())
            .filter(|review| !review.is_empty());
        if booking.rating.is_some() {
            return Err(already_rated());
        }
        let (rating_avg, rating_count) = self
            .booking_repo
            .set_rating(booking_id, model.rating, review)
            .await?
            .ok_or_else(already_rated)?;
        info!(%user_id, %booking_id, rating_avg, rating_count, "bookings: booking rated");

        self.load(booking_id).await.map(BookingModel::from)
    }

    async fn load(
        &self,
        booking_id: Uuid,
    ) -> UseCaseResult<BookingEntity> {
        self.booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound("booking"))
    }
}

fn already_rated() -> BookingError {
    BookingError::Conflict("booking is already rated".to_string())
}
