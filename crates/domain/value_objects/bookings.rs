use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::bookings::BookingEntity,
    value_objects::{
        enums::booking_statuses::BookingStatus,
        time_slots::{SlotView, block_label},
    },
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
/// How far ahead a consultation can be booked.
pub const MAX_DAYS_AHEAD: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub psychologist_id: Uuid,
    pub booking_date: NaiveDate,
    pub time_slots: Vec<String>,
    pub time_label: Option<String>,
    pub status: BookingStatus,
    pub note: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingEntity> for BookingModel {
    fn from(entity: BookingEntity) -> Self {
        let time_label = block_label(&entity.time_slots);
        Self {
            id: entity.id,
            user_id: entity.user_id,
            psychologist_id: entity.psychologist_id,
            booking_date: entity.booking_date,
            time_slots: entity.time_slots,
            time_label,
            status: BookingStatus::from_str(&entity.status).unwrap_or_default(),
            note: entity.note,
            rating: entity.rating,
            review: entity.review,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateBookingModel {
    pub psychologist_id: Uuid,
    pub booking_date: NaiveDate,
    pub time_slots: Vec<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityModel {
    pub psychologist_id: Uuid,
    pub date: NaiveDate,
    pub booked: Vec<String>,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateBookingStatusModel {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateBookingModel {
    pub rating: i32,
    pub review: Option<String>,
}

impl RateBookingModel {
    pub fn check(&self) -> Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListBookingsFilter {
    pub status: Option<BookingStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

/// Outcome of inserting a booking while re-checking the psychologist's calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingInsertOutcome {
    Created(Uuid),
    SlotsTaken(Vec<String>),
}
