use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity},
    value_objects::{
        bookings::{BookingInsertOutcome, ListBookingsFilter},
        enums::booking_statuses::BookingStatus,
    },
};

#[automock]
#[async_trait]
pub trait BookingRepository {
    /// Inserts the booking unless one of its slots is already held for that psychologist and day.
    async fn create_checked(&self, booking: InsertBookingEntity) -> Result<BookingInsertOutcome>;
    async fn list_booked_slots(&self, psychologist_id: Uuid, date: NaiveDate)
    -> Result<Vec<String>>;
    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: ListBookingsFilter,
    ) -> Result<Vec<BookingEntity>>;
    async fn list_by_psychologist(
        &self,
        psychologist_id: Uuid,
        filter: ListBookingsFilter,
    ) -> Result<Vec<BookingEntity>>;
    /// Moves `from -> to`; returns false when the booking was no longer in `from`.
    async fn update_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool>;
    /// Stores the rating once and folds it into the psychologist's aggregate in the same database
    /// transaction. Returns the new (average, count), or None when the booking was already rated.
    async fn set_rating(
        &self,
        booking_id: Uuid,
        rating: i32,
        review: Option<String>,
    ) -> Result<Option<(f64, i32)>>;
    async fn count_by_status(&self, psychologist_id: Option<Uuid>) -> Result<Vec<(String, i64)>>;
    async fn count_upcoming(&self, psychologist_id: Uuid, from: NaiveDate) -> Result<i64>;
}
