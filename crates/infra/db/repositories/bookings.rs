use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::{
    Connection, OptionalExtension, RunQueryDsl, dsl::count_star, insert_into, prelude::*, update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{bookings, psychologists},
};
use domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity},
    repositories::bookings::BookingRepository,
    value_objects::{
        bookings::{BookingInsertOutcome, ListBookingsFilter},
        enums::booking_statuses::BookingStatus,
        psychologists::updated_rating,
    },
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn slot_holding_statuses() -> Vec<&'static str> {
    BookingStatus::ALL
        .iter()
        .filter(|status| status.holds_slots())
        .map(|status| status.as_str())
        .collect()
}

fn apply_filter<'a>(
    mut query: bookings::BoxedQuery<'a, diesel::pg::Pg>,
    filter: &ListBookingsFilter,
) -> bookings::BoxedQuery<'a, diesel::pg::Pg> {
    if let Some(status) = filter.status {
        query = query.filter(bookings::status.eq(status.as_str()));
    }

    if let Some(from) = filter.from {
        query = query.filter(bookings::booking_date.ge(from));
    }

    if let Some(to) = filter.to {
        query = query.filter(bookings::booking_date.le(to));
    }

    query = query.order((bookings::booking_date.desc(), bookings::created_at.desc()));

    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }

    query
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn create_checked(&self, booking: InsertBookingEntity) -> Result<BookingInsertOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let holding = slot_holding_statuses();

        let outcome = conn.transaction::<BookingInsertOutcome, diesel::result::Error, _>(|tx| {
            // Row lock on the psychologist serialises concurrent bookings for the same calendar.
            psychologists::table
                .filter(psychologists::user_id.eq(booking.psychologist_id))
                .select(psychologists::user_id)
                .for_update()
                .first::<Uuid>(tx)?;

            let held = bookings::table
                .filter(bookings::psychologist_id.eq(booking.psychologist_id))
                .filter(bookings::booking_date.eq(booking.booking_date))
                .filter(bookings::status.eq_any(holding.clone()))
                .select(bookings::time_slots)
                .load::<Vec<String>>(tx)?;

            let mut taken: Vec<String> = held
                .into_iter()
                .flatten()
                .filter(|slot| booking.time_slots.contains(slot))
                .collect();

            if !taken.is_empty() {
                taken.sort();
                taken.dedup();
                return Ok(BookingInsertOutcome::SlotsTaken(taken));
            }

            let booking_id = insert_into(bookings::table)
                .values(&booking)
                .returning(bookings::id)
                .get_result::<Uuid>(tx)?;

            Ok(BookingInsertOutcome::Created(booking_id))
        })?;

        Ok(outcome)
    }

    async fn list_booked_slots(
        &self,
        psychologist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<String>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let held = bookings::table
            .filter(bookings::psychologist_id.eq(psychologist_id))
            .filter(bookings::booking_date.eq(date))
            .filter(bookings::status.eq_any(slot_holding_statuses()))
            .select(bookings::time_slots)
            .load::<Vec<String>>(&mut conn)?;

        let mut slots: Vec<String> = held.into_iter().flatten().collect();
        slots.sort();
        slots.dedup();

        Ok(slots)
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = bookings::table
            .filter(bookings::id.eq(booking_id))
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        filter: ListBookingsFilter,
    ) -> Result<Vec<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let query = bookings::table
            .filter(bookings::user_id.eq(user_id))
            .into_boxed();

        let results = apply_filter(query, &filter)
            .select(BookingEntity::as_select())
            .load::<BookingEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_by_psychologist(
        &self,
        psychologist_id: Uuid,
        filter: ListBookingsFilter,
    ) -> Result<Vec<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let query = bookings::table
            .filter(bookings::psychologist_id.eq(psychologist_id))
            .into_boxed();

        let results = apply_filter(query, &filter)
            .select(BookingEntity::as_select())
            .load::<BookingEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            bookings::table
                .filter(bookings::id.eq(booking_id))
                .filter(bookings::status.eq(from.as_str())),
        )
        .set((
            bookings::status.eq(to.as_str()),
            bookings::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn set_rating(
        &self,
        booking_id: Uuid,
        rating: i32,
        review: Option<String>,
    ) -> Result<Option<(f64, i32)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let aggregate = conn.transaction::<Option<(f64, i32)>, diesel::result::Error, _>(|tx| {
            let rated = update(
                bookings::table
                    .filter(bookings::id.eq(booking_id))
                    .filter(bookings::rating.is_null()),
            )
            .set((
                bookings::rating.eq(Some(rating)),
                bookings::review.eq(review),
                bookings::updated_at.eq(Utc::now()),
            ))
            .returning(bookings::psychologist_id)
            .get_result::<Uuid>(tx)
            .optional()?;

            let Some(psychologist_id) = rated else {
                return Ok(None);
            };

            let (current_avg, current_count) = psychologists::table
                .filter(psychologists::user_id.eq(psychologist_id))
                .select((psychologists::rating_avg, psychologists::rating_count))
                .for_update()
                .first::<(f64, i32)>(tx)?;

            let (avg, count) = updated_rating(current_avg, current_count, rating);

            update(psychologists::table.filter(psychologists::user_id.eq(psychologist_id)))
                .set((
                    psychologists::rating_avg.eq(avg),
                    psychologists::rating_count.eq(count),
                    psychologists::updated_at.eq(Utc::now()),
                ))
                .execute(tx)?;

            Ok(Some((avg, count)))
        })?;

        Ok(aggregate)
    }

    async fn count_by_status(&self, psychologist_id: Option<Uuid>) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = match psychologist_id {
            Some(psychologist_id) => bookings::table
                .filter(bookings::psychologist_id.eq(psychologist_id))
                .group_by(bookings::status)
                .select((bookings::status, count_star()))
                .load::<(String, i64)>(&mut conn)?,
            None => bookings::table
                .group_by(bookings::status)
                .select((bookings::status, count_star()))
                .load::<(String, i64)>(&mut conn)?,
        };

        Ok(results)
    }

    async fn count_upcoming(&self, psychologist_id: Uuid, from: NaiveDate) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = bookings::table
            .filter(bookings::psychologist_id.eq(psychologist_id))
            .filter(bookings::booking_date.ge(from))
            .filter(bookings::status.eq_any(slot_holding_statuses()))
            .select(count_star())
            .first::<i64>(&mut conn)?;

        Ok(total)
    }
}
