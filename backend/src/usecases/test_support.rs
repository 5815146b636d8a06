//! Fixtures shared by the use case tests.

use chrono::{NaiveDate, Utc};
use emocare::domain::entities::{
    bookings::BookingEntity, psychologists::PsychologistEntity, users::UserEntity,
};
use uuid::Uuid;

pub fn sample_user() -> UserEntity {
    let now = Utc::now();
    UserEntity {
        id: Uuid::new_v4(),
        email: "an@example.com".to_string(),
        password_hash: String::new(),
        display_name: "An".to_string(),
        phone: None,
        avatar_url: None,
        role: "user".to_string(),
        tier: "free".to_string(),
        gold_expires_at: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn gold_user() -> UserEntity {
    UserEntity {
        tier: "gold".to_string(),
        gold_expires_at: Some(Utc::now() + chrono::Duration::days(30)),
        ..sample_user()
    }
}

pub fn sample_psychologist() -> (PsychologistEntity, UserEntity) {
    let now = Utc::now();
    let user = UserEntity {
        email: "bs.minh@example.com".to_string(),
        display_name: "ThS. Minh".to_string(),
        role: "psychologist".to_string(),
        ..sample_user()
    };
    let profile = PsychologistEntity {
        user_id: user.id,
        specialization: "Lo âu".to_string(),
        bio: None,
        experience_years: 5,
        rating_avg: 4.5,
        rating_count: 2,
        is_available: true,
        created_at: now,
        updated_at: now,
    };
    (profile, user)
}

pub fn sample_booking(user_id: Uuid, psychologist_id: Uuid, status: &str) -> BookingEntity {
    let now = Utc::now();
    BookingEntity {
        id: Uuid::new_v4(),
        user_id,
        psychologist_id,
        booking_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default(),
        time_slots: vec!["09:00".to_string(), "10:00".to_string()],
        status: status.to_string(),
        note: None,
        rating: None,
        review: None,
        created_at: now,
        updated_at: now,
    }
}
