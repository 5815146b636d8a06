use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{
        psychologists::{PsychologistEntity, UpdatePsychologistEntity},
        users::UserEntity,
    },
    value_objects::users::{MIN_PASSWORD_LEN, check_display_name, check_email},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PsychologistModel {
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub specialization: String,
    pub bio: Option<String>,
    pub experience_years: i32,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub is_available: bool,
}

impl PsychologistModel {
    pub fn from_entities(profile: PsychologistEntity, user: UserEntity) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            specialization: profile.specialization,
            bio: profile.bio,
            experience_years: profile.experience_years,
            rating_avg: profile.rating_avg,
            rating_count: profile.rating_count,
            is_available: profile.is_available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePsychologistModel {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub specialization: String,
    pub bio: Option<String>,
    pub experience_years: i32,
}

impl CreatePsychologistModel {
    pub fn check(&self) -> Result<(), String> {
        check_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        check_display_name(&self.display_name)?;
        if self.specialization.trim().is_empty() {
            return Err("specialization is required".to_string());
        }
        if !(0..=70).contains(&self.experience_years) {
            return Err("experience_years must be between 0 and 70".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdatePsychologistModel {
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub is_available: Option<bool>,
}

impl UpdatePsychologistModel {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn check(&self) -> Result<(), String> {
        if matches!(&self.specialization, Some(s) if s.trim().is_empty()) {
            return Err("specialization cannot be empty".to_string());
        }
        if matches!(self.experience_years, Some(years) if !(0..=70).contains(&years)) {
            return Err("experience_years must be between 0 and 70".to_string());
        }
        Ok(())
    }

    pub fn to_entity(&self) -> UpdatePsychologistEntity {
        UpdatePsychologistEntity {
            specialization: self.specialization.as_ref().map(|s| s.trim().to_string()),
            bio: self.bio.clone(),
            experience_years: self.experience_years,
            is_available: self.is_available,
            updated_at: Some(chrono::Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListPsychologistsFilter {
    pub available_only: Option<bool>,
    pub specialization: Option<String>,
}

/// Running average after one more rating, rounded to two decimals.
pub fn updated_rating(current_avg: f64, current_count: i32, rating: i32) -> (f64, i32) {
    let count = current_count.max(0) + 1;
    let total = current_avg * f64::from(current_count.max(0)) + f64::from(rating);
    let avg = (total / f64::from(count) * 100.0).round() / 100.0;
    (avg, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rating_becomes_the_average() {
        assert_eq!(updated_rating(0.0, 0, 4), (4.0, 1));
    }

    #[test]
    fn running_average_includes_new_rating() {
        assert_eq!(updated_rating(4.0, 2, 5), (4.33, 3));
        assert_eq!(updated_rating(4.5, 4, 1), (3.8, 5));
    }
}
