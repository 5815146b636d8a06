use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::users::{UpdateUserProfileEntity, UserEntity},
    value_objects::enums::{user_roles::UserRole, user_tiers::UserTier},
};

pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_DISPLAY_NAME_CHARS: usize = 80;

/// Gold only counts while it has not expired; a missing expiry means gold without end date.
pub fn effective_tier(
    stored: UserTier,
    gold_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> UserTier {
    match (stored, gold_expires_at) {
        (UserTier::Gold, Some(expiry)) if expiry <= now => UserTier::Free,
        (tier, _) => tier,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub tier: UserTier,
    pub gold_expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    pub fn from_entity(entity: UserEntity, now: DateTime<Utc>) -> Self {
        let stored_tier = UserTier::from_str(&entity.tier);
        Self {
            id: entity.id,
            email: entity.email,
            display_name: entity.display_name,
            phone: entity.phone,
            avatar_url: entity.avatar_url,
            role: UserRole::from_str(&entity.role).unwrap_or_default(),
            tier: effective_tier(stored_tier, entity.gold_expires_at, now),
            gold_expires_at: entity.gold_expires_at,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterUserModel {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
    pub phone: Option<String>,
}

impl RegisterUserModel {
    pub fn check(&self) -> Result<(), String> {
        check_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        if self.password != self.confirm_password {
            return Err("password confirmation does not match".to_string());
        }
        check_display_name(&self.display_name)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthTokenModel {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserModel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateProfileModel {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

impl UpdateProfileModel {
    pub fn check(&self) -> Result<(), String> {
        if let Some(name) = &self.display_name {
            check_display_name(name)?;
        }
        if let Some(phone) = &self.phone {
            let digits = phone.trim().trim_start_matches('+');
            if digits.len() < 9 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit())
            {
                return Err("phone must contain 9-15 digits".to_string());
            }
        }
        Ok(())
    }

    pub fn to_entity(&self) -> UpdateUserProfileEntity {
        UpdateUserProfileEntity {
            display_name: self.display_name.as_ref().map(|name| name.trim().to_string()),
            phone: self.phone.as_ref().map(|phone| phone.trim().to_string()),
            avatar_url: None,
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListUsersFilter {
    pub role: Option<UserRole>,
    pub tier: Option<UserTier>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateRoleModel {
    pub role: UserRole,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn check_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err("email is invalid".to_string())
    }
}

pub fn check_display_name(name: &str) -> Result<(), String> {
    let count = name.trim().chars().count();
    if count == 0 {
        return Err("display name is required".to_string());
    }
    if count > MAX_DISPLAY_NAME_CHARS {
        return Err(format!(
            "display name must be at most {} characters",
            MAX_DISPLAY_NAME_CHARS
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn registration() -> RegisterUserModel {
        RegisterUserModel {
            email: "an@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            display_name: "An".to_string(),
            phone: None,
        }
    }

    #[test]
    fn expired_gold_counts_as_free() {
        let now = Utc::now();
        assert_eq!(
            effective_tier(UserTier::Gold, Some(now - Duration::seconds(1)), now),
            UserTier::Free
        );
        assert_eq!(
            effective_tier(UserTier::Gold, Some(now + Duration::days(1)), now),
            UserTier::Gold
        );
        assert_eq!(effective_tier(UserTier::Gold, None, now), UserTier::Gold);
        assert_eq!(effective_tier(UserTier::Free, None, now), UserTier::Free);
    }

    #[test]
    fn registration_checks_password_rules() {
        assert_eq!(registration().check(), Ok(()));

        let mut short = registration();
        short.password = "12345".to_string();
        short.confirm_password = "12345".to_string();
        assert!(short.check().is_err());

        let mut mismatch = registration();
        mismatch.confirm_password = "secret2".to_string();
        assert_eq!(
            mismatch.check(),
            Err("password confirmation does not match".to_string())
        );
    }

    #[test]
    fn registration_checks_email_and_name() {
        let mut bad_email = registration();
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.check().is_err());

        let mut blank_name = registration();
        blank_name.display_name = "   ".to_string();
        assert!(blank_name.check().is_err());
    }

    #[test]
    fn profile_update_validates_phone() {
        let ok = UpdateProfileModel {
            display_name: None,
            phone: Some("+84901234567".to_string()),
        };
        assert_eq!(ok.check(), Ok(()));

        let bad = UpdateProfileModel {
            display_name: None,
            phone: Some("09-01".to_string()),
        };
        assert!(bad.check().is_err());
    }
}
