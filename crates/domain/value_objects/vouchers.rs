use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::vouchers::{InsertVoucherEntity, UpdateVoucherEntity, VoucherEntity},
    value_objects::enums::discount_types::DiscountType,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoucherRejection {
    #[error("voucher is inactive")]
    Inactive,
    #[error("voucher is not valid yet")]
    NotStarted,
    #[error("voucher has expired")]
    Expired,
    #[error("voucher usage limit reached")]
    Exhausted,
    #[error("voucher has an unknown discount type")]
    UnknownDiscountType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherModel {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<VoucherEntity> for VoucherModel {
    type Error = VoucherRejection;

    fn try_from(entity: VoucherEntity) -> Result<Self, Self::Error> {
        let discount_type = DiscountType::from_str(&entity.discount_type)
            .ok_or(VoucherRejection::UnknownDiscountType)?;

        Ok(Self {
            id: entity.id,
            code: entity.code,
            description: entity.description,
            discount_type,
            discount_value: entity.discount_value,
            max_uses: entity.max_uses,
            used_count: entity.used_count,
            valid_from: entity.valid_from,
            valid_until: entity.valid_until,
            is_active: entity.is_active,
            created_at: entity.created_at,
        })
    }
}

impl VoucherModel {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), VoucherRejection> {
        if !self.is_active {
            return Err(VoucherRejection::Inactive);
        }
        if now < self.valid_from {
            return Err(VoucherRejection::NotStarted);
        }
        if now > self.valid_until {
            return Err(VoucherRejection::Expired);
        }
        if let Some(max_uses) = self.max_uses {
            if self.used_count >= max_uses {
                return Err(VoucherRejection::Exhausted);
            }
        }
        Ok(())
    }

    /// Discounted price in VND, never below zero.
    pub fn apply(&self, amount: i64) -> i64 {
        let discount = match self.discount_type {
            DiscountType::Percentage => amount * self.discount_value.clamp(0, 100) / 100,
            DiscountType::Fixed => self.discount_value.max(0),
        };
        (amount - discount).max(0)
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsertVoucherModel {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_uses: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl InsertVoucherModel {
    pub fn check(&self) -> Result<(), String> {
        let code = normalize_code(&self.code);
        if code.is_empty() || code.len() > 32 {
            return Err("code must be 1-32 characters".to_string());
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err("code may only contain letters, digits, '-' and '_'".to_string());
        }
        check_discount(self.discount_type, self.discount_value)?;
        if self.valid_until <= self.valid_from {
            return Err("valid_until must be after valid_from".to_string());
        }
        if matches!(self.max_uses, Some(max) if max <= 0) {
            return Err("max_uses must be positive".to_string());
        }
        Ok(())
    }

    pub fn to_entity(&self) -> InsertVoucherEntity {
        InsertVoucherEntity {
            id: Uuid::new_v4(),
            code: normalize_code(&self.code),
            description: self.description.clone(),
            discount_type: self.discount_type.to_string(),
            discount_value: self.discount_value,
            max_uses: self.max_uses,
            used_count: 0,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateVoucherModel {
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl UpdateVoucherModel {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn to_entity(&self) -> UpdateVoucherEntity {
        UpdateVoucherEntity {
            description: self.description.clone(),
            discount_type: self.discount_type.map(|t| t.to_string()),
            discount_value: self.discount_value,
            max_uses: self.max_uses,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            is_active: self.is_active,
        }
    }
}

pub fn check_discount(discount_type: DiscountType, value: i64) -> Result<(), String> {
    match discount_type {
        DiscountType::Percentage if !(1..=100).contains(&value) => {
            Err("percentage discount must be between 1 and 100".to_string())
        }
        DiscountType::Fixed if value <= 0 => Err("fixed discount must be positive".to_string()),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherQuoteModel {
    pub code: String,
    pub original_amount: i64,
    pub discounted_amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn voucher(discount_type: DiscountType, value: i64) -> VoucherModel {
        let now = Utc::now();
        VoucherModel {
            id: Uuid::new_v4(),
            code: "WELCOME".to_string(),
            description: None,
            discount_type,
            discount_value: value,
            max_uses: Some(10),
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn percentage_discount_floors_to_whole_dong() {
        assert_eq!(voucher(DiscountType::Percentage, 15).apply(99_000), 84_150);
        assert_eq!(voucher(DiscountType::Percentage, 33).apply(100), 67);
    }

    #[test]
    fn fixed_discount_never_goes_negative() {
        assert_eq!(voucher(DiscountType::Fixed, 20_000).apply(99_000), 79_000);
        assert_eq!(voucher(DiscountType::Fixed, 200_000).apply(99_000), 0);
    }

    #[test]
    fn validity_window_and_cap_are_enforced() {
        let now = Utc::now();
        let mut v = voucher(DiscountType::Fixed, 1_000);
        assert_eq!(v.validate(now), Ok(()));

        v.used_count = 10;
        assert_eq!(v.validate(now), Err(VoucherRejection::Exhausted));

        v.used_count = 0;
        assert_eq!(
            v.validate(now + Duration::days(2)),
            Err(VoucherRejection::Expired)
        );
        assert_eq!(
            v.validate(now - Duration::days(2)),
            Err(VoucherRejection::NotStarted)
        );

        v.is_active = false;
        assert_eq!(v.validate(now), Err(VoucherRejection::Inactive));
    }

    #[test]
    fn uncapped_voucher_is_never_exhausted() {
        let mut v = voucher(DiscountType::Percentage, 10);
        v.max_uses = None;
        v.used_count = 10_000;
        assert_eq!(v.validate(Utc::now()), Ok(()));
    }

    #[test]
    fn insert_model_rejects_bad_input() {
        let now = Utc::now();
        let mut model = InsertVoucherModel {
            code: " summer-25 ".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: 25,
            max_uses: None,
            valid_from: now,
            valid_until: now + Duration::days(30),
        };
        assert_eq!(model.check(), Ok(()));
        assert_eq!(model.to_entity().code, "SUMMER-25");

        model.discount_value = 150;
        assert!(model.check().is_err());

        model.discount_value = 25;
        model.valid_until = now - Duration::days(1);
        assert!(model.check().is_err());

        model.valid_until = now + Duration::days(1);
        model.code = "mã giảm".to_string();
        assert!(model.check().is_err());
    }
}
