use std::fmt::Display;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::transactions::TransactionEntity,
    value_objects::enums::transaction_statuses::TransactionStatus,
};

/// Gold packages sold through bank transfer with a payment proof.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoldPlan {
    GoldMonthly,
    GoldQuarterly,
    GoldYearly,
}

impl GoldPlan {
    pub const ALL: [GoldPlan; 3] = [
        GoldPlan::GoldMonthly,
        GoldPlan::GoldQuarterly,
        GoldPlan::GoldYearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoldPlan::GoldMonthly => "gold_monthly",
            GoldPlan::GoldQuarterly => "gold_quarterly",
            GoldPlan::GoldYearly => "gold_yearly",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "gold_monthly" => Some(GoldPlan::GoldMonthly),
            "gold_quarterly" => Some(GoldPlan::GoldQuarterly),
            "gold_yearly" => Some(GoldPlan::GoldYearly),
            _ => None,
        }
    }

    /// Price in VND.
    pub fn price(&self) -> i64 {
        match self {
            GoldPlan::GoldMonthly => 99_000,
            GoldPlan::GoldQuarterly => 269_000,
            GoldPlan::GoldYearly => 999_000,
        }
    }

    pub fn duration_days(&self) -> i64 {
        match self {
            GoldPlan::GoldMonthly => 30,
            GoldPlan::GoldQuarterly => 90,
            GoldPlan::GoldYearly => 365,
        }
    }

    /// New expiry after purchase: remaining gold time is kept, lapsed time is not.
    pub fn extend_expiry(
        &self,
        current_expiry: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let base = match current_expiry {
            Some(expiry) if expiry > now => expiry,
            _ => now,
        };
        base + Duration::days(self.duration_days())
    }
}

impl Display for GoldPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoldPlanModel {
    pub plan: GoldPlan,
    pub price: i64,
    pub duration_days: i64,
}

impl From<GoldPlan> for GoldPlanModel {
    fn from(plan: GoldPlan) -> Self {
        Self {
            plan,
            price: plan.price(),
            duration_days: plan.duration_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub original_amount: i64,
    pub amount: i64,
    pub voucher_id: Option<Uuid>,
    pub proof_image_url: String,
    pub status: TransactionStatus,
    pub note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionEntity> for TransactionModel {
    fn from(entity: TransactionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan: entity.plan,
            original_amount: entity.original_amount,
            amount: entity.amount,
            voucher_id: entity.voucher_id,
            proof_image_url: entity.proof_image_url,
            status: TransactionStatus::from_str(&entity.status).unwrap_or_default(),
            note: entity.note,
            reviewed_by: entity.reviewed_by,
            reviewed_at: entity.reviewed_at,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitTransactionModel {
    pub plan: GoldPlan,
    pub voucher_code: Option<String>,
    pub proof: super::images::ImageUploadModel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn status(&self) -> TransactionStatus {
        match self {
            ReviewDecision::Approve => TransactionStatus::Approved,
            ReviewDecision::Reject => TransactionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewTransactionModel {
    pub decision: ReviewDecision,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListTransactionsFilter {
    pub status: Option<TransactionStatus>,
    pub limit: Option<i64>,
}

/// Outcome of storing a submission together with its voucher use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInsertOutcome {
    Created(Uuid),
    VoucherExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_gold_is_extended_from_its_expiry() {
        let now = Utc::now();
        let expiry = now + Duration::days(10);
        assert_eq!(
            GoldPlan::GoldMonthly.extend_expiry(Some(expiry), now),
            expiry + Duration::days(30)
        );
    }

    #[test]
    fn lapsed_or_missing_gold_starts_from_now() {
        let now = Utc::now();
        assert_eq!(
            GoldPlan::GoldYearly.extend_expiry(Some(now - Duration::days(3)), now),
            now + Duration::days(365)
        );
        assert_eq!(
            GoldPlan::GoldQuarterly.extend_expiry(None, now),
            now + Duration::days(90)
        );
    }

    #[test]
    fn plan_codes_round_trip() {
        for plan in GoldPlan::ALL {
            assert_eq!(GoldPlan::from_str(plan.as_str()), Some(plan));
        }
    }
}
