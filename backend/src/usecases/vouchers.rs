use std::sync::Arc;

use chrono::{DateTime, Utc};
use emocare::domain::{
    entities::vouchers::VoucherEntity,
    repositories::vouchers::VoucherRepository,
    value_objects::{
        transactions::GoldPlan,
        vouchers::{
            InsertVoucherModel, UpdateVoucherModel, VoucherModel, VoucherQuoteModel,
            VoucherRejection, check_discount, normalize_code,
        },
    },
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;

#[derive(Debug, Error)]
pub enum VoucherError {
    #[error("{0}")]
    Invalid(String),
    #[error("voucher code {0} already exists")]
    DuplicateCode(String),
    #[error("voucher not found")]
    NotFound,
    #[error(transparent)]
    Rejected(#[from] VoucherRejection),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl VoucherError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            VoucherError::Invalid(_) | VoucherError::Rejected(_) => StatusCode::BAD_REQUEST,
            VoucherError::DuplicateCode(_) => StatusCode::CONFLICT,
            VoucherError::NotFound => StatusCode::NOT_FOUND,
            VoucherError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VoucherError> for AppError {
    fn from(err: VoucherError) -> Self {
        match err {
            VoucherError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, VoucherError>;

fn to_model(entity: VoucherEntity) -> UseCaseResult<VoucherModel> {
    VoucherModel::try_from(entity).map_err(|err| VoucherError::Internal(err.into()))
}

pub struct VoucherUseCase<V>
where
    V: VoucherRepository + Send + Sync + 'static,
{
    voucher_repo: Arc<V>,
}

impl<V> VoucherUseCase<V>
where
    V: VoucherRepository + Send + Sync + 'static,
{
    pub fn new(voucher_repo: Arc<V>) -> Self {
        Self { voucher_repo }
    }

    pub async fn create(&self, model: InsertVoucherModel) -> UseCaseResult<VoucherModel> {
        model.check().map_err(VoucherError::Invalid)?;

        let code = normalize_code(&model.code);
        if self.voucher_repo.find_by_code(code.clone()).await?.is_some() {
            return Err(VoucherError::DuplicateCode(code));
        }

        let voucher_id = self.voucher_repo.create(model.to_entity()).await?;
        info!(%voucher_id, %code, "vouchers: voucher created");

        self.get(voucher_id).await
    }

    pub async fn list(&self) -> UseCaseResult<Vec<VoucherModel>> {
        self.voucher_repo
            .list()
            .await?
            .into_iter()
            .map(to_model)
            .collect()
    }

    pub async fn get(&self, voucher_id: Uuid) -> UseCaseResult<VoucherModel> {
        let voucher = self
            .voucher_repo
            .find_by_id(voucher_id)
            .await?
            .ok_or(VoucherError::NotFound)?;
        to_model(voucher)
    }

    pub async fn update(
        &self,
        voucher_id: Uuid,
        model: UpdateVoucherModel,
    ) -> UseCaseResult<VoucherModel> {
        if model.is_empty() {
            return Err(VoucherError::Invalid("nothing to update".to_string()));
        }

        let current = self.get(voucher_id).await?;
        check_discount(
            model.discount_type.unwrap_or(current.discount_type),
            model.discount_value.unwrap_or(current.discount_value),
        )
        .map_err(VoucherError::Invalid)?;
        let valid_from = model.valid_from.unwrap_or(current.valid_from);
        let valid_until = model.valid_until.unwrap_or(current.valid_until);
        if valid_until <= valid_from {
            return Err(VoucherError::Invalid(
                "valid_until must be after valid_from".to_string(),
            ));
        }
        if matches!(model.max_uses, Some(max) if max <= 0) {
            return Err(VoucherError::Invalid("max_uses must be positive".to_string()));
        }

        self.voucher_repo
            .update(voucher_id, model.to_entity())
            .await?;
        info!(%voucher_id, "vouchers: voucher updated");

        self.get(voucher_id).await
    }

    pub async fn delete(&self, voucher_id: Uuid) -> UseCaseResult<()> {
        if !self.voucher_repo.delete(voucher_id).await? {
            return Err(VoucherError::NotFound);
        }
        info!(%voucher_id, "vouchers: voucher deleted");
        Ok(())
    }

    /// Validates `code` at `now` and prices `plan` with it, without consuming a use.
    pub async fn quote(
        &self,
        code: &str,
        plan: GoldPlan,
        now: DateTime<Utc>,
    ) -> UseCaseResult<VoucherQuoteModel> {
        let voucher = self.find_valid(code, now).await?;
        let original_amount = plan.price();

        Ok(VoucherQuoteModel {
            code: voucher.code.clone(),
            original_amount,
            discounted_amount: voucher.apply(original_amount),
        })
    }

    pub async fn find_valid(&self, code: &str, now: DateTime<Utc>) -> UseCaseResult<VoucherModel> {
        let voucher = self
            .voucher_repo
            .find_by_code(normalize_code(code))
            .await?
            .ok_or(VoucherError::NotFound)?;
        let voucher = to_model(voucher)?;
        voucher.validate(now)?;
        Ok(voucher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use emocare::domain::{
        repositories::vouchers::MockVoucherRepository,
        value_objects::enums::discount_types::DiscountType,
    };

    fn stored(code: &str, discount_type: &str, value: i64) -> VoucherEntity {
        let now = Utc::now();
        VoucherEntity {
            id: Uuid::new_v4(),
            code: code.to_string(),
            description: None,
            discount_type: discount_type.to_string(),
            discount_value: value,
            max_uses: Some(100),
            used_count: 3,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            is_active: true,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_code_is_a_conflict() {
        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo
            .expect_find_by_code()
            .withf(|code| code == "TET2025")
            .returning(|_| Ok(Some(stored("TET2025", "percentage", 20))));
        voucher_repo.expect_create().never();

        let usecase = VoucherUseCase::new(Arc::new(voucher_repo));
        let now = Utc::now();
        let result = usecase
            .create(InsertVoucherModel {
                code: " tet2025 ".to_string(),
                description: None,
                discount_type: DiscountType::Percentage,
                discount_value: 20,
                max_uses: None,
                valid_from: now,
                valid_until: now + Duration::days(7),
            })
            .await;

        assert!(matches!(result, Err(VoucherError::DuplicateCode(_))));
    }

    #[tokio::test]
    async fn quote_applies_the_discount_to_the_plan_price() {
        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo
            .expect_find_by_code()
            .returning(|_| Ok(Some(stored("GIAM20", "percentage", 20))));

        let usecase = VoucherUseCase::new(Arc::new(voucher_repo));
        let quote = usecase
            .quote("giam20", GoldPlan::GoldMonthly, Utc::now())
            .await
            .unwrap();

        assert_eq!(quote.original_amount, 99_000);
        assert_eq!(quote.discounted_amount, 79_200);
    }

    #[tokio::test]
    async fn expired_voucher_cannot_be_quoted() {
        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo.expect_find_by_code().returning(|_| {
            let mut voucher = stored("CU", "fixed", 10_000);
            voucher.valid_until = Utc::now() - Duration::hours(1);
            Ok(Some(voucher))
        });

        let usecase = VoucherUseCase::new(Arc::new(voucher_repo));
        let result = usecase.quote("CU", GoldPlan::GoldYearly, Utc::now()).await;

        assert!(matches!(
            result,
            Err(VoucherError::Rejected(VoucherRejection::Expired))
        ));
    }

    #[tokio::test]
    async fn update_validates_merged_values() {
        let voucher = stored("GIAM20", "percentage", 20);
        let voucher_id = voucher.id;

        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(voucher.clone())));
        voucher_repo.expect_update().never();

        let usecase = VoucherUseCase::new(Arc::new(voucher_repo));
        let result = usecase
            .update(
                voucher_id,
                UpdateVoucherModel {
                    discount_value: Some(150),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(VoucherError::Invalid(_))));
    }

    #[tokio::test]
    async fn deleting_missing_voucher_is_not_found() {
        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo.expect_delete().returning(|_| Ok(false));

        let usecase = VoucherUseCase::new(Arc::new(voucher_repo));

        assert!(matches!(
            usecase.delete(Uuid::new_v4()).await,
            Err(VoucherError::NotFound)
        ));
    }
}
