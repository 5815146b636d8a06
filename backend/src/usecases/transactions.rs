use std::sync::Arc;

use chrono::{DateTime, Utc};
use emocare::domain::{
    entities::transactions::InsertTransactionEntity,
    repositories::{
        image_storage::ImageStorageClient, transactions::TransactionRepository,
        users::UserRepository, vouchers::VoucherRepository,
    },
    value_objects::{
        enums::transaction_statuses::TransactionStatus,
        images::ImageRejection,
        transactions::{
            GoldPlan, GoldPlanModel, ListTransactionsFilter, ReviewDecision,
            ReviewTransactionModel, SubmitTransactionModel, TransactionInsertOutcome,
            TransactionModel,
        },
        vouchers::{VoucherModel, VoucherRejection, normalize_code},
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Image(#[from] ImageRejection),
    #[error(transparent)]
    Voucher(#[from] VoucherRejection),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl TransactionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            TransactionError::Image(_) | TransactionError::Voucher(_) => StatusCode::BAD_REQUEST,
            TransactionError::NotFound(_) => StatusCode::NOT_FOUND,
            TransactionError::Conflict(_) => StatusCode::CONFLICT,
            TransactionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Internal(err) => AppError::Internal(err),
            other => AppError::with_status(other.status_code(), other.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, TransactionError>;

/// Gold purchases paid by bank transfer and confirmed by an admin.
pub struct TransactionUseCase<T, V, U, I>
where
    T: TransactionRepository + Send + Sync + 'static,
    V: VoucherRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    transaction_repo: Arc<T>,
    voucher_repo: Arc<V>,
    user_repo: Arc<U>,
    image_storage: Arc<I>,
}

impl<T, V, U, I> TransactionUseCase<T, V, U, I>
where
    T: TransactionRepository + Send + Sync + 'static,
    V: VoucherRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    I: ImageStorageClient + Send + Sync + 'static,
{
    pub fn new(
        transaction_repo: Arc<T>,
        voucher_repo: Arc<V>,
        user_repo: Arc<U>,
        image_storage: Arc<I>,
    ) -> Self {
        Self {
            transaction_repo,
            voucher_repo,
            user_repo,
            image_storage,
        }
    }

    pub fn list_plans(&self) -> Vec<GoldPlanModel> {
        GoldPlan::ALL.into_iter().map(GoldPlanModel::from).collect()
    }

    pub async fn submit(
        &self,
        user_id: Uuid,
        model: SubmitTransactionModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<TransactionModel> {
        let bytes = model.proof.decode()?;

        let original_amount = model.plan.price();
        let voucher = match model
            .voucher_code
            .as_deref()
            .map(normalize_code)
            .filter(|code| !code.is_empty())
        {
            Some(code) => Some(self.valid_voucher(code, now).await?),
            None => None,
        };
        let amount = voucher
            .as_ref()
            .map_or(original_amount, |voucher| voucher.apply(original_amount));

        let file_name = format!("proof-{}-{}", user_id, model.proof.file_name);
        let proof_image_url = self
            .image_storage
            .upload_image(file_name, bytes)
            .await
            .map_err(|err| {
                error!(%user_id, error = ?err, "transactions: proof upload failed");
                TransactionError::Internal(err)
            })?;

        let outcome = self
            .transaction_repo
            .create(InsertTransactionEntity {
                id: Uuid::new_v4(),
                user_id,
                plan: model.plan.to_string(),
                original_amount,
                amount,
                voucher_id: voucher.as_ref().map(|voucher| voucher.id),
                proof_image_url,
                status: TransactionStatus::Pending.to_string(),
                note: None,
                created_at: now,
            })
            .await?;
        let transaction_id = match outcome {
            TransactionInsertOutcome::Created(transaction_id) => transaction_id,
            TransactionInsertOutcome::VoucherExhausted => {
                return Err(TransactionError::Voucher(VoucherRejection::Exhausted));
            }
        };
        info!(%user_id, %transaction_id, plan = %model.plan, amount, "transactions: proof submitted");

        self.load(transaction_id).await
    }

    pub async fn list_own(&self, user_id: Uuid) -> UseCaseResult<Vec<TransactionModel>> {
        let transactions = self.transaction_repo.list_by_user(user_id).await?;
        Ok(transactions
            .into_iter()
            .map(TransactionModel::from)
            .collect())
    }

    pub async fn list(&self, filter: ListTransactionsFilter) -> UseCaseResult<Vec<TransactionModel>> {
        let transactions = self.transaction_repo.list(filter).await?;
        Ok(transactions
            .into_iter()
            .map(TransactionModel::from)
            .collect())
    }

    pub async fn review(
        &self,
        reviewer_id: Uuid,
        transaction_id: Uuid,
        model: ReviewTransactionModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<TransactionModel> {
        let transaction = self.load(transaction_id).await?;
        if transaction.status != TransactionStatus::Pending {
            return Err(already_reviewed(transaction.status));
        }
        let note = model
            .note
            .as_ref()
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty());

        let applied = match model.decision {
            ReviewDecision::Approve => {
                let plan = GoldPlan::from_str(&transaction.plan).ok_or_else(|| {
                    anyhow::anyhow!("transaction {} has unknown plan", transaction_id)
                })?;
                let user = self
                    .user_repo
                    .find_by_id(transaction.user_id)
                    .await?
                    .ok_or(TransactionError::NotFound("user"))?;
                let gold_expires_at = plan.extend_expiry(user.gold_expires_at, now);

                let approved = self
                    .transaction_repo
                    .approve_and_upgrade(transaction_id, reviewer_id, note, now, gold_expires_at)
                    .await?;
                if approved {
                    info!(
                        %reviewer_id,
                        %transaction_id,
                        user_id = %transaction.user_id,
                        %gold_expires_at,
                        "transactions: approved, user upgraded to gold"
                    );
                }
                approved
            }
            ReviewDecision::Reject => {
                let rejected = self
                    .transaction_repo
                    .reject(transaction_id, reviewer_id, note, now)
                    .await?;
                if rejected {
                    info!(%reviewer_id, %transaction_id, "transactions: rejected");
                }
                rejected
            }
        };

        if !applied {
            return Err(TransactionError::Conflict(
                "transaction was reviewed by someone else".to_string(),
            ));
        }

        self.load(transaction_id).await
    }

    async fn valid_voucher(&self, code: String, now: DateTime<Utc>) -> UseCaseResult<VoucherModel> {
        let voucher = self
            .voucher_repo
            .find_by_code(code)
            .await?
            .ok_or(TransactionError::NotFound("voucher"))?;
        let voucher = VoucherModel::try_from(voucher)?;
        voucher.validate(now)?;
        Ok(voucher)
    }

    async fn load(&self, transaction_id: Uuid) -> UseCaseResult<TransactionModel> {
        self.transaction_repo
            .find_by_id(transaction_id)
            .await?
            .map(TransactionModel::from)
            .ok_or(TransactionError::NotFound("transaction"))
    }
}

fn already_reviewed(status: TransactionStatus) -> TransactionError {
    TransactionError::Conflict(format!("transaction is already {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::sample_user;
    use base64::{Engine as _, engine::general_purpose};
    use chrono::{Duration, TimeZone};
    use emocare::domain::{
        entities::{transactions::TransactionEntity, vouchers::VoucherEntity},
        repositories::{
            image_storage::MockImageStorageClient, transactions::MockTransactionRepository,
            users::MockUserRepository, vouchers::MockVoucherRepository,
        },
        value_objects::images::ImageUploadModel,
    };

    fn proof() -> ImageUploadModel {
        ImageUploadModel {
            file_name: "chuyen-khoan.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data_base64: general_purpose::STANDARD.encode(b"\xff\xd8\xff"),
        }
    }

    fn voucher(max_uses: Option<i32>, used_count: i32) -> VoucherEntity {
        let now = Utc::now();
        VoucherEntity {
            id: Uuid::new_v4(),
            code: "GIAM50K".to_string(),
            description: None,
            discount_type: "fixed".to_string(),
            discount_value: 50_000,
            max_uses,
            used_count,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
        }
    }

    fn pending(user_id: Uuid) -> TransactionEntity {
        TransactionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan: "gold_monthly".to_string(),
            original_amount: 99_000,
            amount: 99_000,
            voucher_id: None,
            proof_image_url: "https://i.ibb.co/x/proof.jpg".to_string(),
            status: "pending".to_string(),
            note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }

    fn uploads_ok() -> MockImageStorageClient {
        let mut image_storage = MockImageStorageClient::new();
        image_storage
            .expect_upload_image()
            .returning(|_, _| Ok("https://i.ibb.co/x/proof.jpg".to_string()));
        image_storage
    }

    #[test]
    fn plans_are_listed_with_prices() {
        let usecase = TransactionUseCase::new(
            Arc::new(MockTransactionRepository::new()),
            Arc::new(MockVoucherRepository::new()),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockImageStorageClient::new()),
        );

        let plans = usecase.list_plans();

        assert_eq!(plans.len(), 3);
        assert_eq!(plans[2].price, 999_000);
    }

    #[tokio::test]
    async fn submit_prices_with_voucher_and_stores_it_with_the_transaction() {
        let user_id = Uuid::new_v4();

        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo
            .expect_find_by_code()
            .withf(|code| code == "GIAM50K")
            .returning(|_| Ok(Some(voucher(Some(10), 2))));

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_create()
            .withf(|entity| {
                entity.original_amount == 99_000
                    && entity.amount == 49_000
                    && entity.status == "pending"
                    && entity.voucher_id.is_some()
            })
            .times(1)
            .returning(|entity| Ok(TransactionInsertOutcome::Created(entity.id)));
        transaction_repo.expect_find_by_id().returning(move |_| {
            Ok(Some(TransactionEntity {
                amount: 49_000,
                ..pending(user_id)
            }))
        });

        let usecase = TransactionUseCase::new(
            Arc::new(transaction_repo),
            Arc::new(voucher_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(uploads_ok()),
        );

        let submitted = usecase
            .submit(
                user_id,
                SubmitTransactionModel {
                    plan: GoldPlan::GoldMonthly,
                    voucher_code: Some(" giam50k ".to_string()),
                    proof: proof(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(submitted.amount, 49_000);
        assert_eq!(submitted.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn exhausted_voucher_is_rejected_before_upload() {
        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo
            .expect_find_by_code()
            .returning(|_| Ok(Some(voucher(Some(5), 5))));
        let mut image_storage = MockImageStorageClient::new();
        image_storage.expect_upload_image().never();

        let usecase = TransactionUseCase::new(
            Arc::new(MockTransactionRepository::new()),
            Arc::new(voucher_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(image_storage),
        );

        let result = usecase
            .submit(
                Uuid::new_v4(),
                SubmitTransactionModel {
                    plan: GoldPlan::GoldQuarterly,
                    voucher_code: Some("GIAM50K".to_string()),
                    proof: proof(),
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::Voucher(VoucherRejection::Exhausted))
        ));
    }

    #[tokio::test]
    async fn losing_the_voucher_race_is_reported() {
        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo
            .expect_find_by_code()
            .returning(|_| Ok(Some(voucher(Some(5), 4))));
        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_create()
            .times(1)
            .returning(|_| Ok(TransactionInsertOutcome::VoucherExhausted));
        transaction_repo.expect_find_by_id().never();

        let usecase = TransactionUseCase::new(
            Arc::new(transaction_repo),
            Arc::new(voucher_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(uploads_ok()),
        );

        let result = usecase
            .submit(
                Uuid::new_v4(),
                SubmitTransactionModel {
                    plan: GoldPlan::GoldMonthly,
                    voucher_code: Some("GIAM50K".to_string()),
                    proof: proof(),
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::Voucher(VoucherRejection::Exhausted))
        ));
    }

    #[tokio::test]
    async fn failed_insert_does_not_consume_single_use_voucher() {
        let single_use = voucher(Some(1), 0);
        let voucher_id = single_use.id;

        // Only the lookup is expected; any separate voucher write would panic the mock.
        let mut voucher_repo = MockVoucherRepository::new();
        voucher_repo
            .expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(single_use.clone())));

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_create()
            .withf(move |entity| entity.voucher_id == Some(voucher_id))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("insert failed")));

        let usecase = TransactionUseCase::new(
            Arc::new(transaction_repo),
            Arc::new(voucher_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(uploads_ok()),
        );

        let result = usecase
            .submit(
                Uuid::new_v4(),
                SubmitTransactionModel {
                    plan: GoldPlan::GoldMonthly,
                    voucher_code: Some("GIAM50K".to_string()),
                    proof: proof(),
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(TransactionError::Internal(_))));
    }

    #[tokio::test]
    async fn approval_extends_remaining_gold() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let expiry = now + Duration::days(10);
        let user = emocare::domain::entities::users::UserEntity {
            tier: "gold".to_string(),
            gold_expires_at: Some(expiry),
            ..sample_user()
        };
        let user_id = user.id;
        let transaction = pending(user_id);
        let transaction_id = transaction.id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(transaction.clone())));
        transaction_repo
            .expect_approve_and_upgrade()
            .withf(move |_, _, _, _, gold_expires_at| {
                *gold_expires_at == expiry + Duration::days(30)
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok(true));

        let usecase = TransactionUseCase::new(
            Arc::new(transaction_repo),
            Arc::new(MockVoucherRepository::new()),
            Arc::new(user_repo),
            Arc::new(MockImageStorageClient::new()),
        );

        let reviewed = usecase
            .review(
                Uuid::new_v4(),
                transaction_id,
                ReviewTransactionModel {
                    decision: ReviewDecision::Approve,
                    note: None,
                },
                now,
            )
            .await;

        assert!(reviewed.is_ok());
    }

    #[tokio::test]
    async fn reviewed_transactions_cannot_be_reviewed_again() {
        let transaction = TransactionEntity {
            status: "rejected".to_string(),
            ..pending(Uuid::new_v4())
        };

        let mut transaction_repo = MockTransactionRepository::new();
        transaction_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(transaction.clone())));
        transaction_repo.expect_approve_and_upgrade().never();

        let usecase = TransactionUseCase::new(
            Arc::new(transaction_repo),
            Arc::new(MockVoucherRepository::new()),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockImageStorageClient::new()),
        );

        let result = usecase
            .review(
                Uuid::new_v4(),
                Uuid::new_v4(),
                ReviewTransactionModel {
                    decision: ReviewDecision::Approve,
                    note: None,
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(TransactionError::Conflict(_))));
    }
}
