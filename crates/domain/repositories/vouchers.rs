use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::vouchers::{InsertVoucherEntity, UpdateVoucherEntity, VoucherEntity};

#[automock]
#[async_trait]
pub trait VoucherRepository {
    async fn create(&self, voucher: InsertVoucherEntity) -> Result<Uuid>;
    async fn find_by_id(&self, voucher_id: Uuid) -> Result<Option<VoucherEntity>>;
    async fn find_by_code(&self, code: String) -> Result<Option<VoucherEntity>>;
    async fn list(&self) -> Result<Vec<VoucherEntity>>;
    async fn update(&self, voucher_id: Uuid, changes: UpdateVoucherEntity) -> Result<()>;
    /// Returns false when nothing was deleted.
    async fn delete(&self, voucher_id: Uuid) -> Result<bool>;
}
