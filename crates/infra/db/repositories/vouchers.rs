use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::vouchers},
};
use domain::{
    entities::vouchers::{InsertVoucherEntity, UpdateVoucherEntity, VoucherEntity},
    repositories::vouchers::VoucherRepository,
};

pub struct VoucherPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl VoucherPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl VoucherRepository for VoucherPostgres {
    async fn create(&self, voucher: InsertVoucherEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let voucher_id = insert_into(vouchers::table)
            .values(&voucher)
            .returning(vouchers::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(voucher_id)
    }

    async fn find_by_id(&self, voucher_id: Uuid) -> Result<Option<VoucherEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = vouchers::table
            .filter(vouchers::id.eq(voucher_id))
            .select(VoucherEntity::as_select())
            .first::<VoucherEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_code(&self, code: String) -> Result<Option<VoucherEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = vouchers::table
            .filter(vouchers::code.eq(code))
            .select(VoucherEntity::as_select())
            .first::<VoucherEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(&self) -> Result<Vec<VoucherEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = vouchers::table
            .select(VoucherEntity::as_select())
            .order(vouchers::created_at.desc())
            .load::<VoucherEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update(&self, voucher_id: Uuid, changes: UpdateVoucherEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(vouchers::table.filter(vouchers::id.eq(voucher_id)))
            .set(&changes)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, voucher_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted =
            delete(vouchers::table.filter(vouchers::id.eq(voucher_id))).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
