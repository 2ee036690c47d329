use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres, Transaction,
    postgres::PgPoolOptions,
};
use std::time::Duration;
use tracing::info;

use crate::{config::Database, wbseller::models::WarehouseEntry};

use super::{Result, SnapshotRow, TariffPeriod, TariffStore, TariffTx, WarehouseTariff};

const SNAPSHOT_QUERY: &str = r#"
SELECT
    w.id,
    w.warehouse_name,
    w.delivery_and_storage_expr,
    w.delivery_base,
    w.delivery_liter,
    w.storage_base,
    w.storage_liter,
    p.next_box_date,
    p.till_max_date,
    p.date_key
FROM warehouse_tariffs w
JOIN tariff_periods p ON w.tariff_period_id = p.id
WHERE p.date_key = $1
ORDER BY w.delivery_and_storage_expr COLLATE "C" ASC, w.id ASC
"#;

/// Хранилище тарифов в PostgreSQL
#[derive(Debug, Clone)]
pub struct PgTariffStore {
    pool: PgPool,
}

impl PgTariffStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Подключение пула по параметрам конфигурации
    pub async fn connect(cfg: &Database) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .connect(&cfg.url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Применение встроенных миграций
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Миграции применены");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Транзакция PostgreSQL. Без `commit` откатывается при удалении
pub struct PgTariffTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TariffTx for PgTariffTx {
    async fn find_period(&mut self, date_key: &str) -> Result<Option<TariffPeriod>> {
        let period = sqlx::query_as::<_, TariffPeriod>(
            "SELECT id, date_key, next_box_date, till_max_date FROM tariff_periods WHERE date_key = $1",
        )
        .bind(date_key)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(period)
    }

    async fn insert_period(
        &mut self,
        date_key: &str,
        next_box_date: Option<&str>,
        till_max_date: Option<&str>,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO tariff_periods (date_key, next_box_date, till_max_date) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(date_key)
        .bind(next_box_date)
        .bind(till_max_date)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn update_period(
        &mut self,
        id: i64,
        next_box_date: Option<&str>,
        till_max_date: Option<&str>,
    ) -> Result<()> {
        sqlx::query("UPDATE tariff_periods SET next_box_date = $2, till_max_date = $3 WHERE id = $1")
            .bind(id)
            .bind(next_box_date)
            .bind(till_max_date)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn find_warehouse(
        &mut self,
        period_id: i64,
        warehouse_name: &str,
    ) -> Result<Option<WarehouseTariff>> {
        let warehouse = sqlx::query_as::<_, WarehouseTariff>(
            r#"
            SELECT id, tariff_period_id, warehouse_name, delivery_and_storage_expr,
                   delivery_base, delivery_liter, storage_base, storage_liter
            FROM warehouse_tariffs
            WHERE tariff_period_id = $1 AND warehouse_name = $2
            "#,
        )
        .bind(period_id)
        .bind(warehouse_name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(warehouse)
    }

    async fn insert_warehouse(&mut self, period_id: i64, entry: &WarehouseEntry) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO warehouse_tariffs (
                tariff_period_id, warehouse_name, delivery_and_storage_expr,
                delivery_base, delivery_liter, storage_base, storage_liter
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(period_id)
        .bind(&entry.warehouse_name)
        .bind(&entry.delivery_and_storage_expr)
        .bind(&entry.delivery_base)
        .bind(&entry.delivery_liter)
        .bind(&entry.storage_base)
        .bind(&entry.storage_liter)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn update_warehouse(&mut self, id: i64, entry: &WarehouseEntry) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE warehouse_tariffs SET
                delivery_and_storage_expr = $2,
                delivery_base = $3,
                delivery_liter = $4,
                storage_base = $5,
                storage_liter = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&entry.delivery_and_storage_expr)
        .bind(&entry.delivery_base)
        .bind(&entry.delivery_liter)
        .bind(&entry.storage_base)
        .bind(&entry.storage_liter)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl TariffStore for PgTariffStore {
    async fn begin(&self) -> Result<Box<dyn TariffTx + '_>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTariffTx { tx }))
    }

    async fn read_snapshot(&self, date_key: &str) -> Result<Vec<SnapshotRow>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(SNAPSHOT_QUERY)
            .bind(date_key)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
