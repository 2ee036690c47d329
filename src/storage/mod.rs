//! Хранилище тарифов: заголовок дня (`tariff_periods`) и тарифы складов
//! (`warehouse_tariffs`), не более одной строки на пару (дата, склад).

pub mod error;
#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::wbseller::models::WarehouseEntry;

pub use error::{Result, StoreError};
pub use postgres::PgTariffStore;

/// Заголовок тарифов за день
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TariffPeriod {
    pub id: i64,
    pub date_key: String,
    pub next_box_date: Option<String>,
    pub till_max_date: Option<String>,
}

/// Тарифы склада, принадлежащие одному заголовку дня
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WarehouseTariff {
    pub id: i64,
    pub tariff_period_id: i64,
    pub warehouse_name: String,
    pub delivery_and_storage_expr: String,
    pub delivery_base: String,
    pub delivery_liter: String,
    pub storage_base: String,
    pub storage_liter: String,
}

impl WarehouseTariff {
    /// Отличаются ли сохранённые тарифы от полученных
    pub fn differs_from(&self, entry: &WarehouseEntry) -> bool {
        self.delivery_and_storage_expr != entry.delivery_and_storage_expr
            || self.delivery_base != entry.delivery_base
            || self.delivery_liter != entry.delivery_liter
            || self.storage_base != entry.storage_base
            || self.storage_liter != entry.storage_liter
    }
}

/// Строка выгрузки: тарифы склада вместе с датами заголовка
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub warehouse_name: String,
    pub delivery_and_storage_expr: String,
    pub delivery_base: String,
    pub delivery_liter: String,
    pub storage_base: String,
    pub storage_liter: String,
    pub next_box_date: Option<String>,
    pub till_max_date: Option<String>,
    pub date_key: String,
}

/// Операции внутри одной транзакции.
///
/// Транзакция, которую бросили без `commit`, не должна оставить следов.
#[async_trait]
pub trait TariffTx: Send {
    async fn find_period(&mut self, date_key: &str) -> Result<Option<TariffPeriod>>;

    async fn insert_period(
        &mut self,
        date_key: &str,
        next_box_date: Option<&str>,
        till_max_date: Option<&str>,
    ) -> Result<i64>;

    async fn update_period(
        &mut self,
        id: i64,
        next_box_date: Option<&str>,
        till_max_date: Option<&str>,
    ) -> Result<()>;

    /// Поиск тарифа склада по паре (заголовок, название склада)
    async fn find_warehouse(
        &mut self,
        period_id: i64,
        warehouse_name: &str,
    ) -> Result<Option<WarehouseTariff>>;

    async fn insert_warehouse(&mut self, period_id: i64, entry: &WarehouseEntry) -> Result<i64>;

    async fn update_warehouse(&mut self, id: i64, entry: &WarehouseEntry) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Транзакционное хранилище тарифов
#[async_trait]
pub trait TariffStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn TariffTx + '_>>;

    /// Тарифы складов за день, по возрастанию `delivery_and_storage_expr` как строки.
    /// Если заголовка за день нет, возвращается пустой список
    async fn read_snapshot(&self, date_key: &str) -> Result<Vec<SnapshotRow>>;
}
