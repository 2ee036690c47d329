//! Хранилище в памяти для тестов.
//!
//! Транзакция работает с копией таблиц и держит блокировку до `commit`,
//! поэтому незавершённая транзакция ничего не меняет.

use async_trait::async_trait;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::wbseller::models::WarehouseEntry;

use super::{
    Result, SnapshotRow, StoreError, TariffPeriod, TariffStore, TariffTx, WarehouseTariff,
};

#[derive(Debug, Default, Clone)]
struct Tables {
    periods: Vec<TariffPeriod>,
    warehouses: Vec<WarehouseTariff>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_on_warehouse: Arc<StdMutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запись склада с этим названием будет завершаться ошибкой
    pub fn fail_on_warehouse(&self, name: &str) {
        *self.fail_on_warehouse.lock().unwrap() = Some(name.to_string());
    }

    pub async fn periods(&self) -> Vec<TariffPeriod> {
        self.tables.lock().await.periods.clone()
    }

    pub async fn warehouses(&self) -> Vec<WarehouseTariff> {
        self.tables.lock().await.warehouses.clone()
    }

    /// Удаление заголовка дня вместе с его тарифами складов
    pub async fn delete_period(&self, date_key: &str) {
        let mut tables = self.tables.lock().await;
        let ids: Vec<_> = tables
            .periods
            .iter()
            .filter(|p| p.date_key == date_key)
            .map(|p| p.id)
            .collect();
        tables.periods.retain(|p| !ids.contains(&p.id));
        tables
            .warehouses
            .retain(|w| !ids.contains(&w.tariff_period_id));
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
    fail_on_warehouse: Option<String>,
}

impl MemoryTx {
    fn check_fault(&self, entry: &WarehouseEntry) -> Result<()> {
        if self.fail_on_warehouse.as_deref() == Some(entry.warehouse_name.as_str()) {
            return Err(StoreError::Custom(format!(
                "injected failure for {}",
                entry.warehouse_name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TariffTx for MemoryTx {
    async fn find_period(&mut self, date_key: &str) -> Result<Option<TariffPeriod>> {
        Ok(self
            .work
            .periods
            .iter()
            .find(|p| p.date_key == date_key)
            .cloned())
    }

    async fn insert_period(
        &mut self,
        date_key: &str,
        next_box_date: Option<&str>,
        till_max_date: Option<&str>,
    ) -> Result<i64> {
        if self.work.periods.iter().any(|p| p.date_key == date_key) {
            return Err(StoreError::Custom(format!("duplicate date_key {date_key}")));
        }
        let id = self.work.next_id();
        self.work.periods.push(TariffPeriod {
            id,
            date_key: date_key.to_string(),
            next_box_date: next_box_date.map(str::to_string),
            till_max_date: till_max_date.map(str::to_string),
        });
        Ok(id)
    }

    async fn update_period(
        &mut self,
        id: i64,
        next_box_date: Option<&str>,
        till_max_date: Option<&str>,
    ) -> Result<()> {
        if let Some(period) = self.work.periods.iter_mut().find(|p| p.id == id) {
            period.next_box_date = next_box_date.map(str::to_string);
            period.till_max_date = till_max_date.map(str::to_string);
        }
        Ok(())
    }

    async fn find_warehouse(
        &mut self,
        period_id: i64,
        warehouse_name: &str,
    ) -> Result<Option<WarehouseTariff>> {
        Ok(self
            .work
            .warehouses
            .iter()
            .find(|w| w.tariff_period_id == period_id && w.warehouse_name == warehouse_name)
            .cloned())
    }

    async fn insert_warehouse(&mut self, period_id: i64, entry: &WarehouseEntry) -> Result<i64> {
        self.check_fault(entry)?;
        if self
            .work
            .warehouses
            .iter()
            .any(|w| w.tariff_period_id == period_id && w.warehouse_name == entry.warehouse_name)
        {
            return Err(StoreError::Custom(format!(
                "duplicate warehouse {}",
                entry.warehouse_name
            )));
        }
        let id = self.work.next_id();
        self.work.warehouses.push(WarehouseTariff {
            id,
            tariff_period_id: period_id,
            warehouse_name: entry.warehouse_name.clone(),
            delivery_and_storage_expr: entry.delivery_and_storage_expr.clone(),
            delivery_base: entry.delivery_base.clone(),
            delivery_liter: entry.delivery_liter.clone(),
            storage_base: entry.storage_base.clone(),
            storage_liter: entry.storage_liter.clone(),
        });
        Ok(id)
    }

    async fn update_warehouse(&mut self, id: i64, entry: &WarehouseEntry) -> Result<()> {
        self.check_fault(entry)?;
        if let Some(w) = self.work.warehouses.iter_mut().find(|w| w.id == id) {
            w.delivery_and_storage_expr = entry.delivery_and_storage_expr.clone();
            w.delivery_base = entry.delivery_base.clone();
            w.delivery_liter = entry.delivery_liter.clone();
            w.storage_base = entry.storage_base.clone();
            w.storage_liter = entry.storage_liter.clone();
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx {
            mut guard, work, ..
        } = *self;
        *guard = work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl TariffStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn TariffTx + '_>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let work = guard.clone();
        let fail_on_warehouse = self.fail_on_warehouse.lock().unwrap().clone();
        Ok(Box::new(MemoryTx {
            guard,
            work,
            fail_on_warehouse,
        }))
    }

    async fn read_snapshot(&self, date_key: &str) -> Result<Vec<SnapshotRow>> {
        let tables = self.tables.lock().await;
        let Some(period) = tables.periods.iter().find(|p| p.date_key == date_key) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<_> = tables
            .warehouses
            .iter()
            .filter(|w| w.tariff_period_id == period.id)
            .map(|w| SnapshotRow {
                id: w.id,
                warehouse_name: w.warehouse_name.clone(),
                delivery_and_storage_expr: w.delivery_and_storage_expr.clone(),
                delivery_base: w.delivery_base.clone(),
                delivery_liter: w.delivery_liter.clone(),
                storage_base: w.storage_base.clone(),
                storage_liter: w.storage_liter.clone(),
                next_box_date: period.next_box_date.clone(),
                till_max_date: period.till_max_date.clone(),
                date_key: period.date_key.clone(),
            })
            .collect();

        // побайтовое сравнение строк, как COLLATE "C"
        rows.sort_by(|a, b| {
            a.delivery_and_storage_expr
                .as_bytes()
                .cmp(b.delivery_and_storage_expr.as_bytes())
                .then(a.id.cmp(&b.id))
        });

        Ok(rows)
    }
}
