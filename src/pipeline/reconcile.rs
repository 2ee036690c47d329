use tracing::{debug, error, info, warn};

use crate::{
    storage::{Result, TariffStore, TariffTx},
    wbseller::models::TariffSnapshot,
};

/// Итог сохранения снимка за день
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub period_id: i64,
    pub period_created: bool,
    pub inserted: usize,
    pub updated: usize,
    /// Сколько из обновлённых складов получили новые значения
    pub changed: usize,
}

/// Сохранение снимка тарифов под ключом `date_key` в одной транзакции.
///
/// Заголовок дня и тарифы складов создаются или обновляются на месте,
/// поэтому повторный вызов с теми же данными не добавляет строк.
/// Любая ошибка откатывает транзакцию целиком.
pub async fn reconcile(
    store: &dyn TariffStore,
    date_key: &str,
    snapshot: &TariffSnapshot,
) -> Result<ReconcileReport> {
    let mut tx = store.begin().await?;

    match apply(tx.as_mut(), date_key, snapshot).await {
        Ok(report) => {
            tx.commit().await?;
            info!(
                date_key,
                created = report.period_created,
                inserted = report.inserted,
                updated = report.updated,
                changed = report.changed,
                "Данные обновлены/добавлены успешно"
            );
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(date_key, "Ошибка отката транзакции: {rollback_err}");
            }
            error!(date_key, "Ошибка при обновлении данных: {err}");
            Err(err)
        }
    }
}

async fn apply(
    tx: &mut dyn TariffTx,
    date_key: &str,
    snapshot: &TariffSnapshot,
) -> Result<ReconcileReport> {
    let next_box_date = snapshot.next_box_date.as_deref();
    let till_max_date = snapshot.till_max_date.as_deref();

    let mut report = ReconcileReport::default();

    report.period_id = match tx.find_period(date_key).await? {
        Some(period) => {
            if period.next_box_date.as_deref() != next_box_date
                || period.till_max_date.as_deref() != till_max_date
            {
                debug!(
                    date_key = period.date_key.as_str(),
                    "Даты заголовка изменились"
                );
            }
            tx.update_period(period.id, next_box_date, till_max_date)
                .await?;
            period.id
        }
        None => {
            report.period_created = true;
            tx.insert_period(date_key, next_box_date, till_max_date)
                .await?
        }
    };

    for entry in &snapshot.warehouses {
        match tx
            .find_warehouse(report.period_id, &entry.warehouse_name)
            .await?
        {
            Some(existing) => {
                if existing.differs_from(entry) {
                    report.changed += 1;
                }
                tx.update_warehouse(existing.id, entry).await?;
                report.updated += 1;
            }
            None => {
                tx.insert_warehouse(report.period_id, entry).await?;
                report.inserted += 1;
            }
        }
    }

    Ok(report)
}
