use tracing::{debug, info, warn};

use crate::{
    sheets::{SnapshotPublisher, error::SheetsError},
    storage::{Result, SnapshotRow, TariffStore},
};

/// Итог выгрузки снимка по всем таблицам
#[derive(Debug, Default)]
pub struct ExportReport {
    pub label: String,
    pub rows: usize,
    pub published: Vec<String>,
    pub failed: Vec<(String, SheetsError)>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Строки снимка за день, отсортированные хранилищем
pub async fn read_snapshot(store: &dyn TariffStore, date_key: &str) -> Result<Vec<SnapshotRow>> {
    let rows = store.read_snapshot(date_key).await?;

    if rows.is_empty() {
        warn!(date_key, "Нет данных за дату, будет выгружен только заголовок");
    } else {
        debug!(date_key, rows = rows.len(), "Снимок прочитан");
    }

    Ok(rows)
}

/// Выгрузка одних и тех же строк в каждую таблицу по очереди.
/// Ошибка одной таблицы не мешает остальным
pub async fn export_snapshot(
    publisher: &SnapshotPublisher,
    spreadsheet_ids: &[String],
    rows: &[SnapshotRow],
    label: &str,
) -> ExportReport {
    let mut report = ExportReport {
        label: label.to_string(),
        rows: rows.len(),
        ..Default::default()
    };

    for spreadsheet_id in spreadsheet_ids {
        match publisher.publish(spreadsheet_id, rows, label).await {
            Ok(()) => report.published.push(spreadsheet_id.clone()),
            Err(err) => report.failed.push((spreadsheet_id.clone(), err)),
        }
    }

    info!(
        label,
        published = report.published.len(),
        failed = report.failed.len(),
        "Экспорт завершён"
    );

    report
}
