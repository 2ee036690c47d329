use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::{
    retry::{RetryPolicy, retry_on_rate_limit},
    sheets::{
        client::{SheetsClient, a1_range},
        error::{Result, SheetsError},
    },
    storage::SnapshotRow,
};

pub const HEADER: [&str; 9] = [
    "ID",
    "Warehouse Name",
    "Box Delivery and Storage Expr",
    "Box Delivery Base",
    "Box Delivery Liter",
    "Box Storage Base",
    "Box Storage Liter",
    "Next Box Date",
    "Till Max Date",
];

/// Минимальный размер сетки нового листа
pub const MIN_GRID_ROWS: u32 = 1000;
pub const MIN_GRID_COLUMNS: u32 = 26;

/// Заголовок и строки в том порядке, в котором они пришли
pub fn to_values(rows: &[SnapshotRow]) -> Vec<Vec<Value>> {
    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(HEADER.iter().map(|h| json!(h)).collect());

    for row in rows {
        values.push(vec![
            json!(row.id),
            json!(row.warehouse_name),
            json!(row.delivery_and_storage_expr),
            json!(row.delivery_base),
            json!(row.delivery_liter),
            json!(row.storage_base),
            json!(row.storage_liter),
            json!(row.next_box_date.as_deref().unwrap_or_default()),
            json!(row.till_max_date.as_deref().unwrap_or_default()),
        ]);
    }

    values
}

/// Выгрузка снимка тарифов на новый лист таблицы
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    client: SheetsClient,
    retry: RetryPolicy,
}

impl SnapshotPublisher {
    pub fn new(client: SheetsClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Создание листа `label` и запись строк.
    ///
    /// При 429 повторяется только шаг, получивший этот ответ, с теми же
    /// аргументами: созданный лист повторно не создаётся.
    /// Другие ошибки логируются и возвращаются без повтора.
    pub async fn publish(&self, spreadsheet_id: &str, rows: &[SnapshotRow], label: &str) -> Result<()> {
        let result = self.publish_steps(spreadsheet_id, rows, label).await;

        match &result {
            Ok(()) => info!(
                spreadsheet_id,
                label,
                rows = rows.len(),
                "Данные успешно выгружены в Google Sheets"
            ),
            Err(SheetsError::Client { status, body }) => warn!(
                spreadsheet_id,
                label,
                status,
                body = body.as_str(),
                "Ошибка клиента: данные не выгружены в Google Sheets"
            ),
            Err(SheetsError::RateLimited(_)) => warn!(
                spreadsheet_id,
                label,
                "Лимит запросов превышен, попытки исчерпаны: данные не выгружены"
            ),
            Err(err) => error!(
                spreadsheet_id,
                label,
                "Неизвестная ошибка при выгрузке данных: {err}"
            ),
        }

        result
    }

    async fn publish_steps(&self, spreadsheet_id: &str, rows: &[SnapshotRow], label: &str) -> Result<()> {
        let row_count = MIN_GRID_ROWS.max(u32::try_from(rows.len() + 1).unwrap_or(u32::MAX));

        retry_on_rate_limit(&self.retry, "google_sheets.add_sheet", || {
            self.client
                .add_sheet(spreadsheet_id, label, row_count, MIN_GRID_COLUMNS)
        })
        .await?;

        let range = a1_range(label, "A1");
        let values = to_values(rows);

        retry_on_rate_limit(&self.retry, "google_sheets.update_values", || {
            self.client
                .update_values(spreadsheet_id, &range, values.clone())
        })
        .await
    }
}
