//! Ежечасное получение тарифов и ежедневная выгрузка в таблицы.
//!
//! Циклы не хранят состояния между запусками, всё нужное лежит в базе.

pub mod export;
pub mod reconcile;
pub mod scheduler;

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    error::{Error, Result},
    retry::{RetryPolicy, retry_on_rate_limit},
    sheets::SnapshotPublisher,
    storage::TariffStore,
    util,
    wbseller::Client,
};

use export::{ExportReport, export_snapshot, read_snapshot};
use reconcile::{ReconcileReport, reconcile};

pub use scheduler::Scheduler;

/// Итог цикла получения тарифов
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Reconciled(ReconcileReport),
    /// API вернул пустой ответ
    Empty,
}

pub struct Pipeline {
    client: Client,
    store: Arc<dyn TariffStore>,
    publisher: SnapshotPublisher,
    spreadsheet_ids: Vec<String>,
    retry: RetryPolicy,
}

impl Pipeline {
    pub fn new(
        client: Client,
        store: Arc<dyn TariffStore>,
        publisher: SnapshotPublisher,
        spreadsheet_ids: Vec<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            store,
            publisher,
            spreadsheet_ids,
            retry,
        }
    }

    /// Получение тарифов на `date_key` и сохранение в базу.
    /// Ответ 429 повторяется с той же датой, прочие ошибки прерывают цикл
    pub async fn run_fetch_cycle(&self, date_key: &str) -> Result<FetchOutcome> {
        check_date_key(date_key)?;

        let fetched = retry_on_rate_limit(&self.retry, "wb_api.fetch_tariffs", || {
            self.client.fetch_tariffs(date_key)
        })
        .await
        .inspect_err(|e| {
            error!(
                date_key,
                status = ?e.status(),
                "Ошибка при получении данных: {e}"
            )
        })?;

        let Some(snapshot) = fetched else {
            warn!(date_key, "API тарифов вернул пустой ответ");
            return Ok(FetchOutcome::Empty);
        };

        let report = reconcile(self.store.as_ref(), date_key, &snapshot).await?;

        Ok(FetchOutcome::Reconciled(report))
    }

    /// Чтение снимка за `date_key` и выгрузка на лист с тем же названием
    pub async fn run_export_cycle(&self, date_key: &str) -> Result<ExportReport> {
        check_date_key(date_key)?;

        if self.spreadsheet_ids.is_empty() {
            warn!("Не указаны ID таблиц для выгрузки");
            return Ok(ExportReport {
                label: date_key.to_string(),
                ..Default::default()
            });
        }

        let rows = read_snapshot(self.store.as_ref(), date_key).await?;

        Ok(export_snapshot(&self.publisher, &self.spreadsheet_ids, &rows, date_key).await)
    }

    /// Ежечасный цикл: тарифы на сегодня. Ошибки только логируются
    pub async fn hourly(&self) {
        let today = util::today_key();
        let date_key = today.as_str();
        info!(date_key, "Запрос по эндпоинту и сохранение данных в бд...");

        match self.run_fetch_cycle(date_key).await {
            Ok(FetchOutcome::Reconciled(report)) => {
                info!(date_key, period_id = report.period_id, "Цикл получения тарифов завершён")
            }
            Ok(FetchOutcome::Empty) => {}
            Err(err) => error!(date_key, "Цикл получения тарифов завершился ошибкой: {err}"),
        }
    }

    /// Ежедневный цикл: выгрузка за вчера. Ошибки только логируются
    pub async fn daily(&self) {
        let yesterday = util::yesterday_key();
        let date_key = yesterday.as_str();
        info!(date_key, "Экспорт данных в google таблицы...");

        match self.run_export_cycle(date_key).await {
            Ok(report) if !report.is_complete() => {
                let failed: Vec<_> = report.failed.iter().map(|(id, _)| id.as_str()).collect();
                warn!(
                    label = report.label.as_str(),
                    rows = report.rows,
                    ?failed,
                    "Данные выгружены не во все таблицы"
                );
            }
            Ok(_) => {}
            Err(err) => error!(date_key, "Цикл выгрузки завершился ошибкой: {err}"),
        }
    }
}

fn check_date_key(date_key: &str) -> Result<()> {
    if util::is_date_key(date_key) {
        Ok(())
    } else {
        Err(Error::InvalidDateKey(date_key.to_string()))
    }
}
