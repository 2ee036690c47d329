mod config;
mod error;
mod pipeline;
mod retry;
mod sheets;
mod storage;
mod util;
mod wbseller;

use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use error::Result;

use crate::{
    config::Config,
    pipeline::{Pipeline, Scheduler},
    sheets::{SheetsClientBuilder, SnapshotPublisher},
    storage::PgTariffStore,
};

const LOGO: &str = r#"
 _    _ ______   _____              _  __  __
| |  | || ___ \ |_   _|            (_)/ _|/ _|
| |  | || |_/ /   | | __ _ _ __ ___ _| |_| |_ ___
| |/\| || ___ \   | |/ _` | '__/ _ \ |  _|  _/ __|
\  /\  /| |_/ /   | | (_| | | |  __/ | | | | \__ \
 \/  \/ \____/    \_/\__,_|_|  \___|_|_| |_| |___/
"#;

/// Обработка сигнала завершения (Ctrl+C или SIGINT/SIGTERM)
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(windows)]
    {
        tokio::signal::ctrl_c().await?;
    }

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => {},
            _ = sigterm.recv() => {},
        }
    }

    info!("Завершение по сигналу...");
    Ok(())
}

/// Инициализация конфигурации: шаблон при первом запуске, затем `.env` и `Config.toml`
fn startup() -> Result<&'static Config> {
    let _ = dotenvy::dotenv();

    if config::init_if_not()? {
        let full_config_path = std::env::current_dir()?.join(config::CONFIG_PATH);
        println!(
            "Файл конфигурации инициализирован по пути: {:?}",
            full_config_path
        );
    }

    config::init()
}

/// Логирование: `RUST_LOG` или уровень из конфигурации
fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_pipeline(cfg: &Config, store: PgTariffStore) -> Result<Pipeline> {
    let retry = cfg.schedule.retry_policy();

    let client = wbseller::Client::new(
        &cfg.wb_api.url,
        &cfg.wb_api.token,
        Duration::from_secs(cfg.wb_api.timeout_secs),
    )?;

    let sheets = SheetsClientBuilder::new(&cfg.google_sheets.access_token)
        .base_url(&cfg.google_sheets.base_url)
        .timeout(Duration::from_secs(cfg.google_sheets.timeout_secs))
        .build()?;

    Ok(Pipeline::new(
        client,
        Arc::new(store),
        SnapshotPublisher::new(sheets, retry),
        cfg.google_sheets.spreadsheet_ids.clone(),
        retry,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("\x1b[95m{}\x1b[0m\n", LOGO);
    let cfg = startup()?;
    init_tracing(cfg);

    if cfg.google_sheets.spreadsheet_ids.is_empty() || cfg.google_sheets.access_token.is_empty() {
        warn!("Предупреждение: не указан токен Google Sheets или пуст список таблиц");
    }

    let store = PgTariffStore::connect(&cfg.database).await?;
    store.migrate().await?;

    let pipeline = Arc::new(build_pipeline(cfg, store.clone())?);
    let scheduler = Scheduler::start(Arc::clone(&pipeline), &cfg.schedule).await?;

    info!(
        fetch_cron = cfg.schedule.fetch_cron.as_str(),
        export_cron = cfg.schedule.export_cron.as_str(),
        "Процесс получения и выгрузки тарифов запущен"
    );

    shutdown_signal().await?;

    scheduler.shutdown().await?;
    store.close().await;

    Ok(())
}
