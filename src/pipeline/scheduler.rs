use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::{
    config::Schedule,
    error::{Error, Result},
    pipeline::Pipeline,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Fetch,
    Export,
}

/// Не больше одного запуска цикла одновременно
#[derive(Debug, Default)]
pub struct CycleGuard {
    running: AtomicBool,
}

/// Отметка о выполняемом цикле, снимается при удалении
pub struct CycleTicket<'a> {
    guard: &'a CycleGuard,
}

impl CycleGuard {
    pub fn try_enter(&self) -> Option<CycleTicket<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| CycleTicket { guard: self })
    }
}

impl Drop for CycleTicket<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

/// Планировщик обоих циклов. Создаётся при старте процесса и останавливается при завершении
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    pub async fn start(pipeline: Arc<Pipeline>, schedule: &Schedule) -> Result<Self> {
        let inner = JobScheduler::new().await.map_err(scheduler_error)?;

        for (cron, cycle) in [
            (&schedule.fetch_cron, Cycle::Fetch),
            (&schedule.export_cron, Cycle::Export),
        ] {
            let job = cycle_job(cron, cycle, Arc::clone(&pipeline))?;
            inner.add(job).await.map_err(scheduler_error)?;
            info!(cron = cron.as_str(), ?cycle, "Задача добавлена в расписание");
        }

        inner.start().await.map_err(scheduler_error)?;

        Ok(Self { inner })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.inner.shutdown().await.map_err(scheduler_error)?;
        info!("Планировщик остановлен");
        Ok(())
    }
}

fn scheduler_error(err: impl std::fmt::Debug) -> Error {
    Error::Scheduler(format!("{err:?}"))
}

/// Запуск цикла, если предыдущий запуск того же цикла уже завершился.
/// Возвращает `false`, когда запуск пропущен
pub async fn run_guarded(guard: &CycleGuard, cycle: Cycle, pipeline: &Pipeline) -> bool {
    let Some(_ticket) = guard.try_enter() else {
        warn!(?cycle, "Предыдущий запуск цикла ещё выполняется, пропуск");
        return false;
    };

    match cycle {
        Cycle::Fetch => pipeline.hourly().await,
        Cycle::Export => pipeline.daily().await,
    }

    true
}

fn cycle_job(cron: &str, cycle: Cycle, pipeline: Arc<Pipeline>) -> Result<Job> {
    let guard = Arc::new(CycleGuard::default());

    Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);
        let guard = Arc::clone(&guard);

        Box::pin(async move {
            run_guarded(&guard, cycle, &pipeline).await;
        })
    })
    .map_err(|e| Error::Config(format!("invalid cron {cron:?} for {cycle:?}: {e:?}")))
}
