use std::{fmt::Display, future::Future, time::Duration};

use tracing::warn;

/// Фиксированная пауза перед повтором запроса после ответа 429
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Ошибка, по которой можно определить превышение лимита запросов
pub trait RateLimited {
    fn is_rate_limited(&self) -> bool;
}

/// Политика повторов при превышении лимита запросов.
///
/// Пауза между попытками не растёт. Без `max_attempts` повторы не ограничены.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }

    /// Можно ли сделать ещё одну попытку после `attempt` выполненных
    fn allows_after(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }
}

/// Выполнение операции с повтором тех же аргументов, пока ответ остаётся 429.
///
/// Любой другой результат (успех или ошибка) возвращается сразу.
/// Во время паузы вызывающая задача просто спит и ничего не удерживает.
pub async fn retry_on_rate_limit<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RateLimited + Display,
{
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Err(err) if err.is_rate_limited() && policy.allows_after(attempt) => {
                warn!(
                    operation,
                    attempt,
                    delay_secs = policy.delay.as_secs_f64(),
                    "Получен код ошибки 429. Ожидаем и повторяем запрос..."
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) if err.is_rate_limited() => {
                warn!(operation, attempt, "Лимит попыток исчерпан: {err}");
                return Err(err);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    #[derive(Debug, PartialEq)]
    enum FakeError {
        TooManyRequests,
        BadRequest,
    }

    impl Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl RateLimited for FakeError {
        fn is_rate_limited(&self) -> bool {
            matches!(self, FakeError::TooManyRequests)
        }
    }

    fn fast(max_attempts: Option<u32>) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), max_attempts)
    }

    #[tokio::test]
    async fn retries_until_rate_limit_clears() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = retry_on_rate_limit(&fast(None), "test", || {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 4 {
                    Err(FakeError::TooManyRequests)
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = retry_on_rate_limit(&fast(None), "test", || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::BadRequest)
            }
        })
        .await;

        assert_eq!(result, Err(FakeError::BadRequest));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn max_attempts_caps_retries() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = retry_on_rate_limit(&fast(Some(3)), "test", || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FakeError::TooManyRequests)
            }
        })
        .await;

        assert_eq!(result, Err(FakeError::TooManyRequests));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn default_policy_is_unbounded_minute() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay, Duration::from_secs(60));
        assert!(policy.allows_after(u32::MAX - 1));
    }
}
