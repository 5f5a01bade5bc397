// Concurrency limiter for outgoing API requests.
// Caps how many tasks run at once; waiting tasks start in FIFO order.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;

use crate::error::{FolioError, Result};

/// Default number of language requests allowed in flight.
pub const DEFAULT_LANGUAGE_CONCURRENCY: usize = 3;

/// Bounds the number of simultaneously running tasks.
///
/// Backed by a fair semaphore, so tasks acquire slots in the order they
/// were queued. A task's failure is just its own output; it frees the slot
/// like any other completion.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
    active: Arc<AtomicUsize>,
}

impl ConcurrencyLimiter {
    /// Create a limiter allowing `limit` concurrent tasks.
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(FolioError::Config(
                "concurrency limit must be greater than zero".to_string(),
            ));
        }
        if limit > Semaphore::MAX_PERMITS {
            return Err(FolioError::Config(format!(
                "concurrency limit too large: {} (at most {})",
                limit,
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of tasks currently holding a slot.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Queue a task and run it once a slot is free.
    pub async fn run<F, Fut, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FolioError::Config("concurrency limiter closed".to_string()))?;

        let _active = ActiveGuard::enter(&self.active);
        Ok(task().await)
    }
}

impl TryFrom<i64> for ConcurrencyLimiter {
    type Error = FolioError;

    fn try_from(limit: i64) -> Result<Self> {
        if limit <= 0 {
            return Err(FolioError::Config(format!(
                "concurrency limit must be greater than zero, got {}",
                limit
            )));
        }
        let limit = usize::try_from(limit)
            .map_err(|_| FolioError::Config(format!("concurrency limit too large: {}", limit)))?;
        Self::new(limit)
    }
}

impl TryFrom<f64> for ConcurrencyLimiter {
    type Error = FolioError;

    fn try_from(limit: f64) -> Result<Self> {
        if !limit.is_finite() || limit < 1.0 {
            return Err(FolioError::Config(format!(
                "concurrency limit must be a finite number greater than zero, got {}",
                limit
            )));
        }
        if limit > Semaphore::MAX_PERMITS as f64 {
            return Err(FolioError::Config(format!("concurrency limit too large: {}", limit)));
        }
        Self::new(limit as usize)
    }
}

/// Keeps the active counter in step even if the task future is dropped.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl<'a> ActiveGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::future::join_all;

    #[test]
    fn test_rejects_non_positive_limits() {
        assert!(matches!(
            ConcurrencyLimiter::new(0),
            Err(FolioError::Config(_))
        ));
        assert!(matches!(
            ConcurrencyLimiter::try_from(0i64),
            Err(FolioError::Config(_))
        ));
        assert!(matches!(
            ConcurrencyLimiter::try_from(-2i64),
            Err(FolioError::Config(_))
        ));
        assert!(matches!(
            ConcurrencyLimiter::try_from(f64::INFINITY),
            Err(FolioError::Config(_))
        ));
        assert!(matches!(
            ConcurrencyLimiter::try_from(f64::NAN),
            Err(FolioError::Config(_))
        ));
        assert_eq!(ConcurrencyLimiter::try_from(3i64).unwrap().limit(), 3);
    }

    #[test]
    fn test_rejects_oversized_limits() {
        assert!(matches!(
            ConcurrencyLimiter::new(Semaphore::MAX_PERMITS + 1),
            Err(FolioError::Config(_))
        ));
        assert!(matches!(
            ConcurrencyLimiter::try_from(i64::MAX),
            Err(FolioError::Config(_))
        ));
        assert!(matches!(
            ConcurrencyLimiter::try_from(1e300f64),
            Err(FolioError::Config(_))
        ));
        assert_eq!(
            ConcurrencyLimiter::new(Semaphore::MAX_PERMITS).unwrap().limit(),
            Semaphore::MAX_PERMITS
        );
    }

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let limiter = ConcurrencyLimiter::new(3).unwrap();
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..12).map(|i| {
            let limiter = limiter.clone();
            let peak = peak.clone();
            async move {
                limiter
                    .run(|| async {
                        peak.fetch_max(limiter.active(), Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5 + (i % 3) * 5)).await;
                        i
                    })
                    .await
                    .unwrap()
            }
        });

        let results = join_all(tasks).await;

        assert_eq!(results, (0..12).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(limiter.active(), 0);
    }

    #[tokio::test]
    async fn test_starts_in_fifo_order() {
        let limiter = ConcurrencyLimiter::new(1).unwrap();
        let started = Arc::new(Mutex::new(Vec::new()));

        let tasks = (0..5).map(|i| {
            let limiter = limiter.clone();
            let started = started.clone();
            async move {
                limiter
                    .run(|| async {
                        started.lock().unwrap().push(i);
                        tokio::task::yield_now().await;
                    })
                    .await
                    .unwrap();
            }
        });
        join_all(tasks).await;

        assert_eq!(*started.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_other_tasks() {
        let limiter = ConcurrencyLimiter::new(2).unwrap();

        let tasks = (0..4).map(|i| {
            let limiter = limiter.clone();
            async move {
                limiter
                    .run(|| async move {
                        if i == 1 {
                            Err(format!("task {} failed", i))
                        } else {
                            Ok(i)
                        }
                    })
                    .await
                    .unwrap()
            }
        });
        let results = join_all(tasks).await;

        assert_eq!(results[0], Ok(0));
        assert!(results[1].is_err());
        assert_eq!(results[2], Ok(2));
        assert_eq!(results[3], Ok(3));
        assert_eq!(limiter.active(), 0);
    }
}
