use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cache::{Claim, CooldownStore};
use crate::error::{AttemptError, BoxError, StoreError};
use crate::metrics::{
    ACTION_FAILURES, ATTEMPT_LATENCY, ATTEMPTS_EXECUTED, ATTEMPTS_SUPPRESSED, STORE_ERRORS,
};

// What happened to an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T> {
    /// This caller won the window and the action ran.
    Executed(T),
    /// Another attempt holds the window; retry after the given time.
    Suppressed(Duration),
}

/// Runs an action at most once per key per cooldown window.
///
/// The window is claimed through the store's atomic set-if-absent before the
/// action runs, so racing callers on the same key get exactly one winner.
/// Any store failure fails closed.
#[derive(Clone)]
pub struct RateLimitedAction {
    store: Arc<dyn CooldownStore>,
    store_timeout: Duration,
}

impl RateLimitedAction {
    pub fn new(store: Arc<dyn CooldownStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub async fn attempt<F, Fut, T, E>(
        &self,
        key: &str,
        window: Duration,
        action: F,
    ) -> Result<AttemptOutcome<T>, AttemptError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        if key.is_empty() {
            return Err(AttemptError::InvalidArgument("cooldown key must not be empty".to_string()));
        }
        if window.is_zero() {
            return Err(AttemptError::InvalidArgument("cooldown window must be positive".to_string()));
        }
        if tokio::time::Instant::now().checked_add(window).is_none() {
            return Err(AttemptError::InvalidArgument("cooldown window too large".to_string()));
        }

        let start_time = Instant::now();

        let claim = match timeout(self.store_timeout, self.store.set_if_absent(key, window)).await {
            Ok(Ok(claim)) => claim,
            Ok(Err(e)) => {
                STORE_ERRORS.inc();
                warn!(key, error = %e, "Cooldown store failed, refusing action");
                return Err(AttemptError::StoreUnavailable(e));
            }
            Err(_) => {
                STORE_ERRORS.inc();
                warn!(key, timeout = ?self.store_timeout, "Cooldown store timed out, refusing action");
                return Err(AttemptError::StoreUnavailable(StoreError::Timeout(self.store_timeout)));
            }
        };
        ATTEMPT_LATENCY.observe(start_time.elapsed().as_secs_f64());

        match claim {
            Claim::Held { remaining } => {
                ATTEMPTS_SUPPRESSED.inc();
                debug!(key, remaining_ms = remaining.as_millis() as u64, "Attempt suppressed");
                Ok(AttemptOutcome::Suppressed(remaining))
            }
            Claim::Acquired => match action().await {
                Ok(value) => {
                    ATTEMPTS_EXECUTED.inc();
                    debug!(key, "Attempt executed");
                    Ok(AttemptOutcome::Executed(value))
                }
                Err(e) => {
                    ACTION_FAILURES.inc();
                    let e: BoxError = e.into();
                    warn!(key, error = %e, "Action failed, cooldown kept");
                    Err(AttemptError::ActionFailed(e))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownStore;

    #[async_trait]
    impl CooldownStore for DownStore {
        async fn set_if_absent(&self, _key: &str, _ttl: Duration) -> Result<Claim, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    struct HangingStore;

    #[async_trait]
    impl CooldownStore for HangingStore {
        async fn set_if_absent(&self, _key: &str, _ttl: Duration) -> Result<Claim, StoreError> {
            std::future::pending().await
        }
    }

    fn limiter() -> RateLimitedAction {
        RateLimitedAction::new(Arc::new(MemoryCache::new()), Duration::from_millis(500))
    }

    async fn ok_action(counter: &AtomicUsize) -> Result<usize, BoxError> {
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test]
    async fn first_attempt_executes_once() {
        let limiter = limiter();
        let runs = AtomicUsize::new(0);

        let outcome = limiter
            .attempt("user:42", Duration::from_secs(3), || ok_action(&runs))
            .await
            .unwrap();

        assert_eq!(outcome, AttemptOutcome::Executed(1));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn back_to_back_attempts_suppress_the_second() {
        let limiter = limiter();
        let runs = AtomicUsize::new(0);
        let window = Duration::from_secs(3);

        let first = limiter.attempt("user:42", window, || ok_action(&runs)).await.unwrap();
        let second = limiter.attempt("user:42", window, || ok_action(&runs)).await.unwrap();

        assert!(matches!(first, AttemptOutcome::Executed(_)));
        match second {
            AttemptOutcome::Suppressed(remaining) => assert!(remaining <= window),
            other => panic!("expected Suppressed, got {:?}", other),
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn window_timeline() {
        let limiter = limiter();
        let runs = AtomicUsize::new(0);
        let window = Duration::from_secs(3);

        let at_0 = limiter.attempt("user:42", window, || ok_action(&runs)).await.unwrap();
        assert!(matches!(at_0, AttemptOutcome::Executed(_)));

        tokio::time::advance(Duration::from_secs(1)).await;
        let at_1 = limiter.attempt("user:42", window, || ok_action(&runs)).await.unwrap();
        assert_eq!(at_1, AttemptOutcome::Suppressed(Duration::from_secs(2)));

        tokio::time::advance(Duration::from_secs(3)).await;
        let at_4 = limiter.attempt("user:42", window, || ok_action(&runs)).await.unwrap();
        assert_eq!(at_4, AttemptOutcome::Executed(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_attempts_have_one_winner() {
        let limiter = limiter();
        let runs = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(tokio::sync::Barrier::new(32));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let limiter = limiter.clone();
            let runs = Arc::clone(&runs);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                limiter
                    .attempt("user:7", Duration::from_secs(30), || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, BoxError>(())
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut executed = 0;
        let mut suppressed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                AttemptOutcome::Executed(()) => executed += 1,
                AttemptOutcome::Suppressed(_) => suppressed += 1,
            }
        }

        assert_eq!(executed, 1);
        assert_eq!(suppressed, 31);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn distinct_keys_never_suppress_each_other() {
        let limiter = limiter();

        let mut handles = Vec::new();
        for i in 0..16 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("user:{}", i);
                limiter
                    .attempt(&key, Duration::from_secs(30), || async { Ok::<_, BoxError>(()) })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), AttemptOutcome::Executed(()));
        }
    }

    #[tokio::test]
    async fn unreachable_store_fails_closed() {
        let limiter = RateLimitedAction::new(Arc::new(DownStore), Duration::from_millis(500));
        let runs = AtomicUsize::new(0);

        let err = limiter
            .attempt("user:42", Duration::from_secs(3), || ok_action(&runs))
            .await
            .unwrap_err();

        assert!(matches!(err, AttemptError::StoreUnavailable(StoreError::Unavailable(_))));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_times_out_and_fails_closed() {
        let limiter = RateLimitedAction::new(Arc::new(HangingStore), Duration::from_millis(200));
        let runs = AtomicUsize::new(0);

        let err = limiter
            .attempt("user:42", Duration::from_secs(3), || ok_action(&runs))
            .await
            .unwrap_err();

        assert!(matches!(err, AttemptError::StoreUnavailable(StoreError::Timeout(_))));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_action_keeps_the_cooldown() {
        let limiter = limiter();
        let window = Duration::from_secs(3);

        let err = limiter
            .attempt("user:42", window, || async { Err::<(), _>("smtp down") })
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::ActionFailed(_)));

        let retry = limiter
            .attempt("user:42", window, || async { Ok::<_, BoxError>(()) })
            .await
            .unwrap();
        assert!(matches!(retry, AttemptOutcome::Suppressed(_)));
    }

    #[tokio::test]
    async fn rejects_empty_key_and_zero_window() {
        let limiter = limiter();
        let runs = AtomicUsize::new(0);

        let empty_key = limiter
            .attempt("", Duration::from_secs(3), || ok_action(&runs))
            .await
            .unwrap_err();
        assert!(matches!(empty_key, AttemptError::InvalidArgument(_)));

        let zero_window = limiter
            .attempt("user:42", Duration::ZERO, || ok_action(&runs))
            .await
            .unwrap_err();
        assert!(matches!(zero_window, AttemptError::InvalidArgument(_)));

        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_unrepresentable_window() {
        let limiter = limiter();
        let runs = AtomicUsize::new(0);

        let err = limiter
            .attempt("user:42", Duration::MAX, || ok_action(&runs))
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::InvalidArgument(_)));
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        // nothing was claimed, a sane window still runs
        let outcome = limiter
            .attempt("user:42", Duration::from_secs(3), || ok_action(&runs))
            .await
            .unwrap();
        assert_eq!(outcome, AttemptOutcome::Executed(1));
    }
}
