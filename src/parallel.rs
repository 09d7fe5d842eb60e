// =============================================================================
// Bounded Ordered Map: fan-out / fan-in with a concurrency cap
// =============================================================================
//
// Runs one async job per `(key, item)` pair with at most `limit` job bodies
// in flight, collects completions as they arrive, and returns the results
// sorted by key.  The output order therefore never depends on which job
// finished first.
//
// Each job is its own tokio task: a job that panics is reported through
// `on_failure(&key)` and its siblings keep running.
// =============================================================================

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Map `job` over `items` with at most `limit` concurrent bodies and return
/// `(key, result)` pairs in ascending key order.
///
/// `limit` is clamped to at least 1.  Duplicate keys are kept (stable order
/// among equal keys is completion order).
pub async fn map_ordered<K, T, R, F, Fut>(
    items: impl IntoIterator<Item = (K, T)>,
    limit: usize,
    job: F,
    on_failure: impl Fn(&K) -> R,
) -> Vec<(K, R)>
where
    K: Ord + Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();

    for (key, item) in items {
        let fut = job(item);
        let permits = semaphore.clone();
        tasks.spawn(async move {
            // The semaphore is never closed, so acquire only fails if it were.
            let _permit = permits.acquire_owned().await.ok();
            // Inner task so a panicking job surfaces as a JoinError here
            // instead of losing its key.
            (key, tokio::spawn(fut).await)
        });
    }

    let total = tasks.len();
    let mut results = Vec::with_capacity(total);

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((key, Ok(result))) => results.push((key, result)),
            Ok((key, Err(e))) => {
                warn!(error = %e, "job failed, substituting fallback result");
                let fallback = on_failure(&key);
                results.push((key, fallback));
            }
            Err(e) => warn!(error = %e, "dispatch task aborted"),
        }
    }

    debug!(total, collected = results.len(), "bounded map complete");
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
