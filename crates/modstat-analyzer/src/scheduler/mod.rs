//! Fixed-size worker pool over an immutable work list
//!
//! Workers claim items by atomically bumping a shared index, so every item is
//! handed out exactly once without a lock around the list.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use modstat_core::error::ModstatError;
use tokio::task::JoinSet;
use tracing::trace;

use crate::AnalyzerResult;

/// Number of packages analyzed concurrently unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Process every item with `worker` using `worker_count` concurrent tasks.
///
/// Returns once all workers have drained the list. Results come back in no
/// particular order. Ordinary failures should be part of `R`. When panics
/// unwind (dev and test builds), a panicking worker fails the whole call with
/// [`ModstatError::Worker`]. Release builds use `panic = "abort"`, so there a
/// worker panic ends the process instead.
pub async fn run_bounded<T, R, F, Fut>(
    worker_count: usize,
    items: Vec<T>,
    worker: F,
) -> AnalyzerResult<Vec<R>>
where
    T: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = items.len();
    let items: Arc<[T]> = items.into();
    let next = Arc::new(AtomicUsize::new(0));
    let worker = Arc::new(worker);
    let workers = worker_count.max(1).min(total.max(1));

    let mut tasks = JoinSet::new();
    for id in 0..workers {
        let items = Arc::clone(&items);
        let next = Arc::clone(&next);
        let worker = Arc::clone(&worker);

        tasks.spawn(async move {
            let mut results = Vec::new();
            loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(item) = items.get(index) else {
                    break;
                };
                results.push(worker(item.clone()).await);
            }
            trace!("worker {} finished after {} items", id, results.len());
            results
        });
    }

    let mut all = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let results = joined.map_err(|e| ModstatError::Worker {
            message: e.to_string(),
        })?;
        all.extend(results);
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_every_item_processed_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let items: Vec<u64> = (0..50).collect();

        let results = {
            let calls = calls.clone();
            let seen = seen.clone();
            run_bounded(4, items, move |item| {
                let calls = calls.clone();
                let seen = seen.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    // Mix of slow and fast items.
                    let delay = if item % 3 == 0 { 5 } else { 0 };
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    seen.lock().unwrap().push(item);
                    item * 2
                }
            })
            .await
            .unwrap()
        };

        assert_eq!(calls.load(Ordering::SeqCst), 50);
        assert_eq!(results.len(), 50);

        let seen = seen.lock().unwrap();
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), 50);

        let mut doubled = results.clone();
        doubled.sort_unstable();
        assert_eq!(doubled, (0..50).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_worker_count() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (in_flight_c, peak_c) = (in_flight.clone(), peak.clone());
        run_bounded(3, (0..20).collect::<Vec<u32>>(), move |_| {
            let in_flight = in_flight_c.clone();
            let peak = peak_c.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await
        .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_queue_and_oversized_pool() {
        let results: Vec<u8> = run_bounded(10, Vec::<u8>::new(), |item| async move { item })
            .await
            .unwrap();
        assert!(results.is_empty());

        let results = run_bounded(10, vec!["only"], |item| async move { item.len() })
            .await
            .unwrap();
        assert_eq!(results, vec![4]);
    }

    #[tokio::test]
    async fn test_zero_workers_still_drains_queue() {
        let results = run_bounded(0, vec![1, 2, 3], |item: i32| async move { item })
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_worker_panic_is_reported() {
        let result = run_bounded(2, vec![1, 2, 3], |item: i32| async move {
            if item == 2 {
                panic!("boom");
            }
            item
        })
        .await;
        assert!(matches!(result, Err(ModstatError::Worker { .. })));
    }
}
