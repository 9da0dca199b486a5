//! Bounded-concurrency probe pool.

use std::future::Future;
use std::sync::Arc;

use lessonhub_shared::Availability;
use lessonhub_shared::config::MAX_PROBE_CONCURRENCY;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Run `worker` over `items` with at most `concurrency` in flight.
///
/// Results land at the index of their input. A worker that panics yields
/// [`Availability::Unknown`] for its slot. `on_result(done, total)` is
/// called once per finished item, in completion order.
pub async fn probe_pool<T, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    worker: F,
    mut on_result: impl FnMut(usize, usize),
) -> Vec<Availability>
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Availability> + Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.clamp(1, MAX_PROBE_CONCURRENCY)));

    let mut tasks = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let sem = semaphore.clone();
        let task = worker(item);
        tasks.spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return (index, Availability::Unknown);
            };
            (index, task.await)
        });
    }

    let mut results = vec![Availability::Unknown; total];
    let mut done = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, availability)) => results[index] = availability,
            Err(e) => warn!(error = %e, "probe task failed"),
        }
        done += 1;
        on_result(done, total);
    }
    results
}
