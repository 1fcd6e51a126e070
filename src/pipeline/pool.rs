use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use indicatif::ProgressBar;
use tokio::{sync::Mutex, task::JoinSet};

use crate::{debug, pipeline::Fetcher, types::FetchOutcome, warning};

type Outcomes<I, T> = Arc<Mutex<Vec<(I, FetchOutcome<T>)>>>;

/// Everything one stage produced, available once all its workers joined.
#[derive(Debug)]
pub struct StageOutput<I, T> {
    /// `(item, outcome)` pairs in completion order.
    pub outcomes: Vec<(I, FetchOutcome<T>)>,
    /// Set when a fetcher reported `RateLimited`; the queue was drained and
    /// nothing observed after the signal was recorded.
    pub rate_limited: bool,
    /// Workers that ended in a panic instead of an empty queue.
    pub failed_workers: usize,
}

/// Runs `concurrency` workers over `queue` until it is empty and returns
/// once every worker has exited.
///
/// Each worker pops one item at a time, calls `fetcher`, and appends the
/// result to the stage's output list. Workers never retry. The first
/// `RateLimited` outcome raises the stage's abort flag and drains the queue
/// so the remaining workers stop after their current item.
pub async fn run_stage<F>(
    stage: &str,
    queue: &crate::pipeline::WorkQueue<F::Item>,
    fetcher: Arc<F>,
    concurrency: usize,
    progress: &ProgressBar,
) -> StageOutput<F::Item, F::Output>
where
    F: Fetcher + ?Sized + 'static,
{
    let output: Outcomes<F::Item, F::Output> = Arc::new(Mutex::new(Vec::new()));
    let aborted = Arc::new(AtomicBool::new(false));

    let mut workers = JoinSet::new();
    for index in 0..concurrency.max(1) {
        let name = format!("{stage}.{index}");
        let queue = queue.clone();
        let fetcher = Arc::clone(&fetcher);
        let output = Arc::clone(&output);
        let aborted = Arc::clone(&aborted);
        let progress = progress.clone();

        workers.spawn(async move {
            debug!("[WORKER::{}] Started", name);

            while !aborted.load(Ordering::SeqCst) {
                let Some(item) = queue.pop().await else {
                    break;
                };
                debug!("[WORKER::{}] {} items left", name, queue.len().await);

                let outcome = fetcher.fetch(&item).await;
                progress.inc(1);

                let mut list = output.lock().await;
                if outcome.is_rate_limited() {
                    let first = !aborted.swap(true, Ordering::SeqCst);
                    list.push((item, outcome));
                    drop(list);

                    if first {
                        let dropped = queue.drain_all().await;
                        debug!(
                            "[WORKER::{}] Rate limited by {}, dropped {} pending items",
                            name,
                            fetcher.name(),
                            dropped
                        );
                    }
                    break;
                }

                if aborted.load(Ordering::SeqCst) {
                    break;
                }
                list.push((item, outcome));
            }

            debug!("[WORKER::{}] Finished", name);
        });
    }

    let mut failed_workers = 0;
    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            warning!("A {} worker stopped unexpectedly: {}", stage, e);
            failed_workers += 1;
        }
    }

    let outcomes = std::mem::take(&mut *output.lock().await);
    StageOutput {
        outcomes,
        rate_limited: aborted.load(Ordering::SeqCst),
        failed_workers,
    }
}
