// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunked, concurrency-bounded fan-out executor.
//!
//! Items are split into consecutive chunks of `batch_size`. Every member of
//! a chunk runs concurrently; the next chunk starts only once the whole
//! chunk has settled, after a fixed pacing delay. A failing item never
//! affects its neighbours.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, trace};

use crate::control::RunControl;

/// Chunk size and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Items in flight per chunk. Zero behaves like one.
    pub batch_size: usize,
    /// Sleep between chunks, skipped after the last one.
    pub delay_between_chunks: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay_between_chunks: Duration::from_millis(200),
        }
    }
}

/// Callbacks fired as items settle. Both default to no-ops.
pub trait BatchObserver<T, E> {
    /// Called once per settled item; `error` is `None` on success.
    fn on_item_complete(&self, _item: &T, _error: Option<&E>) {}

    /// Called after every settled item with the running count.
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

impl<T, E> BatchObserver<T, E> for () {}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure<T, E> {
    pub item: T,
    pub error: E,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<T, E> {
    pub successful: Vec<T>,
    pub failed: Vec<BatchFailure<T, E>>,
}

impl<T, E> BatchResult<T, E> {
    pub fn settled(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

impl<T, E> Default for BatchResult<T, E> {
    fn default() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Runs `operation` over `items` in concurrent chunks.
///
/// Before each chunk and each item the run control is checked; once it is
/// cancelled no further items are launched, but members of the current
/// chunk that already started are awaited. Items never launched appear in
/// neither result list.
pub async fn process_batch<T, E, F, Fut, O>(
    items: Vec<T>,
    operation: F,
    options: &BatchOptions,
    control: &RunControl,
    observer: &O,
) -> BatchResult<T, E>
where
    T: Clone,
    E: Display,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    O: BatchObserver<T, E> + ?Sized,
{
    let mut result = BatchResult::default();
    let total = items.len();
    if total == 0 {
        return result;
    }

    let batch_size = options.batch_size.max(1);
    let mut completed = 0;
    let mut remaining = items.into_iter().peekable();
    let mut chunk_index = 0;

    while remaining.peek().is_some() {
        if control.is_cancelled() {
            debug!(chunk = chunk_index, "run cancelled, not starting chunk");
            break;
        }

        let mut in_flight = FuturesUnordered::new();
        for item in remaining.by_ref().take(batch_size) {
            if control.is_cancelled() {
                break;
            }
            let fut = operation(item.clone());
            in_flight.push(async move { (item, fut.await) });
        }
        trace!(chunk = chunk_index, size = in_flight.len(), "chunk dispatched");

        while let Some((item, outcome)) = in_flight.next().await {
            completed += 1;
            match outcome {
                Ok(()) => {
                    observer.on_item_complete(&item, None);
                    result.successful.push(item);
                }
                Err(error) => {
                    trace!(error = %error, "item failed");
                    observer.on_item_complete(&item, Some(&error));
                    result.failed.push(BatchFailure { item, error });
                }
            }
            observer.on_progress(completed, total);
        }

        chunk_index += 1;
        if remaining.peek().is_some() && !control.is_cancelled() {
            tokio::time::sleep(options.delay_between_chunks).await;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Default)]
    struct Recorder {
        progress: Mutex<Vec<(usize, usize)>>,
        completions: Mutex<Vec<(u32, bool)>>,
    }

    impl BatchObserver<u32, String> for Recorder {
        fn on_item_complete(&self, item: &u32, error: Option<&String>) {
            self.completions.lock().unwrap().push((*item, error.is_none()));
        }

        fn on_progress(&self, completed: usize, total: usize) {
            self.progress.lock().unwrap().push((completed, total));
        }
    }

    fn options(batch_size: usize) -> BatchOptions {
        BatchOptions {
            batch_size,
            delay_between_chunks: Duration::from_millis(300),
        }
    }

    #[tokio::test]
    async fn empty_input_fires_nothing() {
        let recorder = Recorder::default();
        let result = process_batch(
            Vec::<u32>::new(),
            |_| async { Ok::<(), String>(()) },
            &options(3),
            &RunControl::new(),
            &recorder,
        )
        .await;
        assert!(result.successful.is_empty() && result.failed.is_empty());
        assert!(recorder.progress.lock().unwrap().is_empty());
        assert!(recorder.completions.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn seven_items_run_in_chunks_of_three() {
        let recorder = Recorder::default();
        let origin = Instant::now();
        let starts = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&starts);

        let result = process_batch(
            (1..=7).collect(),
            move |item: u32| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push((item, origin.elapsed()));
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok::<(), String>(())
                }
            },
            &options(3),
            &RunControl::new(),
            &recorder,
        )
        .await;

        assert_eq!(result.successful.len(), 7);
        let starts = starts.lock().unwrap();
        let mut chunks: Vec<Vec<u32>> = Vec::new();
        let mut last = None;
        for (item, at) in starts.iter() {
            if last != Some(*at) {
                chunks.push(Vec::new());
                last = Some(*at);
            }
            chunks.last_mut().unwrap().push(*item);
        }
        let sizes: Vec<_> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        // 100ms of work per chunk plus 300ms pacing between chunks.
        assert_eq!(starts[3].1, Duration::from_millis(400));
        assert_eq!(starts[6].1, Duration::from_millis(800));

        let progress = recorder.progress.lock().unwrap();
        let completed: Vec<_> = progress.iter().map(|(c, _)| *c).collect();
        assert_eq!(completed, (1..=7).collect::<Vec<_>>());
        assert!(progress.iter().all(|(_, total)| *total == 7));
    }

    #[tokio::test]
    async fn failures_do_not_abort_neighbours() {
        let recorder = Recorder::default();
        let result = process_batch(
            vec![1, 2, 3, 4],
            |item: u32| async move {
                if item % 2 == 0 {
                    Err(format!("item {item} failed"))
                } else {
                    Ok(())
                }
            },
            &options(2),
            &RunControl::new(),
            &recorder,
        )
        .await;

        let mut ok = result.successful.clone();
        ok.sort();
        assert_eq!(ok, vec![1, 3]);
        let mut failed: Vec<_> = result.failed.iter().map(|f| f.item).collect();
        failed.sort();
        assert_eq!(failed, vec![2, 4]);
        assert!(result.failed.iter().all(|f| f.error.ends_with("failed")));
        assert_eq!(recorder.completions.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_lets_current_chunk_finish() {
        let control = RunControl::new();
        let trigger = control.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = process_batch(
            (1..=9).collect::<Vec<u32>>(),
            move |item: u32| {
                let counter = Arc::clone(&counter);
                let trigger = trigger.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if item == 2 {
                        trigger.cancel();
                    }
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<(), String>(())
                }
            },
            &options(3),
            &control,
            &(),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.successful.len(), 3);
    }

    #[test]
    fn concurrency_never_exceeds_batch_size() {
        use proptest::prelude::*;

        proptest!(ProptestConfig::with_cases(32), |(batch_size in 1usize..6, count in 0u32..20)| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();
            let max_seen = runtime.block_on(async {
                let in_flight = Arc::new(AtomicUsize::new(0));
                let max_seen = Arc::new(AtomicUsize::new(0));
                let (flight, peak) = (Arc::clone(&in_flight), Arc::clone(&max_seen));
                process_batch(
                    (0..count).collect(),
                    move |item: u32| {
                        let (flight, peak) = (Arc::clone(&flight), Arc::clone(&peak));
                        async move {
                            let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10 + u64::from(item % 3))).await;
                            flight.fetch_sub(1, Ordering::SeqCst);
                            Ok::<(), String>(())
                        }
                    },
                    &BatchOptions { batch_size, delay_between_chunks: Duration::from_millis(5) },
                    &RunControl::new(),
                    &(),
                )
                .await;
                max_seen.load(Ordering::SeqCst)
            });
            prop_assert!(max_seen <= batch_size);
        });
    }
}
