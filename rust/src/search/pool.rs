//! Bounded worker pool for independent, pure evaluations.
//!
//! Workers pull item indices from a shared counter and results are written
//! back by index, so the output order always matches the input order.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crate::log_debug;

use super::guard::{SearchError, SearchGuard};

/// Apply `f` to every item on at most `workers` threads.
///
/// The guard is polled before each item. On the first failure the remaining
/// workers stop picking up new items and the error is returned.
pub fn map_bounded<T, R, F>(
    items: &[T],
    workers: usize,
    guard: &SearchGuard,
    verbosity: u8,
    f: F,
) -> Result<Vec<R>, SearchError>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let workers = workers.max(1).min(items.len());
    if workers <= 1 {
        return items
            .iter()
            .map(|item| {
                guard.check()?;
                Ok(f(item))
            })
            .collect();
    }

    log_debug!(
        verbosity,
        "    Pool: {} items on {} workers",
        items.len(),
        workers
    );

    let next = &AtomicUsize::new(0);
    let abort = &AtomicBool::new(false);
    let f = &f;

    let outcomes: Vec<Result<Vec<(usize, R)>, SearchError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut local = Vec::new();
                    loop {
                        if abort.load(Ordering::Relaxed) {
                            return Ok(local);
                        }
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        if i >= items.len() {
                            return Ok(local);
                        }
                        if let Err(err) = guard.check() {
                            abort.store(true, Ordering::Relaxed);
                            return Err(err);
                        }
                        local.push((i, f(&items[i])));
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    });

    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    for outcome in outcomes {
        for (i, result) in outcome? {
            slots[i] = Some(result);
        }
    }
    Ok(slots.into_iter().flatten().collect())
}
