//! Bounded worker pool over a shared cursor.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;

/// Runs `f` over every item with at most `limit` calls in flight.
///
/// `min(limit, items.len())` workers each claim the next unprocessed index
/// from one atomic cursor, run it to completion, then claim again. Every
/// item is processed exactly once and results come back in input order.
/// A `limit` of zero is treated as one.
pub async fn run_bounded<'a, T, R, F, Fut>(items: &'a [T], limit: usize, f: F) -> Vec<R>
where
    F: Fn(usize, &'a T) -> Fut,
    Fut: Future<Output = R>,
{
    if items.is_empty() {
        return Vec::new();
    }

    let workers = limit.clamp(1, items.len());
    let cursor = AtomicUsize::new(0);
    let cursor = &cursor;
    let f = &f;

    let batches = join_all((0..workers).map(|_| async move {
        let mut done = Vec::new();
        loop {
            let index = cursor.fetch_add(1, Ordering::SeqCst);
            let Some(item) = items.get(index) else {
                break;
            };
            done.push((index, f(index, item).await));
        }
        done
    }))
    .await;

    let mut results: Vec<(usize, R)> = batches.into_iter().flatten().collect();
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}
