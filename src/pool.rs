//! Bounded fan-out/fan-in worker pool.
//!
//! Every concurrent stage (fd link resolution, per-process discovery and
//! page-cache analysis) has the same shape: a queue filled up front and
//! closed, `N` workers draining it, and one shared [`Accumulator`] that the
//! workers append to. [`fan_out`] returns only after every worker has
//! finished, so stages never overlap.

use std::sync::{Mutex, PoisonError};
use std::thread;

use crossbeam_channel::bounded;

/// Append-only collection shared by the workers of one stage.
///
/// Appends take the lock only for the push itself; callers do their I/O
/// before calling [`Accumulator::push`].
#[derive(Debug, Default)]
pub struct Accumulator<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Accumulator<T> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Creates an empty accumulator with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends one item.
    pub fn push(&self, item: T) {
        self.lock().push(item);
    }

    /// Consumes the accumulator, returning items in append order.
    pub fn into_inner(self) -> Vec<T> {
        self.items
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        // A panicking worker tears down the whole scope anyway; the Vec
        // itself is never left half-written by push/extend.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `work` over every item using `workers` threads.
///
/// The queue is pre-filled with all `items` and closed before any worker
/// starts. Each call of `work` receives one item and the shared accumulator
/// and decides what, if anything, to append. Returns the accumulated items
/// once all workers have drained the queue; their order depends on
/// scheduling.
pub fn fan_out<I, R, F>(items: Vec<I>, workers: usize, work: F) -> Vec<R>
where
    I: Send,
    R: Send,
    F: Fn(I, &Accumulator<R>) + Sync,
{
    let acc = Accumulator::with_capacity(items.len());
    if items.is_empty() {
        return acc.into_inner();
    }

    let workers = workers.clamp(1, items.len());
    let (sender, receiver) = bounded(items.len());
    for item in items {
        // Capacity equals the item count and the receiver is alive: never fails.
        let _ = sender.send(item);
    }
    drop(sender);

    thread::scope(|scope| {
        for _ in 0..workers {
            let receiver = receiver.clone();
            let acc = &acc;
            let work = &work;
            scope.spawn(move || {
                for item in receiver.iter() {
                    work(item, acc);
                }
            });
        }
    });

    acc.into_inner()
}
