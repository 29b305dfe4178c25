//! Admission control for concurrent file reads
//!
//! Bounds the number of concurrently in-flight read operations regardless
//! of how many files the walk discovers, preventing file-handle exhaustion
//! on trees with many thousands of reports. Operations past the ceiling
//! wait in FIFO order; nothing is ever dropped and the wait queue is
//! unbounded.
//!
//! One controller instance per run, injected into every read site.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Default ceiling on concurrently admitted operations
pub const DEFAULT_MAX_IN_FLIGHT: usize = 100;

/// Caps concurrently running operations at a fixed ceiling with FIFO
/// queueing of the excess.
#[derive(Debug)]
pub struct AdmissionController {
    permits: Semaphore,
    ceiling: usize,
    in_flight: AtomicUsize,
}

impl AdmissionController {
    /// Create a controller with the given ceiling. The ceiling must be at
    /// least 1; configuration validation enforces this upstream.
    pub fn new(ceiling: usize) -> Self {
        debug_assert!(ceiling >= 1);
        Self {
            permits: Semaphore::new(ceiling),
            ceiling,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The configured ceiling
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Number of operations currently admitted
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run `operation` once a slot is free. Runs immediately when fewer
    /// than `ceiling` operations are in flight; otherwise waits behind
    /// earlier callers in arrival order. Completion of the operation frees
    /// the slot for the oldest waiter.
    pub async fn admit<F>(&self, operation: F) -> F::Output
    where
        F: Future,
    {
        // Tokio semaphores are fair: queued acquires resolve FIFO.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("admission semaphore closed");

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let output = operation.await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        output
    }
}
