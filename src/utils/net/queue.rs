//! Request queue
//!
//! Bounds the number of in-flight backend requests with a fair semaphore so
//! a burst of cache misses cannot stampede the analysis service. Permits are
//! granted in arrival order.

use crate::utils::error::{Result, WoundsightError};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Semaphore;

/// Point-in-time counters for the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    /// Requests handed to the queue since startup
    pub submitted: u64,
    /// Requests that finished, successfully or not
    pub completed: u64,
    /// Requests currently holding a permit
    pub in_flight: u64,
    /// Requests waiting for a permit
    pub waiting: u64,
}

/// Fair concurrency gate for outbound requests
#[derive(Debug)]
pub struct RequestQueue {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    submitted: AtomicU64,
    completed: AtomicU64,
    in_flight: AtomicU64,
}

impl RequestQueue {
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run `fut` once a permit is available. Tokio's semaphore queues
    /// waiters fairly, so requests start in the order they were submitted.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| WoundsightError::internal("request queue closed"))?;

        self.in_flight.fetch_add(1, Ordering::Relaxed);
        let result = fut.await;
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed);

        result
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let submitted = self.submitted.load(Ordering::Relaxed);
        let completed = self.completed.load(Ordering::Relaxed);
        let in_flight = self.in_flight.load(Ordering::Relaxed);
        QueueSnapshot {
            submitted,
            completed,
            in_flight,
            waiting: submitted.saturating_sub(completed).saturating_sub(in_flight),
        }
    }
}
