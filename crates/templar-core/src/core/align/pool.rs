use super::SequenceAligner;
use crate::core::models::alignment::{AlignmentError, PairwiseAlignment, SequenceRecord};
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::trace;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counting semaphore over aligner invocations, with a registry of the worker
/// tokens currently holding a slot.
#[derive(Debug)]
pub struct AlignerPool {
    capacity: usize,
    slots: Mutex<usize>,
    available: Condvar,
    active: Mutex<HashMap<String, usize>>,
}

impl AlignerPool {
    /// Creates a pool with `capacity` slots. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            slots: Mutex::new(capacity),
            available: Condvar::new(),
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots at this instant.
    pub fn available(&self) -> usize {
        *lock(&self.slots)
    }

    /// Tokens currently holding at least one slot, sorted.
    pub fn active_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = lock(&self.active).keys().cloned().collect();
        tokens.sort();
        tokens
    }

    /// Blocks until a slot is free and registers `token` as its holder.
    pub fn acquire(&self, token: &str) -> PoolPermit<'_> {
        let mut slots = lock(&self.slots);
        while *slots == 0 {
            slots = self
                .available
                .wait(slots)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *slots -= 1;
        drop(slots);

        *lock(&self.active).entry(token.to_string()).or_insert(0) += 1;
        trace!(token, "Aligner slot acquired.");
        PoolPermit {
            pool: self,
            token: token.to_string(),
        }
    }

    fn release(&self, token: &str) {
        {
            let mut active = lock(&self.active);
            if let Some(count) = active.get_mut(token) {
                *count -= 1;
                if *count == 0 {
                    active.remove(token);
                }
            }
        }
        *lock(&self.slots) += 1;
        self.available.notify_one();
        trace!(token, "Aligner slot released.");
    }
}

/// A held slot. Dropping it returns the slot, also during unwinding.
#[derive(Debug)]
pub struct PoolPermit<'a> {
    pool: &'a AlignerPool,
    token: String,
}

impl Drop for PoolPermit<'_> {
    fn drop(&mut self) {
        self.pool.release(&self.token);
    }
}

/// An aligner whose calls are throttled by a shared [`AlignerPool`].
#[derive(Debug, Clone)]
pub struct PooledAligner<A> {
    inner: A,
    pool: Arc<AlignerPool>,
    token: String,
}

impl<A: SequenceAligner> PooledAligner<A> {
    pub fn new(inner: A, pool: Arc<AlignerPool>, token: impl Into<String>) -> Self {
        Self {
            inner,
            pool,
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl<A: SequenceAligner> SequenceAligner for PooledAligner<A> {
    fn align(
        &self,
        query: &SequenceRecord,
        target: &SequenceRecord,
    ) -> Result<PairwiseAlignment, AlignmentError> {
        let _permit = self.pool.acquire(&self.token);
        self.inner.align(query, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::align::global::GlobalAligner;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn permits_are_returned_on_drop() {
        let pool = AlignerPool::new(2);
        {
            let _a = pool.acquire("w1");
            let _b = pool.acquire("w2");
            assert_eq!(pool.available(), 0);
            assert_eq!(pool.active_tokens(), vec!["w1", "w2"]);
        }
        assert_eq!(pool.available(), 2);
        assert!(pool.active_tokens().is_empty());
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        assert_eq!(AlignerPool::new(0).capacity(), 1);
    }

    #[test]
    fn permit_is_released_when_the_holder_panics() {
        let pool = AlignerPool::new(1);
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _permit = pool.acquire("w1");
            panic!("aligner crashed");
        }));
        assert!(result.is_err());
        assert_eq!(pool.available(), 1);
        assert!(pool.active_tokens().is_empty());
    }

    struct SlowAligner {
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl SequenceAligner for SlowAligner {
        fn align(
            &self,
            query: &SequenceRecord,
            target: &SequenceRecord,
        ) -> Result<PairwiseAlignment, AlignmentError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            self.running.fetch_sub(1, Ordering::SeqCst);
            GlobalAligner::default().align(query, target)
        }
    }

    #[test]
    fn concurrent_calls_never_exceed_capacity() {
        let pool = Arc::new(AlignerPool::new(2));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let aligner = PooledAligner::new(
                    SlowAligner {
                        running: Arc::clone(&running),
                        peak: Arc::clone(&peak),
                    },
                    Arc::clone(&pool),
                    format!("worker-{i}"),
                );
                thread::spawn(move || {
                    aligner
                        .align(
                            &SequenceRecord::new("q", "ACDEFG"),
                            &SequenceRecord::new("s", "ACDEFG"),
                        )
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.available(), 2);
    }
}
