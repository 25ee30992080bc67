//! Concurrency limiter bounding simultaneously running tasks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Admits at most `max` holders at once.
///
/// Uses a lock-free `AtomicU32` with a CAS reservation loop, so the
/// check-and-increment at dispatch time is atomic. Slots are returned by
/// dropping the [`WorkerPermit`].
///
/// `warm_capacity` mirrors the pool's `min_workers`. It is reported only:
/// this is a bounded pool, not an elastic one, and nothing is pre-spawned.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    warm_capacity: u32,
    max: u32,
    active: Arc<AtomicU32>,
}

/// One reserved execution slot; released on drop.
#[derive(Debug)]
pub struct WorkerPermit {
    active: Arc<AtomicU32>,
}

impl ConcurrencyLimiter {
    /// Create a limiter admitting up to `max` concurrent holders.
    #[must_use]
    pub fn new(warm_capacity: u32, max: u32) -> Self {
        Self {
            warm_capacity,
            max,
            active: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Try to reserve a slot atomically using a CAS loop.
    /// Returns `None` when every slot is taken.
    #[must_use]
    pub fn try_acquire(&self) -> Option<WorkerPermit> {
        let mut current = self.active.load(Ordering::Acquire);
        loop {
            if current >= self.max {
                return None;
            }
            match self.active.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(WorkerPermit {
                        active: Arc::clone(&self.active),
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Slots currently held.
    #[must_use]
    pub fn active(&self) -> u32 {
        self.active.load(Ordering::Acquire)
    }

    /// Slots currently free.
    #[must_use]
    pub fn available(&self) -> u32 {
        self.max.saturating_sub(self.active())
    }

    /// Upper admission bound.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Advisory warm capacity (`min_workers`).
    #[must_use]
    pub const fn warm_capacity(&self) -> u32 {
        self.warm_capacity
    }
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_capacity_bound() {
        let limiter = ConcurrencyLimiter::new(1, 2);
        let a = limiter.try_acquire();
        let b = limiter.try_acquire();
        assert!(a.is_some());
        assert!(b.is_some());
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.active(), 2);
        assert_eq!(limiter.available(), 0);
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let limiter = ConcurrencyLimiter::new(0, 1);
        let permit = limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_none());
        drop(permit);
        assert_eq!(limiter.active(), 0);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn test_concurrent_acquire_never_exceeds_max() {
        let limiter = ConcurrencyLimiter::new(2, 4);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                thread::spawn(move || {
                    let mut held = Vec::new();
                    for _ in 0..100 {
                        if let Some(permit) = limiter.try_acquire() {
                            assert!(limiter.active() <= limiter.max());
                            held.push(permit);
                        }
                        if held.len() > 1 {
                            held.clear();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(limiter.active(), 0);
        assert_eq!(limiter.warm_capacity(), 2);
    }
}
