//! Run-wide cumulative byte budget shared by concurrent fetchers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative byte ceiling for one packaging run.
///
/// [`try_reserve`](Self::try_reserve) checks and increments in a single
/// atomic step, so concurrent fetchers completing together can never push
/// the total past the limit.
#[derive(Debug)]
pub struct ByteBudget {
    limit: u64,
    used: AtomicU64,
}

impl ByteBudget {
    /// Creates an empty budget with the given ceiling.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            used: AtomicU64::new(0),
        }
    }

    /// Reserves `bytes`, returning false when that would exceed the ceiling.
    pub fn try_reserve(&self, bytes: u64) -> bool {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                used.checked_add(bytes).filter(|total| *total <= self.limit)
            })
            .is_ok()
    }

    /// Bytes reserved so far.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::SeqCst)
    }

    /// Configured ceiling.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Bytes still available.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_try_reserve_up_to_limit() {
        let budget = ByteBudget::new(100);
        assert!(budget.try_reserve(60));
        assert!(budget.try_reserve(40));
        assert!(!budget.try_reserve(1));
        assert_eq!(budget.used(), 100);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_rejected_reservation_leaves_counter_untouched() {
        let budget = ByteBudget::new(100);
        assert!(budget.try_reserve(70));
        assert!(!budget.try_reserve(31));
        assert_eq!(budget.used(), 70);
        assert!(budget.try_reserve(30));
    }

    #[test]
    fn test_overflowing_reservation_is_rejected() {
        let budget = ByteBudget::new(u64::MAX);
        assert!(budget.try_reserve(u64::MAX - 1));
        assert!(!budget.try_reserve(2));
    }

    #[test]
    fn test_concurrent_reservations_never_overshoot() {
        let budget = ByteBudget::new(100);
        let accepted: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| usize::from(budget.try_reserve(30))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(accepted, 3);
        assert_eq!(budget.used(), 90);
    }
}
