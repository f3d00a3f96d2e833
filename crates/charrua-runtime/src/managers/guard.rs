//! Single-flight guard
//!
//! At most one holder per flag. A second caller does not wait; it gets
//! `None` and is expected to drop its request.

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds an in-flight flag until dropped
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    /// Set the flag, or return `None` if another call holds it
    pub fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let flag = AtomicBool::new(false);
        let first = InFlightGuard::try_acquire(&flag);
        assert!(first.is_some());
        assert!(InFlightGuard::try_acquire(&flag).is_none());

        drop(first);
        assert!(InFlightGuard::try_acquire(&flag).is_some());
    }
}
