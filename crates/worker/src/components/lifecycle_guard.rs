use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use courier_domain::LifecycleGuard;
use tracing::info;

/// 宿主进程的保活实现，只记录状态变化
#[derive(Debug, Default)]
pub struct TracingLifecycleGuard {
    held: AtomicBool,
    acquisitions: AtomicU64,
}

impl TracingLifecycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl LifecycleGuard for TracingLifecycleGuard {
    fn acquire(&self) {
        if !self.held.swap(true, Ordering::SeqCst) {
            let count = self.acquisitions.fetch_add(1, Ordering::SeqCst) + 1;
            info!(count, "Lifecycle hold acquired");
        }
    }

    fn release(&self) {
        if self.held.swap(false, Ordering::SeqCst) {
            info!("Lifecycle hold released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_is_idempotent() {
        let guard = TracingLifecycleGuard::new();
        guard.release();
        assert!(!guard.is_held());

        guard.acquire();
        guard.acquire();
        assert!(guard.is_held());
        assert_eq!(guard.acquisitions(), 1);

        guard.release();
        assert!(!guard.is_held());
        guard.acquire();
        assert_eq!(guard.acquisitions(), 2);
    }
}
