//! Per-group mutation locks.
//!
//! Every mutation holds its group's lock across all of its storage calls and
//! the recompute pass, so a recompute never races a write in the same group.
//! Different groups proceed independently.
//!
//! An entry lives only while some task holds or waits for it; releasing the
//! last guard removes it, so the registry stays as large as the set of groups
//! being mutated right now.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct GroupLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held lock on one group. Dropping it releases the lock.
#[derive(Debug)]
pub struct GroupGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a GroupLocks,
    group: String,
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock of `group`.
    pub async fn lock(&self, group: &str) -> GroupGuard<'_> {
        let lock = self.locks.entry(group.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        GroupGuard {
            guard: Some(guard),
            locks: self,
            group: group.to_string(),
        }
    }

    /// Number of groups currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for GroupGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the registry's own handle left: no holder, no waiter.
        self.locks
            .locks
            .remove_if(&self.group, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_group_serializes() {
        let locks = GroupLocks::new();
        let _held = locks.lock("g").await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock("g")).await;
        assert!(second.is_err(), "second lock on the same group must wait");
    }

    #[tokio::test]
    async fn test_other_groups_proceed() {
        let locks = GroupLocks::new();
        let _held = locks.lock("g1").await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock("g2")).await;
        assert!(other.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_released_on_drop() {
        let locks = GroupLocks::new();
        drop(locks.lock("g").await);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.lock("g")).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_entries_removed_after_release() {
        let locks = GroupLocks::new();
        for i in 0..100 {
            drop(locks.lock(&format!("g{i}")).await);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_kept_while_waited_on() {
        let locks = Arc::new(GroupLocks::new());
        let held = locks.lock("g").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("g").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        assert_eq!(locks.len(), 1, "waiter still references the entry");

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
