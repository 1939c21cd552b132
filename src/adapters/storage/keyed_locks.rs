//! Per-key async mutual exclusion.
//!
//! Holds one `tokio::sync::Mutex` per key that is currently locked or
//! awaited. Entries are removed as soon as nobody holds or waits on them,
//! so the registry stays proportional to in-flight work, not to the number
//! of keys ever seen.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry<K> = Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>;

/// Registry of per-key async locks.
///
/// Locking different keys never contends beyond the brief registry lookup.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    entries: Registry<K>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Waits for exclusive access to `key`.
    ///
    /// Access is held until the returned guard is dropped. Dropping the
    /// future while it waits releases the registry entry as well.
    pub async fn lock(&self, key: K) -> KeyedGuard<K> {
        // Declared before the awaited future, so on cancellation the
        // future's clone of the entry is gone by the time this prunes.
        let registration = Registration {
            key: key.clone(),
            entries: Arc::clone(&self.entries),
        };
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(key).or_default())
        };
        let guard = entry.lock_owned().await;

        KeyedGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active_keys(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to one key of a [`KeyedLocks`] registry.
///
/// Fields drop in order: the mutex is released before the registry
/// entry is considered for pruning.
#[derive(Debug)]
pub struct KeyedGuard<K>
where
    K: Eq + Hash,
{
    _guard: OwnedMutexGuard<()>,
    _registration: Registration<K>,
}

/// Interest in one registry entry, from the first wait until release.
#[derive(Debug)]
struct Registration<K>
where
    K: Eq + Hash,
{
    key: K,
    entries: Registry<K>,
}

impl<K> Drop for Registration<K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // The map's own reference is the last one: nobody holds or waits.
        let idle = entries
            .get(&self.key)
            .map(|entry| Arc::strong_count(entry) == 1)
            .unwrap_or(false);
        if idle {
            entries.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn entry_is_pruned_after_release() {
        let locks = KeyedLocks::new();

        let guard = locks.lock("a").await;
        assert_eq!(locks.active_keys(), 1);

        drop(guard);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_releases_its_entry() {
        let locks = KeyedLocks::new();

        let held = locks.lock(1u32).await;
        let waited = tokio::time::timeout(Duration::from_millis(10), locks.lock(1u32)).await;
        assert!(waited.is_err());
        assert_eq!(locks.active_keys(), 1);

        drop(held);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_does_not_disturb_holder() {
        let locks = KeyedLocks::new();

        let held = locks.lock("a").await;
        let _ = tokio::time::timeout(Duration::from_millis(10), locks.lock("a")).await;

        // The holder's entry survives the waiter's cancellation.
        assert_eq!(locks.active_keys(), 1);
        let blocked = tokio::time::timeout(Duration::from_millis(20), locks.lock("a")).await;
        assert!(blocked.is_err());

        drop(held);
        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.lock("a")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();

        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b")).await;

        assert!(b.is_ok());
        assert_eq!(locks.active_keys(), 2);
    }

    #[tokio::test]
    async fn same_key_waits_for_release() {
        let locks = KeyedLocks::new();

        let guard = locks.lock("a").await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.lock("a")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn critical_sections_never_overlap() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock(7u32).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active_keys(), 0);
    }
}
