//! Recycling pool for segments and obstacles
//!
//! Instances are created once (at warm-up or when the pool runs dry) and
//! live for the whole process. Callers hold a typed [`PoolHandle`] while an
//! instance is checked out and give it back with [`Pool::release`].

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::error::{Result, SimError};

/// Opaque, typed index into a [`Pool`]
pub struct PoolHandle<T> {
    slot: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolHandle<T> {
    fn new(slot: u32) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }

    /// Raw slot index (stable for the lifetime of the pool)
    #[inline]
    pub fn slot(self) -> u32 {
        self.slot
    }
}

impl<T> Clone for PoolHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolHandle<T> {}

impl<T> PartialEq for PoolHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T> Eq for PoolHandle<T> {}

impl<T> PartialOrd for PoolHandle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for PoolHandle<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.slot.cmp(&other.slot)
    }
}

impl<T> Hash for PoolHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

impl<T> fmt::Debug for PoolHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolHandle({})", self.slot)
    }
}

#[derive(Debug)]
struct PoolEntry<T> {
    value: T,
    active: bool,
}

/// Arena with a FIFO free list
#[derive(Debug)]
pub struct Pool<T> {
    label: &'static str,
    factory: fn() -> T,
    entries: Vec<PoolEntry<T>>,
    free: VecDeque<u32>,
    active_count: usize,
}

impl<T> Pool<T> {
    /// Empty pool; `factory` builds a fresh inactive instance on demand
    pub fn new(label: &'static str, factory: fn() -> T) -> Self {
        Self {
            label,
            factory,
            entries: Vec::new(),
            free: VecDeque::new(),
            active_count: 0,
        }
    }

    /// Pool pre-filled with `count` inactive instances
    pub fn with_warm_up(label: &'static str, factory: fn() -> T, count: usize) -> Self {
        let mut pool = Self::new(label, factory);
        pool.warm_up(count);
        pool
    }

    /// Pre-create `count` inactive instances
    pub fn warm_up(&mut self, count: usize) {
        self.entries.reserve(count);
        for _ in 0..count {
            self.grow();
        }
        log::debug!(
            "Pool '{}' warmed up with {} instances ({} total)",
            self.label,
            count,
            self.entries.len()
        );
    }

    fn grow(&mut self) {
        let slot = self.entries.len() as u32;
        self.entries.push(PoolEntry {
            value: (self.factory)(),
            active: false,
        });
        self.free.push_back(slot);
    }

    /// Check out an inactive instance, growing by one if none is free
    pub fn acquire(&mut self) -> PoolHandle<T> {
        if self.free.is_empty() {
            self.grow();
            log::debug!(
                "Pool '{}' exhausted, grew to {} instances",
                self.label,
                self.entries.len()
            );
        }

        // grow() guarantees a free slot
        let slot = self.free.pop_front().unwrap_or_default();
        let entry = &mut self.entries[slot as usize];
        debug_assert!(!entry.active, "free list held an active slot");
        entry.active = true;
        self.active_count += 1;
        PoolHandle::new(slot)
    }

    /// Return an instance to the free set
    pub fn release(&mut self, handle: PoolHandle<T>) -> Result<()> {
        let entry = self
            .entries
            .get_mut(handle.slot as usize)
            .ok_or(SimError::UnknownHandle { slot: handle.slot })?;

        if !entry.active {
            return Err(SimError::DoubleRelease { slot: handle.slot });
        }

        entry.active = false;
        self.active_count -= 1;
        self.free.push_back(handle.slot);
        Ok(())
    }

    /// Release every checked-out instance; returns how many were released
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for (slot, entry) in self.entries.iter_mut().enumerate() {
            if entry.active {
                entry.active = false;
                self.free.push_back(slot as u32);
                released += 1;
            }
        }
        self.active_count = 0;
        released
    }

    /// Whether the handle is currently checked out
    pub fn is_active(&self, handle: PoolHandle<T>) -> bool {
        self.entries
            .get(handle.slot as usize)
            .is_some_and(|e| e.active)
    }

    /// Borrow a checked-out instance (None once released)
    pub fn get(&self, handle: PoolHandle<T>) -> Option<&T> {
        self.entries
            .get(handle.slot as usize)
            .filter(|e| e.active)
            .map(|e| &e.value)
    }

    pub fn get_mut(&mut self, handle: PoolHandle<T>) -> Option<&mut T> {
        self.entries
            .get_mut(handle.slot as usize)
            .filter(|e| e.active)
            .map(|e| &mut e.value)
    }

    /// Checked-out instances in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle<T>, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(slot, e)| (PoolHandle::new(slot as u32), &e.value))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle<T>, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(slot, e)| (PoolHandle::new(slot as u32), &mut e.value))
    }

    /// Total instances ever created
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pool(n: usize) -> Pool<u32> {
        Pool::with_warm_up("test", || 0, n)
    }

    #[test]
    fn test_warm_up_creates_inactive_instances() {
        let p = pool(15);
        assert_eq!(p.len(), 15);
        assert_eq!(p.active_count(), 0);
        assert_eq!(p.free_count(), 15);
    }

    #[test]
    fn test_acquire_grows_when_exhausted() {
        let mut p = pool(2);
        let a = p.acquire();
        let b = p.acquire();
        let c = p.acquire();
        assert_eq!(p.len(), 3);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(p.active_count(), 3);
    }

    #[test]
    fn test_double_release_is_an_error() {
        let mut p = pool(1);
        let h = p.acquire();
        assert!(p.release(h).is_ok());
        assert!(matches!(p.release(h), Err(SimError::DoubleRelease { slot: 0 })));
        // Free set was not corrupted by the second release
        assert_eq!(p.free_count(), 1);
        let a = p.acquire();
        let b = p.acquire();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_handle_is_an_error() {
        let mut big = pool(4);
        let foreign = {
            big.acquire();
            big.acquire();
            big.acquire()
        };
        let mut small = pool(1);
        assert!(matches!(
            small.release(foreign),
            Err(SimError::UnknownHandle { slot: 2 })
        ));
    }

    #[test]
    fn test_release_all() {
        let mut p = pool(3);
        let a = p.acquire();
        p.acquire();
        p.acquire();
        p.release(a).unwrap();
        assert_eq!(p.release_all(), 2);
        assert_eq!(p.active_count(), 0);
        assert_eq!(p.free_count(), 3);
    }

    #[test]
    fn test_released_instance_is_not_reachable() {
        let mut p = pool(1);
        let h = p.acquire();
        *p.get_mut(h).unwrap() = 7;
        assert_eq!(p.get(h), Some(&7));
        p.release(h).unwrap();
        assert!(!p.is_active(h));
        assert!(p.get(h).is_none());
    }

    #[test]
    fn test_reuse_is_fifo() {
        let mut p = pool(3);
        let a = p.acquire();
        let b = p.acquire();
        p.release(b).unwrap();
        p.release(a).unwrap();
        // slot 2 was never used and sits at the front of the free list
        assert_eq!(p.acquire().slot(), 2);
        assert_eq!(p.acquire(), b);
        assert_eq!(p.acquire(), a);
    }

    proptest! {
        #[test]
        fn prop_active_count_is_conserved(
            warm in 0usize..8,
            ops in prop::collection::vec((any::<bool>(), 0usize..32), 0..200),
        ) {
            let mut p = pool(warm);
            let mut held: Vec<PoolHandle<u32>> = Vec::new();
            let mut acquired = 0usize;
            let mut released = 0usize;

            for (is_acquire, pick) in ops {
                if is_acquire || held.is_empty() {
                    let h = p.acquire();
                    prop_assert!(!held.contains(&h), "handle handed out twice");
                    held.push(h);
                    acquired += 1;
                } else {
                    let h = held.swap_remove(pick % held.len());
                    prop_assert!(p.release(h).is_ok());
                    released += 1;
                }

                let live: HashSet<_> = p.iter_active().map(|(h, _)| h).collect();
                prop_assert_eq!(live.len(), acquired - released);
                prop_assert_eq!(p.active_count(), acquired - released);
                prop_assert!(p.len() >= warm);
            }
        }
    }
}
