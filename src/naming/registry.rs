use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use crate::core::Result;

/// Handle returned by [`RankedRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered service with its rank
pub struct Ranked<T: ?Sized> {
    pub id: RegistrationId,
    pub rank: i32,
    pub service: Arc<T>,
}

impl<T: ?Sized> Clone for Ranked<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            rank: self.rank,
            service: Arc::clone(&self.service),
        }
    }
}

/// Services ordered by ascending rank
///
/// Registration and removal are serialized by one lock and republish an
/// immutable snapshot; readers only clone the current snapshot pointer.
pub struct RankedRegistry<T: ?Sized> {
    entries: Mutex<Vec<Ranked<T>>>,
    snapshot: RwLock<Arc<[Ranked<T>]>>,
    next_id: AtomicU64,
}

impl<T: ?Sized> RankedRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            snapshot: RwLock::new(Arc::from(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Equal ranks keep registration order
    pub fn register(&self, service: Arc<T>, rank: i32) -> Result<RegistrationId> {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut entries = self.entries.lock()?;
        entries.push(Ranked { id, rank, service });
        entries.sort_by_key(|entry| entry.rank);
        self.publish(&entries)?;

        Ok(id)
    }

    /// Returns whether `id` was registered
    pub fn unregister(&self, id: RegistrationId) -> Result<bool> {
        let mut entries = self.entries.lock()?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.publish(&entries)?;
        Ok(true)
    }

    fn publish(&self, entries: &[Ranked<T>]) -> Result<()> {
        let snapshot: Arc<[Ranked<T>]> = entries.iter().cloned().collect();
        *self.snapshot.write()? = snapshot;
        Ok(())
    }

    /// Point-in-time view, lowest rank first
    pub fn snapshot(&self) -> Result<Arc<[Ranked<T>]>> {
        Ok(Arc::clone(&*self.snapshot.read()?))
    }

    pub fn highest(&self) -> Result<Option<Arc<T>>> {
        Ok(self.snapshot()?.last().map(|entry| Arc::clone(&entry.service)))
    }

    pub fn lowest(&self) -> Result<Option<Arc<T>>> {
        Ok(self.snapshot()?.first().map(|entry| Arc::clone(&entry.service)))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.snapshot()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: ?Sized> Default for RankedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_rank_order() {
        let registry: RankedRegistry<str> = RankedRegistry::new();
        registry.register(Arc::from("mid"), 5).unwrap();
        registry.register(Arc::from("low"), -1).unwrap();
        registry.register(Arc::from("high"), 10).unwrap();

        assert_eq!(&*registry.lowest().unwrap().unwrap(), "low");
        assert_eq!(&*registry.highest().unwrap().unwrap(), "high");
        let ranks: Vec<i32> = registry.snapshot().unwrap().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![-1, 5, 10]);
    }

    #[test]
    fn test_unregister_republishes() {
        let registry: RankedRegistry<str> = RankedRegistry::new();
        let a = registry.register(Arc::from("a"), 1).unwrap();
        let before = registry.snapshot().unwrap();

        assert!(registry.unregister(a).unwrap());
        assert!(!registry.unregister(a).unwrap());
        assert!(registry.is_empty().unwrap());
        // earlier snapshots are unaffected
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry: Arc<RankedRegistry<str>> = Arc::new(RankedRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let id = registry.register(Arc::from("svc"), i).unwrap();
                    let _ = registry.snapshot().unwrap();
                    if i % 2 == 0 {
                        registry.unregister(id).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len().unwrap(), 4);
    }
}
