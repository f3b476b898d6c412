//! Single-flight keyed cache
//!
//! Every key maps to a slot that is either pending (an establishment is in
//! flight and its outcome is shared by all callers) or ready. An absent key
//! is empty. The first caller for an empty key installs the pending slot and
//! spawns the establishment; everyone arriving before it settles awaits the
//! same shared future.
//!
//! The slot map lock is only taken to inspect or swap slots and is never held
//! across an await.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use docroute_core::{DocrouteError, Result};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

type SharedBuild<V> = Shared<BoxFuture<'static, Result<V>>>;

enum Slot<V> {
    Pending { generation: u64, build: SharedBuild<V> },
    Ready(V),
}

struct Slots<K, V> {
    entries: HashMap<K, Slot<V>>,
    next_generation: u64,
}

/// A map of lazily built values with at most one build in flight per key
pub struct SlotMap<K, V> {
    inner: Arc<Mutex<Slots<K, V>>>,
}

/// How a lookup was served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The value was already cached
    Hit,
    /// Another caller's build was already in flight
    Joined,
    /// This caller started the build
    Built,
}

impl<K, V> SlotMap<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slots {
                entries: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    /// Get the value for `key`, building it with `init` if the key is empty.
    ///
    /// The build runs in its own task: it completes (and is cached) or fails
    /// (and the slot is cleared) even if every caller stops waiting. Failures
    /// are handed to every waiter and never cached.
    pub async fn get_or_init<F, Fut>(&self, key: K, init: F) -> Result<(V, Lookup)>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let (generation, build, lookup) = {
            let mut guard = self.inner.lock();
            let slots = &mut *guard;
            match slots.entries.get(&key) {
                Some(Slot::Ready(value)) => return Ok((value.clone(), Lookup::Hit)),
                Some(Slot::Pending { generation, build }) => {
                    (*generation, build.clone(), Lookup::Joined)
                }
                None => {
                    slots.next_generation += 1;
                    let generation = slots.next_generation;

                    // The task settles its own slot. It cannot observe the
                    // map before the pending slot below is installed because
                    // settling takes the lock held here.
                    let inner = Arc::clone(&self.inner);
                    let task_key = key.clone();
                    let establish = init();
                    let handle = tokio::spawn(async move {
                        let result = establish.await;
                        settle(&inner, &task_key, generation, &result);
                        result
                    });

                    let build = async move {
                        match handle.await {
                            Ok(result) => result,
                            Err(e) => Err(DocrouteError::Connection(format!(
                                "establishment task failed: {}",
                                e
                            ))),
                        }
                    }
                    .boxed()
                    .shared();

                    slots.entries.insert(
                        key.clone(),
                        Slot::Pending {
                            generation,
                            build: build.clone(),
                        },
                    );
                    (generation, build, Lookup::Built)
                }
            }
        };

        let result = build.await;
        // Covers a build task that died without settling.
        settle(&self.inner, &key, generation, &result);
        result.map(|value| (value, lookup))
    }

    /// The ready value for `key`, if any. Pending builds are not awaited.
    pub fn get(&self, key: &K) -> Option<V> {
        match self.inner.lock().entries.get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Remove the slot for `key`, ready or pending.
    ///
    /// A pending build keeps running for the callers already waiting on it,
    /// but its outcome is no longer cached.
    pub fn remove(&self, key: &K) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    /// Remove every slot and return the ready values
    pub fn drain_ready(&self) -> Vec<(K, V)> {
        self.inner
            .lock()
            .entries
            .drain()
            .filter_map(|(key, slot)| match slot {
                Slot::Ready(value) => Some((key, value)),
                Slot::Pending { .. } => None,
            })
            .collect()
    }

    /// Keys with a ready value
    pub fn ready_keys(&self) -> Vec<K> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of ready values
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of builds currently in flight
    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|slot| matches!(slot, Slot::Pending { .. }))
            .count()
    }
}

impl<K, V> Default for SlotMap<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the pending slot of `generation` with the build's outcome.
///
/// Does nothing when the slot was removed or replaced in the meantime, so an
/// invalidation is never undone by a late build.
fn settle<K, V>(inner: &Mutex<Slots<K, V>>, key: &K, generation: u64, result: &Result<V>)
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    let mut guard = inner.lock();
    let slots = &mut *guard;
    let current = matches!(
        slots.entries.get(key),
        Some(Slot::Pending { generation: g, .. }) if *g == generation
    );
    if !current {
        return;
    }

    match result {
        Ok(value) => {
            slots.entries.insert(key.clone(), Slot::Ready(value.clone()));
        }
        Err(e) => {
            tracing::debug!(key = ?key, error = %e, "clearing failed slot");
            slots.entries.remove(key);
        }
    }
}
