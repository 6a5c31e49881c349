//! Descriptor cache with reentrant fill
//!
//! Each module type maps to a slot holding a write-once outcome. An empty
//! outcome marks a build in flight: a nested request for the same type gets a
//! handle to that slot instead of starting a second build, and the handle
//! resolves to the shared descriptor once the outer build completes.
//! Check-and-mark happens under one lock; the lock is released while
//! building.
//!
//! Threads blocked on another thread's build are recorded under the same
//! lock. A wait that would close a cycle of threads waiting on each other's
//! builds is refused instead of blocking.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use modwire_types::TypeId;

use super::descriptor::ModuleDescriptor;
use crate::error::DescriptorError;

#[derive(Debug)]
struct SlotState {
    builder: ThreadId,
    outcome: OnceCell<Result<Arc<ModuleDescriptor>, DescriptorError>>,
}

type Slot = Arc<SlotState>;

#[derive(Debug, Default)]
struct CacheInner {
    slots: FxHashMap<TypeId, Slot>,
    /// Slot each blocked thread is waiting on
    waiting: FxHashMap<ThreadId, Slot>,
    hits: usize,
    misses: usize,
    reentrant_hits: usize,
}

impl CacheInner {
    /// Whether blocking `waiter` on `slot` would close a wait-for cycle
    fn would_deadlock(&self, waiter: ThreadId, slot: &SlotState) -> bool {
        let mut owner = slot.builder;
        // The wait-for graph is kept acyclic, so this walk ends
        loop {
            if owner == waiter {
                return true;
            }
            match self.waiting.get(&owner) {
                Some(next) if next.outcome.get().is_none() => owner = next.builder,
                _ => return false,
            }
        }
    }
}

/// A reference to a descriptor that may still be under construction
#[derive(Debug, Clone)]
pub struct DescriptorHandle {
    module_type: TypeId,
    slot: Slot,
    cache: Arc<Mutex<CacheInner>>,
}

impl DescriptorHandle {
    /// The module type this handle refers to
    pub fn module_type(&self) -> TypeId {
        self.module_type
    }

    /// The descriptor, once its build has completed successfully
    pub fn get(&self) -> Option<Arc<ModuleDescriptor>> {
        self.slot.outcome.get()?.as_ref().ok().cloned()
    }

    /// Whether the build has completed successfully
    pub fn is_ready(&self) -> bool {
        self.get().is_some()
    }

    /// Whether the build has finished, successfully or not
    pub fn is_settled(&self) -> bool {
        self.slot.outcome.get().is_some()
    }

    /// Wait for the build to finish
    ///
    /// A build running on another thread is waited for. Fails with
    /// [`DescriptorError::BuildInProgress`] instead when the build runs on
    /// the current thread, or when its builder is itself (transitively)
    /// waiting on a build owned by the current thread.
    pub fn wait(&self) -> Result<Arc<ModuleDescriptor>, DescriptorError> {
        if let Some(outcome) = self.slot.outcome.get() {
            return outcome.clone();
        }

        let me = thread::current().id();
        {
            let mut inner = self.cache.lock();
            if let Some(outcome) = self.slot.outcome.get() {
                return outcome.clone();
            }
            if inner.would_deadlock(me, &self.slot) {
                return Err(DescriptorError::BuildInProgress(self.module_type));
            }
            inner.waiting.insert(me, Arc::clone(&self.slot));
        }

        let outcome = self.slot.outcome.wait().clone();
        self.cache.lock().waiting.remove(&me);
        outcome
    }
}

/// Outcome of an atomic cache lookup
pub(crate) enum Lookup {
    /// Already built
    Ready(DescriptorHandle),
    /// Being built further up the call stack or on another thread
    InFlight(DescriptorHandle),
    /// Not present; the caller now owns the build
    Vacant(BuildGuard),
}

/// Ownership of one in-flight build
///
/// Dropping the guard without [`complete`](Self::complete) or
/// [`abandon`](Self::abandon), as happens when the build unwinds, fails the
/// build with [`DescriptorError::BuildAborted`].
pub(crate) struct BuildGuard {
    handle: Option<DescriptorHandle>,
}

impl BuildGuard {
    /// Publish the descriptor and release the slot to waiters
    pub(crate) fn complete(mut self, descriptor: ModuleDescriptor) -> DescriptorHandle {
        let handle = self.take();
        let _ = handle.slot.outcome.set(Ok(Arc::new(descriptor)));
        handle
    }

    /// Fail the build
    ///
    /// Waiters receive the error and the placeholder is dropped, so nothing
    /// partial stays cached and a later request starts a fresh build.
    pub(crate) fn abandon(mut self, error: DescriptorError) {
        let handle = self.take();
        fail(&handle, error);
    }

    #[cfg(test)]
    pub(crate) fn handle(&self) -> &DescriptorHandle {
        match &self.handle {
            Some(handle) => handle,
            None => unreachable!("build guard already released"),
        }
    }

    fn take(&mut self) -> DescriptorHandle {
        match self.handle.take() {
            Some(handle) => handle,
            None => unreachable!("build guard already released"),
        }
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let error = DescriptorError::BuildAborted(handle.module_type);
            fail(&handle, error);
        }
    }
}

fn fail(handle: &DescriptorHandle, error: DescriptorError) {
    let _ = handle.slot.outcome.set(Err(error));
    let mut inner = handle.cache.lock();
    let owned = inner
        .slots
        .get(&handle.module_type)
        .is_some_and(|slot| Arc::ptr_eq(slot, &handle.slot));
    if owned {
        inner.slots.remove(&handle.module_type);
    }
}

/// Identity-keyed descriptor cache
#[derive(Debug, Default)]
pub struct DescriptorCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl DescriptorCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `ty`, marking it as in flight if absent
    pub(crate) fn begin(&self, ty: TypeId) -> Lookup {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.slots.get(&ty).cloned() {
            let handle = DescriptorHandle {
                module_type: ty,
                slot,
                cache: Arc::clone(&self.inner),
            };
            return if handle.is_settled() {
                inner.hits += 1;
                Lookup::Ready(handle)
            } else {
                inner.reentrant_hits += 1;
                Lookup::InFlight(handle)
            };
        }

        inner.misses += 1;
        let slot = Arc::new(SlotState {
            builder: thread::current().id(),
            outcome: OnceCell::new(),
        });
        inner.slots.insert(ty, Arc::clone(&slot));
        Lookup::Vacant(BuildGuard {
            handle: Some(DescriptorHandle {
                module_type: ty,
                slot,
                cache: Arc::clone(&self.inner),
            }),
        })
    }

    /// Get a built descriptor without affecting statistics
    pub fn get(&self, ty: TypeId) -> Option<Arc<ModuleDescriptor>> {
        let inner = self.inner.lock();
        let slot = inner.slots.get(&ty)?;
        slot.outcome.get()?.as_ref().ok().cloned()
    }

    /// Check if a built descriptor for `ty` is cached
    pub fn contains(&self, ty: TypeId) -> bool {
        self.get(ty).is_some()
    }

    /// Number of slots, including builds in flight
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().slots.is_empty()
    }

    /// Clear the entire cache
    ///
    /// Descriptors already handed out stay valid.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.hits = 0;
        inner.misses = 0;
        inner.reentrant_hits = 0;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.slots.len(),
            hits: inner.hits,
            misses: inner.misses,
            reentrant_hits: inner.reentrant_hits,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached entries
    pub entries: usize,
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses (builds started)
    pub misses: usize,
    /// Number of requests that found their build still in flight
    pub reentrant_hits: usize,
}

impl CacheStats {
    /// Get cache hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
