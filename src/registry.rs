/*!
 * Operation Vector Registry
 * Process-wide slot for the active allocator operations
 */

use crate::allocator::BestFitAllocator;
use crate::traits::AllocatorOps;
use crate::types::{HeapError, HeapResult};
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sized holder for the active vector.
///
/// `ArcSwap` stores a single machine word, so the fat `Arc<dyn AllocatorOps>`
/// pointer rides behind one more `Arc` indirection.
struct ActiveOps {
    ops: Arc<dyn AllocatorOps>,
}

/// Registry for the currently selected operation vector.
///
/// Replacing the vector is a boot-time rarity; reading it happens on every
/// allocate/release. The vector therefore lives in an RCU-style cell:
/// readers take an atomic pointer load, writers swap the whole vector in a
/// single store, and a reader racing with `install` sees the old or the new
/// vector, never a torn mix.
///
/// The `initialized` flag gates replacement: once a heap is live, blocks
/// handed out by the current vector must never be released into a different
/// one. Boot-time call ordering (install before init) is the host's duty;
/// the registry only enforces the initialized gate.
pub struct OpsRegistry {
    active: ArcSwap<ActiveOps>,
    initialized: AtomicBool,
}

impl OpsRegistry {
    /// Create a registry holding the built-in best-fit vector.
    pub fn new() -> Self {
        Self::with_ops(Arc::new(BestFitAllocator::new()))
    }

    /// Create a registry holding a caller-supplied vector.
    pub fn with_ops(ops: Arc<dyn AllocatorOps>) -> Self {
        Self {
            active: ArcSwap::from_pointee(ActiveOps { ops }),
            initialized: AtomicBool::new(false),
        }
    }

    /// Replace the active vector.
    ///
    /// Rejected with [`HeapError::OrderingViolation`] once the heap is
    /// initialized; allowed again after `mark_uninitialized`, so allocator
    /// algorithms may be swapped between heap lifetimes.
    pub fn install(&self, ops: Arc<dyn AllocatorOps>) -> HeapResult<()> {
        if self.is_initialized() {
            return Err(HeapError::OrderingViolation);
        }
        self.active.store(Arc::new(ActiveOps { ops }));
        Ok(())
    }

    /// The currently active vector. Before any `install` this is the
    /// built-in default.
    #[inline(always)]
    pub fn current(&self) -> Arc<dyn AllocatorOps> {
        Arc::clone(&self.active.load().ops)
    }

    /// Whether a heap lifetime is in progress.
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Enter the initialized state; the vector is pinned until
    /// `mark_uninitialized`.
    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    /// Leave the initialized state, unpinning the vector.
    pub fn mark_uninitialized(&self) {
        self.initialized.store(false, Ordering::SeqCst);
    }
}

impl Default for OpsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
