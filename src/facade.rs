/*!
 * Heap Facade
 * Stable allocation surface, lifecycle, and free-byte accounting
 */

use crate::registry::OpsRegistry;
use crate::regions;
use crate::traits::AllocatorOps;
use crate::types::{Address, HeapError, HeapResult, HeapStats, Region, Size};
use log::{info, warn};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The user-visible heap: routes every operation through the active
/// allocator vector and keeps the advisory byte counters.
///
/// Charged sizes come from the allocator's own `block_size_of`, so the
/// counters reflect internal fragmentation and header overhead without the
/// facade knowing the allocator's block layout. The counters are single-word
/// atomics updated beside the allocator's own locking discipline; under
/// concurrent use they may lag truth by one in-flight operation.
///
/// A process normally has exactly one heap (see [`crate::global`]), but the
/// type itself is self-contained so tests can run many side by side.
///
/// # Lifecycle
///
/// `Unconfigured -> (redirect?) -> init -> Initialized -> uninit -> Unconfigured`
///
/// [`redirect`](Heap::redirect) is legal only while unconfigured, including
/// again after `uninit`. The boot-time transitions are expected to run on a
/// single thread; only the steady-state operations are reentrancy-neutral.
pub struct Heap {
    registry: OpsRegistry,
    total_bytes: AtomicUsize,
    free_bytes: AtomicUsize,
    min_free_bytes: AtomicUsize,
}

impl Heap {
    /// An unconfigured heap holding the built-in best-fit vector.
    pub fn new() -> Self {
        Self {
            registry: OpsRegistry::new(),
            total_bytes: AtomicUsize::new(0),
            free_bytes: AtomicUsize::new(0),
            min_free_bytes: AtomicUsize::new(0),
        }
    }

    /// Replace the operation vector.
    ///
    /// Legal only while the heap is uninitialized; fails with
    /// [`HeapError::OrderingViolation`] afterwards, because blocks handed
    /// out by one algorithm must never be released into another.
    pub fn redirect(&self, ops: Arc<dyn AllocatorOps>) -> HeapResult<()> {
        self.registry.install(ops)
    }

    /// The currently active operation vector.
    pub fn current_ops(&self) -> Arc<dyn AllocatorOps> {
        self.registry.current()
    }

    /// Whether a heap lifetime is in progress.
    pub fn is_initialized(&self) -> bool {
        self.registry.is_initialized()
    }

    /// Bring the heap up over `regions`, a sentinel-terminated array of
    /// donated memory descriptors. Returns the usable byte total reported
    /// by the active allocator, which seeds `free_size` and resets the
    /// low-water mark.
    ///
    /// # Errors
    ///
    /// * [`HeapError::AlreadyInitialized`] while a lifetime is in progress
    /// * [`HeapError::MalformedRegionArray`] for a missing sentinel, null
    ///   start, zero size, or a range that wraps the address space
    /// * [`HeapError::RegionOverlap`] when two regions intersect
    /// * [`HeapError::NoRegions`] when the first entry is the sentinel
    /// * [`HeapError::AllocatorRejected`] when the allocator reports zero
    ///   usable bytes
    ///
    /// # Safety
    ///
    /// Every non-sentinel region must describe memory that is valid for
    /// reads and writes, donated exclusively to this heap, and untouched by
    /// the caller until [`uninit`](Heap::uninit) returns. The heap itself
    /// never dereferences the donated bytes, but addresses handed out by
    /// [`allocate`](Heap::allocate) alias them.
    pub unsafe fn init(&self, regions: &[Region]) -> HeapResult<Size> {
        if self.registry.is_initialized() {
            return Err(HeapError::AlreadyInitialized);
        }

        let usable_regions = regions::validate(regions)?;
        let ops = self.registry.current();
        let usable = ops.init(usable_regions);
        if usable == 0 {
            return Err(HeapError::AllocatorRejected);
        }

        self.total_bytes.store(usable, Ordering::SeqCst);
        self.free_bytes.store(usable, Ordering::SeqCst);
        self.min_free_bytes.store(usable, Ordering::SeqCst);
        self.registry.mark_initialized();

        info!(
            "Heap initialized: {} regions donated, {} usable bytes",
            usable_regions.len(),
            usable
        );
        Ok(usable)
    }

    /// Tear the heap down, discarding the accounting. The donated regions
    /// belong to the caller and are not touched; live block addresses become
    /// invalid.
    pub fn uninit(&self) -> HeapResult<()> {
        if !self.registry.is_initialized() {
            return Err(HeapError::NotInitialized);
        }

        self.registry.mark_uninitialized();
        self.total_bytes.store(0, Ordering::SeqCst);
        self.free_bytes.store(0, Ordering::SeqCst);
        self.min_free_bytes.store(0, Ordering::SeqCst);

        info!("Heap uninitialized: donated regions returned to the caller");
        Ok(())
    }

    /// Hand out `size` bytes, or `None` when the request is zero, the heap
    /// is uninitialized, or no free span can hold it.
    pub fn allocate(&self, size: Size) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        if !self.registry.is_initialized() {
            warn!("Dropped allocate({}): heap not initialized", size);
            return None;
        }

        let ops = self.registry.current();
        let block = ops.allocate(size)?;

        let charged = ops.block_size_of(block);
        let previous = self.free_bytes.fetch_sub(charged, Ordering::SeqCst);
        self.min_free_bytes
            .fetch_min(previous.saturating_sub(charged), Ordering::SeqCst);

        Some(block)
    }

    /// Return a block to the heap. Null is a no-op; behavior on a foreign
    /// or already-released address is the active allocator's policy.
    pub fn release(&self, address: *mut u8) {
        let block = match NonNull::new(address) {
            Some(block) => block,
            None => return,
        };
        if !self.registry.is_initialized() {
            warn!(
                "Dropped release of 0x{:x}: heap not initialized",
                address as Address
            );
            return;
        }

        let ops = self.registry.current();
        // The charged size must be read before the address is invalidated.
        let charged = ops.block_size_of(block);
        ops.release(block);
        self.free_bytes.fetch_add(charged, Ordering::SeqCst);
    }

    /// Charged size of a live block, including any rounding applied by the
    /// allocator; 0 when the heap is uninitialized.
    pub fn block_size_of(&self, address: NonNull<u8>) -> Size {
        if !self.registry.is_initialized() {
            return 0;
        }
        self.registry.current().block_size_of(address)
    }

    /// Free bytes currently held by the heap; 0 when uninitialized.
    #[inline]
    pub fn free_size(&self) -> Size {
        self.free_bytes.load(Ordering::SeqCst)
    }

    /// Low-water mark of `free_size` since the most recent `init`; 0 when
    /// uninitialized. Useful for sizing regions during development.
    #[inline]
    pub fn min_ever_free_size(&self) -> Size {
        self.min_free_bytes.load(Ordering::SeqCst)
    }

    /// Snapshot of the advisory counters; zeroed when uninitialized.
    pub fn stats(&self) -> HeapStats {
        let total = self.total_bytes.load(Ordering::SeqCst);
        let free = self.free_bytes.load(Ordering::SeqCst);
        let used = total.saturating_sub(free);

        HeapStats {
            total_bytes: total,
            used_bytes: used,
            free_bytes: free,
            min_ever_free_bytes: self.min_free_bytes.load(Ordering::SeqCst),
            usage_percentage: if total == 0 {
                0.0
            } else {
                (used as f64 / total as f64) * 100.0
            },
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
