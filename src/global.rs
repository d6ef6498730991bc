/*!
 * Process-Wide Heap
 * The singleton facade and its free-function wrappers
 */

use crate::facade::Heap;
use crate::traits::AllocatorOps;
use crate::types::{HeapResult, HeapStats, Region, Size};
use once_cell::sync::Lazy;
use std::ptr::NonNull;
use std::sync::Arc;

/// The one heap the process standardizes on. Created unconfigured; the
/// host's early-init code is expected to `redirect` (optionally) and `init`
/// it before anything allocates.
static HEAP: Lazy<Heap> = Lazy::new(Heap::new);

/// Handle to the process-wide heap, for callers that want the full
/// [`Heap`] surface.
pub fn heap() -> &'static Heap {
    &HEAP
}

/// Replace the process-wide operation vector. See [`Heap::redirect`].
pub fn redirect(ops: Arc<dyn AllocatorOps>) -> HeapResult<()> {
    HEAP.redirect(ops)
}

/// Initialize the process-wide heap over `regions`. See [`Heap::init`].
///
/// # Safety
///
/// Same contract as [`Heap::init`]: the regions must be valid, exclusively
/// donated, and live until [`uninit`] returns.
pub unsafe fn init(regions: &[Region]) -> HeapResult<Size> {
    HEAP.init(regions)
}

/// Tear down the process-wide heap. See [`Heap::uninit`].
pub fn uninit() -> HeapResult<()> {
    HEAP.uninit()
}

/// Allocate from the process-wide heap. See [`Heap::allocate`].
pub fn allocate(size: Size) -> Option<NonNull<u8>> {
    HEAP.allocate(size)
}

/// Release into the process-wide heap; null is a no-op. See
/// [`Heap::release`].
pub fn release(address: *mut u8) {
    HEAP.release(address)
}

/// Charged size of a live block of the process-wide heap.
pub fn block_size_of(address: NonNull<u8>) -> Size {
    HEAP.block_size_of(address)
}

/// Free bytes in the process-wide heap; 0 when uninitialized.
pub fn free_size() -> Size {
    HEAP.free_size()
}

/// Low-water mark of the process-wide heap since its last `init`.
pub fn min_ever_free_size() -> Size {
    HEAP.min_ever_free_size()
}

/// Counter snapshot of the process-wide heap.
pub fn stats() -> HeapStats {
    HEAP.stats()
}
