/*!
 * Allocator Traits
 * The swappable operation vector behind the heap facade
 */

use crate::types::{Region, Size};
use std::ptr::NonNull;

/// The four-operation capability set identifying an allocator algorithm.
///
/// The heap facade routes every call through the currently installed
/// implementation; see [`Heap::redirect`] for the replacement rules.
/// Implementations provide their own interior mutability and mutual
/// exclusion; the facade adds no locks on the hot path.
///
/// [`Heap::redirect`]: crate::Heap::redirect
pub trait AllocatorOps: Send + Sync {
    /// Hand out `size` usable bytes, or `None` when the backing store is
    /// exhausted.
    fn allocate(&self, size: Size) -> Option<NonNull<u8>>;

    /// Return a live block to the backing store.
    ///
    /// The facade never forwards null here. Behavior on a foreign or
    /// already-released address is the implementation's policy; the bundled
    /// backend logs and ignores it.
    fn release(&self, address: NonNull<u8>);

    /// Ingest pre-validated regions and report the usable byte total, which
    /// may be less than the donated sum due to internal bookkeeping or
    /// alignment trim. Zero signals rejection.
    ///
    /// Called at most once per heap lifetime. Implementations must discard
    /// any state from an earlier lifetime, so `init` after `uninit` starts
    /// clean.
    fn init(&self, regions: &[Region]) -> Size;

    /// Charged size of a live block, including any rounding the
    /// implementation applied; 0 for addresses it does not own.
    fn block_size_of(&self, address: NonNull<u8>) -> Size;
}
