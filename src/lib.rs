/*!
 * region-heap
 * Embeddable heap facade with a swappable allocator algorithm
 *
 * A small dynamic-memory facility for resource-constrained runtimes. The
 * backing store is one or more caller-donated memory regions with no
 * sbrk/mmap fallback, and the algorithm behind `allocate`/`release` is an
 * operation vector the host may replace once at early boot, before the heap
 * is initialized.
 *
 * # Example
 *
 * ```
 * use region_heap::{Heap, Region};
 *
 * let mut backing = vec![0u8; 4096];
 * let regions = [
 *     Region::new(backing.as_mut_ptr(), backing.len()),
 *     Region::SENTINEL,
 * ];
 *
 * let heap = Heap::new();
 * let usable = unsafe { heap.init(&regions) }.unwrap();
 *
 * let block = heap.allocate(128).expect("region has room");
 * assert!(heap.free_size() < usable);
 *
 * heap.release(block.as_ptr());
 * assert_eq!(heap.free_size(), usable);
 * heap.uninit().unwrap();
 * ```
 *
 * Hosts that want one heap for the whole process use the [`global`] module
 * instead of carrying a [`Heap`] handle around.
 */

pub mod allocator;
pub mod facade;
pub mod global;
pub mod registry;
pub mod regions;
pub mod traits;
pub mod types;

// Re-exports
pub use allocator::{BestFitAllocator, ALIGN};
pub use facade::Heap;
pub use regions::MAX_REGIONS;
pub use registry::OpsRegistry;
pub use traits::AllocatorOps;
pub use types::{Address, HeapError, HeapResult, HeapStats, Region, RegionFault, Size};
