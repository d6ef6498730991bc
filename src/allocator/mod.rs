/*!
 * Bundled Allocator
 *
 * Best-fit backend over caller-donated regions, built on a **segregated
 * free list**:
 *
 * - **Small spans** (<=4KB): O(1) class selection via power-of-2 bucketing
 *   - 7 classes: 64B, 128B, 256B, 512B, 1KB, 2KB, 4KB
 * - **Medium spans** (4KB-64KB): O(1) class selection via 4KB increments
 *   - 15 classes: 8KB, 12KB, ..., 64KB
 * - **Large spans** (>64KB): O(log n) best fit via BTreeMap
 *
 * ## Features
 *
 * - **Span splitting**: a best-fit span larger than the request is split
 *   and the remainder returned to the free list
 * - **Coalescing**: adjacent free spans are merged on an amortized schedule
 *   to reduce fragmentation
 * - **Faithful charging**: `block_size_of` reports the granule-rounded size
 *   actually consumed, so facade accounting includes internal fragmentation
 * - **Out-of-band bookkeeping**: every structure lives in host memory; the
 *   donated regions themselves are never read or written
 */

mod best_fit;
mod free_list;

pub use best_fit::{BestFitAllocator, ALIGN};
