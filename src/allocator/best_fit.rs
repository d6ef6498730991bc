/*!
 * Best-Fit Allocator
 * The built-in operation vector: best-fit spans with amortized coalescing
 */

use super::free_list::{FreeSpan, SegregatedFreeList};
use crate::traits::AllocatorOps;
use crate::types::{Address, Region, Size};
use ahash::RandomState;
use log::{error, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ptr::NonNull;

/// Allocation granule. Charged sizes are multiples of this, so every
/// address handed out is 16-byte aligned.
pub const ALIGN: Size = 16;

/// Coalesce adjacent free spans every this many releases, amortizing the
/// O(n log n) merge over the release stream.
const COALESCE_INTERVAL: u64 = 64;

/// A donated region after trimming to the granule.
#[derive(Debug, Clone, Copy)]
struct Extent {
    start: Address,
    end: Address,
}

impl Extent {
    fn contains(&self, address: Address) -> bool {
        address >= self.start && address < self.end
    }
}

/// Mutable allocator state, all of it behind one lock.
///
/// Bookkeeping lives in host memory; the donated regions are tracked purely
/// as address ranges and never dereferenced.
struct AllocatorState {
    extents: Vec<Extent>,
    free: SegregatedFreeList,
    live: HashMap<Address, Size, RandomState>,
    release_count: u64,
}

impl AllocatorState {
    fn new() -> Self {
        Self {
            extents: Vec::new(),
            free: SegregatedFreeList::new(),
            live: HashMap::with_hasher(RandomState::new()),
            release_count: 0,
        }
    }
}

/// The bundled default backend.
///
/// Satisfies the whole operation vector with best-fit placement over the
/// donated regions. A single mutex serializes the four operations; the
/// facade above adds no locking of its own, so this lock is the only one
/// on the hot path.
pub struct BestFitAllocator {
    state: Mutex<AllocatorState>,
}

impl BestFitAllocator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AllocatorState::new()),
        }
    }

    /// Request size rounded up to the granule; `None` when rounding would
    /// overflow.
    #[inline]
    fn charge(size: Size) -> Option<Size> {
        size.checked_add(ALIGN - 1).map(|s| s & !(ALIGN - 1))
    }

    /// Trim a region interior to granule boundaries: start rounded up, end
    /// rounded down. `None` when nothing survives the trim.
    fn trim(region: &Region) -> Option<Extent> {
        let start = region.start() as Address;
        // Region intake already rejected ranges that wrap, so start + size
        // cannot overflow; start + ALIGN - 1 still can for a tail sliver.
        let aligned_start = start.checked_add(ALIGN - 1)? & !(ALIGN - 1);
        let aligned_end = (start + region.size()) & !(ALIGN - 1);

        if aligned_end > aligned_start {
            Some(Extent {
                start: aligned_start,
                end: aligned_end,
            })
        } else {
            None
        }
    }

    /// Merge adjacent free spans. The segregated lists scatter neighbors
    /// across classes, so the pass drains everything, merges in address
    /// order, and reinserts.
    fn coalesce(free: &mut SegregatedFreeList) {
        let before = free.len();
        if before < 2 {
            return;
        }

        let mut spans = free.drain_sorted();
        let mut merged = 0usize;
        let mut i = 0;
        while i + 1 < spans.len() {
            if spans[i].address + spans[i].size == spans[i + 1].address {
                spans[i].size += spans[i + 1].size;
                spans.remove(i + 1);
                merged += 1;
            } else {
                i += 1;
            }
        }

        if merged > 0 {
            info!(
                "Coalesced {} pairs of adjacent free spans, reduced from {} to {} spans",
                merged,
                before,
                spans.len()
            );
        }

        free.reinsert_all(spans);
    }
}

impl AllocatorOps for BestFitAllocator {
    fn allocate(&self, size: Size) -> Option<NonNull<u8>> {
        debug_assert!(size > 0);
        let charged = match Self::charge(size) {
            Some(charged) => charged,
            None => {
                error!(
                    "Heap exhausted: {} byte request exceeds the addressable range",
                    size
                );
                return None;
            },
        };

        let mut state = self.state.lock();
        let span = match state.free.find_best_fit(charged) {
            Some(span) => span,
            None => {
                error!(
                    "Heap exhausted: no free span holds {} bytes ({} requested)",
                    charged, size
                );
                return None;
            },
        };

        // Split when the leftover is at least one granule; otherwise the
        // whole span is charged to the block, and block_size_of reports it.
        let charged = if span.size - charged >= ALIGN {
            state.free.insert(FreeSpan {
                address: span.address + charged,
                size: span.size - charged,
            });
            charged
        } else {
            span.size
        };

        state.live.insert(span.address, charged);
        NonNull::new(span.address as *mut u8)
    }

    fn release(&self, address: NonNull<u8>) {
        let address = address.as_ptr() as Address;
        let mut state = self.state.lock();

        let size = match state.live.remove(&address) {
            Some(size) => size,
            None => {
                if state.extents.iter().any(|e| e.contains(address)) {
                    error!(
                        "Ignoring release of 0x{:x}: inside a donated region but not a live block (double release?)",
                        address
                    );
                } else {
                    error!(
                        "Ignoring release of 0x{:x}: outside every donated region",
                        address
                    );
                }
                return;
            },
        };

        state.free.insert(FreeSpan { address, size });
        state.release_count += 1;
        if state.release_count % COALESCE_INTERVAL == 0 {
            Self::coalesce(&mut state.free);
        }
    }

    fn init(&self, regions: &[Region]) -> Size {
        let mut state = self.state.lock();
        // Fresh lifetime: any spans or live blocks from before are gone.
        *state = AllocatorState::new();

        let mut usable = 0;
        for region in regions {
            if let Some(extent) = Self::trim(region) {
                let size = extent.end - extent.start;
                state.free.insert(FreeSpan {
                    address: extent.start,
                    size,
                });
                state.extents.push(extent);
                usable += size;
            }
        }

        info!(
            "Best-fit allocator initialized: {} of {} regions usable, {} usable bytes",
            state.extents.len(),
            regions.len(),
            usable
        );
        usable
    }

    fn block_size_of(&self, address: NonNull<u8>) -> Size {
        let address = address.as_ptr() as Address;
        self.state.lock().live.get(&address).copied().unwrap_or(0)
    }
}

impl Default for BestFitAllocator {
    fn default() -> Self {
        Self::new()
    }
}
