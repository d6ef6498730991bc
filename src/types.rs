/*!
 * Heap Types
 * Region descriptors, error taxonomy, and statistics
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ptr;
use thiserror::Error;

/// Address type for span arithmetic inside allocator backends
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Heap operation result
pub type HeapResult<T> = Result<T, HeapError>;

/// A contiguous, caller-owned byte range donated to the heap.
///
/// A region is a plain descriptor: constructing one grants no access to the
/// bytes it names. The donation contract (validity, exclusivity, lifetime)
/// is asserted when the descriptor array is handed to [`Heap::init`].
///
/// Region arrays are terminated by [`Region::SENTINEL`], the `{null, 0}`
/// record, and the order of entries is preserved all the way down to the
/// active allocator.
///
/// [`Heap::init`]: crate::Heap::init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    start: *mut u8,
    size: Size,
}

impl Region {
    /// The `{null, 0}` record that delimits the end of a region array.
    pub const SENTINEL: Region = Region {
        start: ptr::null_mut(),
        size: 0,
    };

    /// Describe `size` bytes starting at `start`.
    pub const fn new(start: *mut u8, size: Size) -> Self {
        Self { start, size }
    }

    /// First byte of the region.
    pub const fn start(&self) -> *mut u8 {
        self.start
    }

    /// Length of the region in bytes.
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Whether this entry is the array terminator.
    pub fn is_sentinel(&self) -> bool {
        self.start.is_null() && self.size == 0
    }

    /// Whether `address` falls inside `[start, start + size)`.
    pub fn contains(&self, address: *const u8) -> bool {
        let base = self.start as Address;
        let address = address as Address;
        address >= base && address - base < self.size
    }
}

// A region is pure data; it confers no right to touch the bytes it names,
// so moving or sharing the descriptor itself is harmless.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

/// The specific defect found while scanning a region array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFault {
    /// The `{null, 0}` sentinel was not found within the scan bound.
    MissingSentinel,
    /// A non-sentinel entry has a null start address.
    NullStart,
    /// A non-sentinel entry has a zero size.
    ZeroSize,
    /// `start + size` wraps around the address space.
    RangeOverflow,
}

impl fmt::Display for RegionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFault::MissingSentinel => write!(f, "sentinel not found"),
            RegionFault::NullStart => write!(f, "null start address"),
            RegionFault::ZeroSize => write!(f, "zero size"),
            RegionFault::RangeOverflow => write!(f, "range wraps the address space"),
        }
    }
}

/// Heap errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    #[error("ordering violation: the operation vector can only be replaced while the heap is uninitialized")]
    OrderingViolation,

    #[error("heap already initialized")]
    AlreadyInitialized,

    #[error("heap not initialized")]
    NotInitialized,

    #[error("malformed region array at entry {index}: {fault}")]
    MalformedRegionArray { index: usize, fault: RegionFault },

    #[error("region {first} overlaps region {second}")]
    RegionOverlap { first: usize, second: usize },

    #[error("region array holds no usable regions")]
    NoRegions,

    #[error("allocator rejected the region set: zero usable bytes")]
    AllocatorRejected,
}

/// Heap statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeapStats {
    pub total_bytes: Size,
    pub used_bytes: Size,
    pub free_bytes: Size,
    pub min_ever_free_bytes: Size,
    pub usage_percentage: f64,
}
