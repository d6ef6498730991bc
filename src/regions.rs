/*!
 * Region Intake
 * Validation of sentinel-terminated region arrays
 */

use crate::types::{Address, HeapError, HeapResult, Region, RegionFault};

/// Maximum number of donor regions; the sentinel must appear within the
/// first `MAX_REGIONS + 1` entries of the array.
pub const MAX_REGIONS: usize = 16;

/// Validate a sentinel-terminated region array and return the usable prefix.
///
/// Entries past the sentinel are ignored. Order is preserved: the active
/// allocator receives the regions exactly as the caller laid them out.
pub(crate) fn validate(regions: &[Region]) -> HeapResult<&[Region]> {
    let scan = regions.len().min(MAX_REGIONS + 1);
    let mut terminator = None;

    for (index, region) in regions[..scan].iter().enumerate() {
        if region.is_sentinel() {
            terminator = Some(index);
            break;
        }
        if region.start().is_null() {
            return Err(HeapError::MalformedRegionArray {
                index,
                fault: RegionFault::NullStart,
            });
        }
        if region.size() == 0 {
            return Err(HeapError::MalformedRegionArray {
                index,
                fault: RegionFault::ZeroSize,
            });
        }
        if (region.start() as Address).checked_add(region.size()).is_none() {
            return Err(HeapError::MalformedRegionArray {
                index,
                fault: RegionFault::RangeOverflow,
            });
        }
    }

    let terminator = match terminator {
        Some(index) => index,
        None => {
            return Err(HeapError::MalformedRegionArray {
                index: scan,
                fault: RegionFault::MissingSentinel,
            })
        }
    };

    if terminator == 0 {
        return Err(HeapError::NoRegions);
    }

    let usable = &regions[..terminator];
    for (first, a) in usable.iter().enumerate() {
        for (offset, b) in usable[first + 1..].iter().enumerate() {
            if overlaps(a, b) {
                return Err(HeapError::RegionOverlap {
                    first,
                    second: first + 1 + offset,
                });
            }
        }
    }

    Ok(usable)
}

fn overlaps(a: &Region, b: &Region) -> bool {
    let (a_start, a_end) = (a.start() as Address, a.start() as Address + a.size());
    let (b_start, b_end) = (b.start() as Address, b.start() as Address + b.size());
    a_start < b_end && b_start < a_end
}
