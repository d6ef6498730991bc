/*!
 * Heap Facade Tests
 * Lifecycle, accounting, and boundary behavior of the public surface
 */

use crate::support::Arena;
use pretty_assertions::assert_eq;
use region_heap::{Heap, HeapError, Region};
use std::ptr;

#[test]
fn init_reports_usable_bytes_and_seeds_counters() {
    let mut arena = Arena::<4096>::new();
    let heap = Heap::new();

    let usable = unsafe { heap.init(&[arena.region(), Region::SENTINEL]) }.unwrap();
    assert_eq!(usable, 4096);
    assert!(heap.is_initialized());
    assert_eq!(heap.free_size(), 4096);
    assert_eq!(heap.min_ever_free_size(), 4096);

    let stats = heap.stats();
    assert_eq!(stats.total_bytes, 4096);
    assert_eq!(stats.used_bytes, 0);
    assert_eq!(stats.free_bytes, 4096);
    assert_eq!(stats.usage_percentage, 0.0);
}

#[test]
fn allocation_stays_inside_the_region_and_accounting_round_trips() {
    let mut arena = Arena::<4096>::new();
    let region = arena.region();
    let heap = Heap::new();
    let usable = unsafe { heap.init(&[region, Region::SENTINEL]) }.unwrap();

    let block = heap.allocate(128).unwrap();
    let charged = heap.block_size_of(block);
    assert!(charged >= 128);

    // The whole charged span lies inside the donated region.
    let base = region.start() as usize;
    let start = block.as_ptr() as usize;
    assert!(region.contains(block.as_ptr()));
    assert!(start + charged <= base + region.size());

    assert_eq!(heap.free_size(), usable - charged);
    assert_eq!(heap.min_ever_free_size(), usable - charged);

    heap.release(block.as_ptr());
    assert_eq!(heap.free_size(), usable);
}

#[test]
fn two_regions_hold_two_large_blocks_but_not_three() {
    let mut first = Arena::<1024>::new();
    let mut second = Arena::<1024>::new();
    let heap = Heap::new();
    unsafe { heap.init(&[first.region(), second.region(), Region::SENTINEL]) }.unwrap();

    let a = heap.allocate(600).unwrap();
    let b = heap.allocate(600).unwrap();

    // Live blocks never overlap, whichever regions they landed in.
    let (a_start, a_end) = (a.as_ptr() as usize, a.as_ptr() as usize + heap.block_size_of(a));
    let (b_start, b_end) = (b.as_ptr() as usize, b.as_ptr() as usize + heap.block_size_of(b));
    assert!(a_end <= b_start || b_end <= a_start);

    // 600 of each 1024-byte region are spoken for; no third fits.
    assert_eq!(heap.allocate(600), None);
}

#[test]
fn allocate_zero_returns_null() {
    let mut arena = Arena::<1024>::new();
    let heap = Heap::new();
    unsafe { heap.init(&[arena.region(), Region::SENTINEL]) }.unwrap();

    assert_eq!(heap.allocate(0), None);
    assert_eq!(heap.free_size(), 1024);
}

#[test]
fn oversized_requests_return_null_without_charging() {
    let mut arena = Arena::<1024>::new();
    let heap = Heap::new();
    let usable = unsafe { heap.init(&[arena.region(), Region::SENTINEL]) }.unwrap();

    assert_eq!(heap.allocate(usable + 1), None);
    assert_eq!(heap.allocate(usize::MAX), None);
    assert_eq!(heap.free_size(), usable);
    assert_eq!(heap.min_ever_free_size(), usable);
}

#[test]
fn release_of_null_is_a_noop() {
    let mut arena = Arena::<1024>::new();
    let heap = Heap::new();

    // Valid both before and after init.
    heap.release(ptr::null_mut());

    unsafe { heap.init(&[arena.region(), Region::SENTINEL]) }.unwrap();
    heap.release(ptr::null_mut());
    assert_eq!(heap.free_size(), 1024);
}

#[test]
fn operations_before_init_are_inert() {
    let heap = Heap::new();

    assert_eq!(heap.allocate(64), None);
    assert_eq!(heap.free_size(), 0);
    assert_eq!(heap.min_ever_free_size(), 0);

    let stats = heap.stats();
    assert_eq!(stats.total_bytes, 0);
    assert_eq!(stats.usage_percentage, 0.0);
}

#[test]
fn low_water_mark_survives_releases() {
    let mut arena = Arena::<1024>::new();
    let heap = Heap::new();
    let usable = unsafe { heap.init(&[arena.region(), Region::SENTINEL]) }.unwrap();

    // Ten blocks of increasing size drive free_size to its low point.
    let blocks: Vec<_> = (1..=10)
        .map(|step| heap.allocate(step * 16).unwrap())
        .collect();
    let low_point = heap.min_ever_free_size();
    assert_eq!(low_point, heap.free_size());
    assert_eq!(low_point, usable - (1..=10).map(|step| step * 16).sum::<usize>());

    // Releasing restores free_size but never raises the mark.
    for block in blocks {
        heap.release(block.as_ptr());
    }
    assert_eq!(heap.free_size(), usable);
    assert_eq!(heap.min_ever_free_size(), low_point);
}

#[test]
fn reinit_restores_the_usable_total_and_resets_the_mark() {
    let mut arena = Arena::<2048>::new();
    let region = arena.region();
    let heap = Heap::new();

    let first = unsafe { heap.init(&[region, Region::SENTINEL]) }.unwrap();
    let block = heap.allocate(512).unwrap();
    assert!(heap.min_ever_free_size() < first);
    heap.release(block.as_ptr());

    heap.uninit().unwrap();
    assert!(!heap.is_initialized());
    assert_eq!(heap.free_size(), 0);
    assert_eq!(heap.min_ever_free_size(), 0);

    let second = unsafe { heap.init(&[region, Region::SENTINEL]) }.unwrap();
    assert_eq!(second, first);
    assert_eq!(heap.free_size(), second);
    assert_eq!(heap.min_ever_free_size(), second);
}

#[test]
fn block_size_of_reports_zero_after_uninit() {
    let mut arena = Arena::<1024>::new();
    let heap = Heap::new();
    unsafe { heap.init(&[arena.region(), Region::SENTINEL]) }.unwrap();

    let block = heap.allocate(64).unwrap();
    assert_eq!(heap.block_size_of(block), 64);

    heap.uninit().unwrap();
    // The address is stale once the lifetime ends; no charge is reported.
    assert_eq!(heap.block_size_of(block), 0);
}

#[test]
fn lifecycle_violations_are_reported() {
    let mut arena = Arena::<1024>::new();
    let region = arena.region();
    let heap = Heap::new();

    assert_eq!(heap.uninit(), Err(HeapError::NotInitialized));

    unsafe { heap.init(&[region, Region::SENTINEL]) }.unwrap();
    let again = unsafe { heap.init(&[region, Region::SENTINEL]) };
    assert_eq!(again, Err(HeapError::AlreadyInitialized));

    heap.uninit().unwrap();
    assert_eq!(heap.uninit(), Err(HeapError::NotInitialized));
}

#[test]
fn init_fails_when_the_allocator_finds_no_usable_bytes() {
    // Eight bytes cannot hold a single granule; the backend trims the
    // region to nothing and reports zero usable bytes.
    let mut arena = Arena::<8>::new();
    let heap = Heap::new();

    let result = unsafe { heap.init(&[arena.region(), Region::SENTINEL]) };
    assert_eq!(result, Err(HeapError::AllocatorRejected));
    assert!(!heap.is_initialized());
    assert_eq!(heap.free_size(), 0);
}

#[test]
fn stats_track_usage() {
    let mut arena = Arena::<4096>::new();
    let heap = Heap::new();
    unsafe { heap.init(&[arena.region(), Region::SENTINEL]) }.unwrap();

    let block = heap.allocate(1024).unwrap();
    let stats = heap.stats();
    assert_eq!(stats.total_bytes, 4096);
    assert_eq!(stats.used_bytes, 1024);
    assert_eq!(stats.free_bytes, 3072);
    assert_eq!(stats.min_ever_free_bytes, 3072);
    assert_eq!(stats.usage_percentage, 25.0);

    heap.release(block.as_ptr());
    heap.uninit().unwrap();
    let stats = heap.stats();
    assert_eq!(stats.total_bytes, 0);
    assert_eq!(stats.used_bytes, 0);
    assert_eq!(stats.usage_percentage, 0.0);
}
