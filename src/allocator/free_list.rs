/*!
 * Segregated Free List
 * Size-classed storage for the free spans of donated regions
 */

use crate::types::{Address, Size};
use std::collections::BTreeMap;

/// A free span of donor memory, identified by its base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct FreeSpan {
    pub address: Address,
    pub size: Size,
}

/// Size classes for segregated free lists
pub(super) const SMALL_SPAN_MAX: Size = 4 * 1024; // 4KB
pub(super) const MEDIUM_SPAN_MAX: Size = 64 * 1024; // 64KB

/// Power-of-2 classes: 64, 128, 256, 512, 1KB, 2KB, 4KB
const SMALL_CLASS_COUNT: usize = 7;
/// 4KB-increment classes: 8KB, 12KB, ..., 64KB
const MEDIUM_CLASS_COUNT: usize = 15;

/// Segregated free list for efficient span lookup
/// - Small spans (<=4KB): O(1) class selection via power-of-2 bucketing
/// - Medium spans (<=64KB): O(1) class selection via 4KB increments
/// - Large spans (>64KB): O(log n) best fit via BTreeMap
///
/// A class bucket holds spans no larger than its class size, so only the
/// request's own class can contain spans that are too small; every higher
/// class is guaranteed to fit. Within a visited bucket the search is
/// best-fit.
#[derive(Debug)]
pub(super) struct SegregatedFreeList {
    small_spans: Vec<Vec<FreeSpan>>,
    medium_spans: Vec<Vec<FreeSpan>>,
    large_spans: BTreeMap<Size, Vec<FreeSpan>>,
}

impl SegregatedFreeList {
    pub fn new() -> Self {
        Self {
            small_spans: vec![Vec::new(); SMALL_CLASS_COUNT],
            medium_spans: vec![Vec::new(); MEDIUM_CLASS_COUNT],
            large_spans: BTreeMap::new(),
        }
    }

    fn small_class(size: Size) -> Option<usize> {
        if size == 0 || size > SMALL_SPAN_MAX {
            return None;
        }
        // 2^6 = 64 is class 0; everything below 64 rounds up into it.
        let class = if size <= 64 {
            0
        } else {
            (size.next_power_of_two().trailing_zeros() - 6) as usize
        };
        Some(class)
    }

    fn medium_class(size: Size) -> Option<usize> {
        if size <= SMALL_SPAN_MAX || size > MEDIUM_SPAN_MAX {
            return None;
        }
        // Round up to the next 4KB step; 8KB is class 0.
        let step = (size + (4 * 1024 - 1)) / (4 * 1024);
        Some(step.saturating_sub(2))
    }

    /// Best-fit removal from a single bucket; `None` when nothing fits.
    fn take_fit(bucket: &mut Vec<FreeSpan>, size: Size) -> Option<FreeSpan> {
        let mut best: Option<usize> = None;
        for (i, span) in bucket.iter().enumerate() {
            if span.size >= size && best.map_or(true, |b| span.size < bucket[b].size) {
                best = Some(i);
            }
        }
        best.map(|i| bucket.swap_remove(i))
    }

    pub fn insert(&mut self, span: FreeSpan) {
        debug_assert!(span.size > 0);
        if let Some(class) = Self::small_class(span.size) {
            self.small_spans[class].push(span);
        } else if let Some(class) = Self::medium_class(span.size) {
            self.medium_spans[class].push(span);
        } else {
            self.large_spans.entry(span.size).or_default().push(span);
        }
    }

    /// Remove and return the smallest span that can hold `size` bytes.
    pub fn find_best_fit(&mut self, size: Size) -> Option<FreeSpan> {
        if let Some(start_class) = Self::small_class(size) {
            for class in start_class..SMALL_CLASS_COUNT {
                if let Some(span) = Self::take_fit(&mut self.small_spans[class], size) {
                    return Some(span);
                }
            }
            // Fall through to the medium classes if no small span fits.
        }

        if size <= MEDIUM_SPAN_MAX {
            let start_class = Self::medium_class(size.max(SMALL_SPAN_MAX + 1)).unwrap_or(0);
            for class in start_class..MEDIUM_CLASS_COUNT {
                if let Some(span) = Self::take_fit(&mut self.medium_spans[class], size) {
                    return Some(span);
                }
            }
            // Fall through to the large spans if no medium span fits.
        }

        let candidate_sizes: Vec<Size> = self.large_spans.range(size..).map(|(s, _)| *s).collect();
        for span_size in candidate_sizes {
            if let Some(spans) = self.large_spans.get_mut(&span_size) {
                if let Some(span) = spans.pop() {
                    if spans.is_empty() {
                        self.large_spans.remove(&span_size);
                    }
                    return Some(span);
                }
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        let small: usize = self.small_spans.iter().map(|v| v.len()).sum();
        let medium: usize = self.medium_spans.iter().map(|v| v.len()).sum();
        let large: usize = self.large_spans.values().map(|v| v.len()).sum();
        small + medium + large
    }

    /// Drain every span, sorted by address. Used by the coalescing pass.
    pub fn drain_sorted(&mut self) -> Vec<FreeSpan> {
        let mut all_spans = Vec::with_capacity(self.len());
        for bucket in &mut self.small_spans {
            all_spans.append(bucket);
        }
        for bucket in &mut self.medium_spans {
            all_spans.append(bucket);
        }
        for spans in self.large_spans.values_mut() {
            all_spans.append(spans);
        }
        self.large_spans.clear();

        all_spans.sort_by_key(|s| s.address);
        all_spans
    }

    pub fn reinsert_all(&mut self, spans: Vec<FreeSpan>) {
        for span in spans {
            self.insert(span);
        }
    }
}
