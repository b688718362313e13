use crate::device::Device;
use crate::primitives::reduce::merge_counts;
use crate::primitives::scan::exclusive_scan;
use crate::sort_key::{DigitGroup, SortKey};
use std::ops::{Index, IndexMut};
use std::slice::{Iter, SliceIndex};
use std::sync::atomic::AtomicU32;

/// One counter per digit value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Counts(Vec<u32>);
pub type HistogramTable = Counts;
pub type PrefixOffsetTable = Counts;

impl Counts {
    pub fn new(radix: usize) -> Self {
        Counts(vec![0; radix])
    }

    #[inline]
    pub fn radix(&self) -> usize {
        self.0.len()
    }

    /// Sum of all counters, widened so it cannot wrap.
    #[inline]
    pub fn total(&self) -> u64 {
        self.0.iter().map(|c| *c as u64).sum()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl From<Vec<u32>> for Counts {
    fn from(counts: Vec<u32>) -> Self {
        Counts(counts)
    }
}

impl<I> Index<I> for Counts
where
    I: SliceIndex<[u32]>,
{
    type Output = I::Output;

    #[inline(always)]
    fn index(&self, index: I) -> &I::Output {
        &self.0[index]
    }
}

impl<I> IndexMut<I> for Counts
where
    I: SliceIndex<[u32]>,
{
    #[inline(always)]
    fn index_mut(&mut self, index: I) -> &mut I::Output {
        &mut self.0[index]
    }
}

impl IntoIterator for Counts {
    type Item = u32;
    type IntoIter = std::vec::IntoIter<u32>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Counts {
    type Item = &'a u32;
    type IntoIter = Iter<'a, u32>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-group digit counts of one pass, stored digit-major: the count of digit `d` in group
/// `g` lives at `d * groups + g`. Walking the table in storage order therefore visits the
/// output buffer's destination ranges in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupHistograms {
    radix: usize,
    groups: usize,
    counts: Vec<u32>,
}

impl GroupHistograms {
    fn from_group_major(radix: usize, per_group: Vec<Vec<u32>>) -> Self {
        let groups = per_group.len();
        let mut counts = Vec::with_capacity(radix * groups);

        for d in 0..radix {
            for local in per_group.iter() {
                counts.push(local[d]);
            }
        }

        Self {
            radix,
            groups,
            counts,
        }
    }

    #[inline]
    pub fn radix(&self) -> usize {
        self.radix
    }

    #[inline]
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// The counts of one digit across all groups, in group order.
    #[inline]
    pub fn digit_row(&self, digit: usize) -> &[u32] {
        &self.counts[digit * self.groups..(digit + 1) * self.groups]
    }

    #[inline]
    pub fn as_digit_major(&self) -> &[u32] {
        &self.counts
    }
}

/// Counts the digit of every key, per group and globally, in a single dispatch.
///
/// Every group counts its tile into group memory, then merges it into the global table with
/// one atomic add per non-empty bucket.
pub fn build_histogram<K: SortKey>(
    device: &Device,
    keys: &[K],
    digit: DigitGroup,
) -> (HistogramTable, GroupHistograms) {
    let radix = digit.radix();
    let group = device.group();
    let global: Vec<AtomicU32> = (0..radix).map(|_| AtomicU32::new(0)).collect();

    let per_group = device.dispatch_map(keys, |_, tile| {
        let digits: Vec<u32> = tile.iter().map(|k| digit.extract(k)).collect();
        let mut local = vec![0u32; radix];

        group.count_digits(&digits, &mut local);
        merge_counts(&global, &local);

        local
    });

    let histogram = Counts(global.into_iter().map(|c| c.into_inner()).collect());

    (
        histogram,
        GroupHistograms::from_group_major(radix, per_group),
    )
}

/// The exclusive prefix sum of a histogram: entry `i` is the number of elements whose digit
/// is below `i`.
pub fn prefix_offsets(device: &Device, histogram: &HistogramTable) -> PrefixOffsetTable {
    let (offsets, _) = exclusive_scan(device, histogram.as_slice());

    Counts(offsets)
}
