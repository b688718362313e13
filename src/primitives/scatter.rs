//! `scatter` is the stable bucket-sort step of one pass. Every element is written to
//!
//! ```text
//! final_index(e) = PrefixOffsetTable[digit(e)] + rank(e)
//! ```
//!
//! where `rank(e)` is the number of elements before `e`, in input order, that share its digit.
//! The rank is built in two levels: the in-group rank comes from the cooperative group, and
//! the count of the same digit in all earlier groups comes from an exclusive scan of the
//! digit-major group histogram. Because the two levels are ordered the same way as the input,
//! equal digits keep their relative order.
//!
//! ## Destination ownership
//!
//! The start of every `(digit, group)` range is `offsets[digit]` plus that group's base within
//! the digit. The output buffer is carved at those starts into one slice per range, and every
//! group receives its own slices and writes the element of rank `r` with digit `d` to
//! `slice[d][r]`. The slices are disjoint, so no two groups can ever write the same slot;
//! ranges that would overlap or run past the buffer panic before anything is written. Debug
//! builds additionally record every final index and panic on a repeat.
//!
//! ## Characteristics
//!
//!  * out-of-place
//!  * multi-threaded
//!  * stable

use crate::device::Device;
use crate::primitives::histogram::{
    build_histogram, prefix_offsets, GroupHistograms, HistogramTable, PrefixOffsetTable,
};
use crate::primitives::scan::exclusive_scan;
use crate::sort_key::{DigitGroup, SortKey};
use arbitrary_chunks::ArbitraryChunks;
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything one group needs: its input tiles and the destination slices only it may write.
struct GroupState<'a, K, V> {
    keys: &'a [K],
    payload: Option<&'a [V]>,
    key_dst: Vec<&'a mut [K]>,
    payload_dst: Option<Vec<&'a mut [V]>>,
}

/// Records every final index written during one scatter, debug builds only.
struct CollisionTracker<'s> {
    starts: &'s [usize],
    groups: usize,
    written: Vec<AtomicBool>,
}

impl<'s> CollisionTracker<'s> {
    fn new(starts: &'s [usize], groups: usize, len: usize) -> Self {
        Self {
            starts,
            groups,
            written: (0..len).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    #[inline]
    fn mark(&self, group: usize, digit: u32, rank: u32) {
        let index = self.starts[digit as usize * self.groups + group] + rank as usize;

        if self.written[index].swap(true, Ordering::Relaxed) {
            panic!("scatter destination collision at index {}", index);
        }
    }

    fn assert_complete(&self) {
        let missing = self
            .written
            .iter()
            .filter(|w| !w.load(Ordering::Relaxed))
            .count();

        assert_eq!(missing, 0, "scatter left {} destination slots unwritten", missing);
    }
}

/// The start of every `(digit, group)` destination range, digit-major: `offsets[digit]` plus
/// the count of that digit in all earlier groups.
fn destination_starts(
    device: &Device,
    offsets: &PrefixOffsetTable,
    per_group: &GroupHistograms,
) -> Vec<usize> {
    let groups = per_group.groups();
    let (scanned, _) = exclusive_scan(device, per_group.as_digit_major());

    scanned
        .chunks(groups)
        .enumerate()
        .flat_map(|(d, row)| {
            let offset = offsets[d] as usize;
            let base = row[0];

            row.iter().map(move |s| offset + (s - base) as usize)
        })
        .collect()
}

/// Interleaves the gap in front of every destination range with the range's length, in the
/// form `arbitrary_chunks_mut` takes. Panics if two ranges overlap or one ends past `len`.
fn destination_layout(starts: &[usize], counts: &[u32], len: usize) -> Vec<usize> {
    let mut layout = Vec::with_capacity(starts.len() * 2);
    let mut cursor = 0;

    for (start, count) in starts.iter().zip(counts) {
        let end = start + *count as usize;

        assert!(
            *start >= cursor,
            "scatter destination ranges overlap at index {}",
            start
        );
        assert!(
            end <= len,
            "scatter destination range {}..{} is out of bounds for {} slots",
            start,
            end,
            len
        );

        layout.push(start - cursor);
        layout.push(*count as usize);
        cursor = end;
    }

    layout
}

/// Carves `dst` at the planned ranges and hands each group its slices, indexed by digit.
#[inline]
fn collate_destinations<'a, T>(
    dst: &'a mut [T],
    layout: &[usize],
    radix: usize,
    groups: usize,
) -> Vec<Vec<&'a mut [T]>> {
    let mut collated: Vec<Vec<&mut [T]>> = Vec::with_capacity(groups);
    collated.resize_with(groups, || Vec::with_capacity(radix));

    // Every other chunk is a gap. The chunk iterator stops early once the buffer is used up,
    // so trailing empty ranges have to be filled in.
    let chunks: Vec<&mut [T]> = dst.arbitrary_chunks_mut(layout).skip(1).step_by(2).collect();
    let missing = radix * groups - chunks.len();
    let padded = chunks
        .into_iter()
        .chain(std::iter::repeat_with(<&mut [T]>::default).take(missing));

    for (i, chunk) in padded.enumerate() {
        collated[i % groups].push(chunk);
    }

    collated
}

/// Writes every element of `src` (and its payload, when present) to its final position for
/// this pass in `dst`.
///
/// `offsets` and `per_group` must have been computed from `src` with the same `digit`.
pub fn scatter<K, V>(
    device: &Device,
    src: &[K],
    dst: &mut [K],
    payload: Option<(&[V], &mut [V])>,
    digit: DigitGroup,
    offsets: &PrefixOffsetTable,
    per_group: &GroupHistograms,
) where
    K: SortKey,
    V: Copy + Send + Sync,
{
    assert_eq!(src.len(), dst.len());

    if src.is_empty() {
        return;
    }

    let radix = digit.radix();
    let groups = per_group.groups();
    let size = device.workgroup_size();
    debug_assert_eq!(groups, device.group_count(src.len()));
    debug_assert_eq!(radix, per_group.radix());

    let starts = destination_starts(device, offsets, per_group);
    let layout = destination_layout(&starts, per_group.as_digit_major(), dst.len());
    let key_dst = collate_destinations(dst, &layout, radix, groups);

    let tracker = if cfg!(debug_assertions) {
        Some(CollisionTracker::new(&starts, groups, src.len()))
    } else {
        None
    };

    let (payload_tiles, payload_dst): (Vec<Option<&[V]>>, Vec<Option<Vec<&mut [V]>>>) =
        match payload {
            Some((payload_src, payload_out)) => {
                assert_eq!(payload_src.len(), src.len());
                assert_eq!(payload_out.len(), src.len());

                (
                    payload_src.chunks(size).map(Some).collect(),
                    collate_destinations(payload_out, &layout, radix, groups)
                        .into_iter()
                        .map(Some)
                        .collect(),
                )
            }
            None => (vec![None; groups], (0..groups).map(|_| None).collect()),
        };

    let states: Vec<GroupState<K, V>> = src
        .chunks(size)
        .zip(key_dst)
        .zip(payload_tiles.into_iter().zip(payload_dst))
        .map(|((keys, key_dst), (payload, payload_dst))| GroupState {
            keys,
            payload,
            key_dst,
            payload_dst,
        })
        .collect();

    let group = device.group();

    device.dispatch_owned(states, |g, state| {
        let GroupState {
            keys,
            payload,
            mut key_dst,
            payload_dst,
        } = state;

        let digits: Vec<u32> = keys.iter().map(|k| digit.extract(k)).collect();
        let mut ranks = vec![0u32; keys.len()];
        group.rank_digits(&digits, &mut ranks);

        for ((key, d), r) in keys.iter().zip(digits.iter()).zip(ranks.iter()) {
            if let Some(tracker) = &tracker {
                tracker.mark(g, *d, *r);
            }

            key_dst[*d as usize][*r as usize] = *key;
        }

        if let (Some(values), Some(mut value_dst)) = (payload, payload_dst) {
            for ((value, d), r) in values.iter().zip(digits.iter()).zip(ranks.iter()) {
                value_dst[*d as usize][*r as usize] = *value;
            }
        }
    });

    if let Some(tracker) = &tracker {
        tracker.assert_complete();
    }
}

/// One full stable pass over a single digit group: histogram, offsets, scatter.
///
/// Returns the pass's histogram and prefix offsets.
pub fn bucket_sort<K, V>(
    device: &Device,
    keys: &[K],
    out_keys: &mut [K],
    payload: Option<(&[V], &mut [V])>,
    digit: DigitGroup,
) -> (HistogramTable, PrefixOffsetTable)
where
    K: SortKey,
    V: Copy + Send + Sync,
{
    let (histogram, per_group) = build_histogram(device, keys, digit);
    let offsets = prefix_offsets(device, &histogram);

    scatter(device, keys, out_keys, payload, digit, &offsets, &per_group);

    (histogram, offsets)
}
