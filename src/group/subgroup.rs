//! Subgroup-accelerated cooperative group.
//!
//! A group of `size` lanes is split into lock-step subgroups of `subgroup_size` lanes. Inside a
//! subgroup, reductions, scans and ballots are single cooperative operations with no explicit
//! synchronization. Only one value per subgroup (its total, or the leader of a peer set) is
//! combined through group memory.

use super::{CooperativeGroup, GroupBackend};
use crate::primitives::ReduceOp;

/// Native subgroup operations. On hardware each is one instruction over the whole subgroup.
pub(crate) mod intrinsics {
    use crate::primitives::ReduceOp;

    pub const MAX_SUBGROUP_SIZE: usize = 64;

    #[inline]
    pub fn subgroup_exclusive_add(lanes: &mut [u32]) -> u32 {
        debug_assert!(lanes.len() <= MAX_SUBGROUP_SIZE);

        let mut running = 0u32;
        for lane in lanes.iter_mut() {
            let v = *lane;
            *lane = running;
            running = running.wrapping_add(v);
        }

        running
    }

    #[inline]
    pub fn subgroup_reduce(lanes: &[u32], op: ReduceOp) -> u32 {
        debug_assert!(lanes.len() <= MAX_SUBGROUP_SIZE);

        lanes.iter().fold(op.identity(), |acc, v| op.apply(acc, *v))
    }

    /// Bit `i` is set when lane `i` votes true.
    #[inline]
    pub fn subgroup_ballot<I>(votes: I) -> u64
    where
        I: IntoIterator<Item = bool>,
    {
        votes
            .into_iter()
            .enumerate()
            .fold(0u64, |mask, (lane, vote)| mask | ((vote as u64) << lane))
    }

    #[inline]
    pub fn lanes_below(lane: usize) -> u64 {
        (1u64 << lane) - 1
    }
}

use intrinsics::*;

/// Exclusive scan of any number of lanes using subgroup scans at every level.
fn hierarchical_scan(lanes: &mut [u32], subgroup_size: usize) -> u32 {
    if lanes.len() <= subgroup_size {
        return subgroup_exclusive_add(lanes);
    }

    let mut totals: Vec<u32> = lanes
        .chunks_mut(subgroup_size)
        .map(subgroup_exclusive_add)
        .collect();

    let total = hierarchical_scan(&mut totals, subgroup_size);

    for (chunk, base) in lanes.chunks_mut(subgroup_size).zip(totals) {
        for lane in chunk.iter_mut() {
            *lane = lane.wrapping_add(base);
        }
    }

    total
}

/// For each lane of one subgroup, the mask of lanes holding the same digit.
fn match_peers(subgroup: &[u32], peers: &mut Vec<u64>) {
    peers.clear();
    peers.extend(
        subgroup
            .iter()
            .map(|d| subgroup_ballot(subgroup.iter().map(|o| o == d))),
    );
}

pub struct SubgroupGroup {
    size: usize,
    subgroup_size: usize,
}

impl SubgroupGroup {
    pub fn new(size: usize, subgroup_size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        debug_assert!(subgroup_size.is_power_of_two() && subgroup_size <= MAX_SUBGROUP_SIZE);

        // A one-lane subgroup cannot shrink the scan hierarchy, so pair lanes at minimum.
        Self {
            size,
            subgroup_size: subgroup_size.clamp(2, size),
        }
    }
}

impl CooperativeGroup for SubgroupGroup {
    fn backend(&self) -> GroupBackend {
        GroupBackend::Subgroup
    }

    fn size(&self) -> usize {
        self.size
    }

    fn reduce(&self, lanes: &[u32], op: ReduceOp) -> u32 {
        debug_assert!(lanes.len() <= self.size);

        lanes
            .chunks(self.subgroup_size)
            .map(|subgroup| subgroup_reduce(subgroup, op))
            .fold(op.identity(), |acc, partial| op.apply(acc, partial))
    }

    fn exclusive_scan(&self, lanes: &mut [u32]) -> u32 {
        debug_assert!(lanes.len() <= self.size);

        hierarchical_scan(lanes, self.subgroup_size)
    }

    fn count_digits(&self, digits: &[u32], local: &mut [u32]) {
        let mut peers = Vec::with_capacity(self.subgroup_size);

        for subgroup in digits.chunks(self.subgroup_size) {
            match_peers(subgroup, &mut peers);

            for (lane, (d, mask)) in subgroup.iter().zip(peers.iter()).enumerate() {
                // Only the lowest lane of each peer set touches group memory.
                if mask.trailing_zeros() as usize == lane {
                    local[*d as usize] += mask.count_ones();
                }
            }
        }
    }

    fn rank_digits(&self, digits: &[u32], ranks: &mut [u32]) {
        debug_assert_eq!(digits.len(), ranks.len());

        let radix = match digits.iter().max() {
            Some(m) => *m as usize + 1,
            None => return,
        };

        // Per-digit count of lanes in earlier subgroups, kept in group memory.
        let mut base = vec![0u32; radix];
        let mut peers = Vec::with_capacity(self.subgroup_size);

        for (subgroup, out) in digits
            .chunks(self.subgroup_size)
            .zip(ranks.chunks_mut(self.subgroup_size))
        {
            match_peers(subgroup, &mut peers);

            for (lane, ((d, mask), rank)) in subgroup
                .iter()
                .zip(peers.iter())
                .zip(out.iter_mut())
                .enumerate()
            {
                *rank = base[*d as usize] + (mask & lanes_below(lane)).count_ones();
            }

            for (lane, (d, mask)) in subgroup.iter().zip(peers.iter()).enumerate() {
                if mask.trailing_zeros() as usize == lane {
                    base[*d as usize] += mask.count_ones();
                }
            }
        }
    }
}
