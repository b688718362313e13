//! Portable cooperative group: group-local scratch memory plus barrier-separated rounds.
//!
//! The scan is the work-efficient Blelloch scan. The lanes are treated as the leaves of an
//! implicit balanced binary tree of `len.next_power_of_two()` leaves; leaves past the end of
//! the input only exist in the scratch memory and hold 0.
//!
//! Up-sweep, for `stride = 2, 4, .., n` (one barrier per round):
//!
//! ```text
//! shared[k * stride + stride - 1] += shared[k * stride + stride / 2 - 1]
//! ```
//!
//! then the root is cleared and the down-sweep walks back from `stride = n` to `2`, swapping
//! each left child with its parent and adding the old left value to the right child.

use super::{CooperativeGroup, GroupBackend};
use crate::primitives::ReduceOp;
use std::cell::RefCell;

thread_local! {
    static SHARED: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
}

/// Runs `f` on a scratch buffer of `len` words filled with `fill`. The buffer is reused per
/// thread; a nested call gets a one-off allocation instead.
fn with_shared<R, F>(len: usize, fill: u32, f: F) -> R
where
    F: FnOnce(&mut [u32]) -> R,
{
    SHARED.with(|shared| match shared.try_borrow_mut() {
        Ok(mut s) => {
            s.clear();
            s.resize(len, fill);
            f(&mut s)
        }
        Err(_) => {
            let mut one_off = vec![fill; len];
            f(&mut one_off)
        }
    })
}

/// In-place Blelloch exclusive scan of a power-of-two sized buffer. Returns the total.
pub(crate) fn blelloch_scan(shared: &mut [u32]) -> u32 {
    let n = shared.len();
    debug_assert!(n.is_power_of_two());

    let mut stride = 2;
    while stride <= n {
        let half = stride / 2;
        for worker in 0..n / stride {
            let right = worker * stride + stride - 1;
            shared[right] = shared[right].wrapping_add(shared[right - half]);
        }
        stride *= 2;
    }

    let total = shared[n - 1];
    shared[n - 1] = 0;

    let mut stride = n;
    while stride >= 2 {
        let half = stride / 2;
        for worker in 0..n / stride {
            let right = worker * stride + stride - 1;
            let left = right - half;
            let t = shared[left];
            shared[left] = shared[right];
            shared[right] = shared[right].wrapping_add(t);
        }
        stride /= 2;
    }

    total
}

/// Pairwise tree reduction of a power-of-two sized buffer. The result ends up in the last slot.
pub(crate) fn tree_reduce(shared: &mut [u32], op: ReduceOp) -> u32 {
    let n = shared.len();
    debug_assert!(n.is_power_of_two());

    let mut level = 0;
    while (1 << level) < n {
        for j in 0..(n >> (level + 1)) {
            let a = (1 << level) - 1 + (j << (level + 1));
            let b = a + (1 << level);
            shared[b] = op.apply(shared[a], shared[b]);
        }
        level += 1;
    }

    shared[n - 1]
}

pub struct SharedMemoryGroup {
    size: usize,
}

impl SharedMemoryGroup {
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());

        Self { size }
    }
}

impl CooperativeGroup for SharedMemoryGroup {
    fn backend(&self) -> GroupBackend {
        GroupBackend::SharedMemory
    }

    fn size(&self) -> usize {
        self.size
    }

    fn reduce(&self, lanes: &[u32], op: ReduceOp) -> u32 {
        debug_assert!(lanes.len() <= self.size);

        if lanes.is_empty() {
            return op.identity();
        }

        with_shared(lanes.len().next_power_of_two(), op.identity(), |shared| {
            shared[..lanes.len()].copy_from_slice(lanes);
            tree_reduce(shared, op)
        })
    }

    fn exclusive_scan(&self, lanes: &mut [u32]) -> u32 {
        debug_assert!(lanes.len() <= self.size);

        if lanes.is_empty() {
            return 0;
        }

        with_shared(lanes.len().next_power_of_two(), 0, |shared| {
            shared[..lanes.len()].copy_from_slice(lanes);
            let total = blelloch_scan(shared);
            lanes.copy_from_slice(&shared[..lanes.len()]);

            total
        })
    }

    fn count_digits(&self, digits: &[u32], local: &mut [u32]) {
        // Lanes increment group memory one after another, so plain adds are race-free here.
        for d in digits {
            local[*d as usize] += 1;
        }
    }

    fn rank_digits(&self, digits: &[u32], ranks: &mut [u32]) {
        debug_assert_eq!(digits.len(), ranks.len());

        let radix = match digits.iter().max() {
            Some(m) => *m as usize + 1,
            None => return,
        };

        let mut done = vec![false; radix];
        let mut indicator = vec![0u32; digits.len()];

        for &digit in digits {
            if done[digit as usize] {
                continue;
            }
            done[digit as usize] = true;

            for (flag, d) in indicator.iter_mut().zip(digits) {
                *flag = (*d == digit) as u32;
            }

            self.exclusive_scan(&mut indicator);

            for ((rank, d), r) in ranks.iter_mut().zip(digits).zip(indicator.iter()) {
                if *d == digit {
                    *rank = *r;
                }
            }
        }
    }
}
