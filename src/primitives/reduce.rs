//! `reduce` combines values produced by many concurrently running groups into a single total.
//!
//! ## Local-then-merge
//!
//! Every group first combines its own tile cooperatively (see [`CooperativeGroup::reduce`]),
//! then issues exactly one atomic operation into the global result. With per-bucket tables
//! (histograms) the same rule applies per bucket: one atomic add per non-empty bucket per
//! group, regardless of how many elements of the tile hit that bucket.
//!
//! A single shared counter that every element increments directly is correct too, but it
//! serializes N updates on a handful of memory locations. It is not offered.
//!
//! [`CooperativeGroup::reduce`]: crate::group::CooperativeGroup::reduce

use crate::device::Device;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ReduceOp {
    /// Wrapping 32-bit addition.
    Add,
    Min,
    Max,
}

impl ReduceOp {
    #[inline]
    pub fn identity(&self) -> u32 {
        match self {
            ReduceOp::Add => 0,
            ReduceOp::Min => u32::MAX,
            ReduceOp::Max => 0,
        }
    }

    #[inline]
    pub fn apply(&self, a: u32, b: u32) -> u32 {
        match self {
            ReduceOp::Add => a.wrapping_add(b),
            ReduceOp::Min => a.min(b),
            ReduceOp::Max => a.max(b),
        }
    }

    #[inline]
    fn merge(&self, global: &AtomicU32, value: u32) {
        match self {
            ReduceOp::Add => global.fetch_add(value, Ordering::Relaxed),
            ReduceOp::Min => global.fetch_min(value, Ordering::Relaxed),
            ReduceOp::Max => global.fetch_max(value, Ordering::Relaxed),
        };
    }
}

/// Reduces `values` with `op`. An empty input yields the identity of `op`.
pub fn reduce(device: &Device, values: &[u32], op: ReduceOp) -> u32 {
    let global = AtomicU32::new(op.identity());
    let group = device.group();

    device.dispatch_map(values, |_, tile| {
        let partial = group.reduce(tile, op);
        op.merge(&global, partial);
    });

    global.into_inner()
}

/// Adds one group's local bucket counts into the global table, one atomic per non-empty bucket.
#[inline]
pub fn merge_counts(global: &[AtomicU32], local: &[u32]) {
    debug_assert_eq!(global.len(), local.len());

    for (g, l) in global.iter().zip(local) {
        if *l > 0 {
            g.fetch_add(*l, Ordering::Relaxed);
        }
    }
}
